use imago_core::{Env, ErrorKind, Value};

use crate::register_fn;

/// Negative indices count from the right; `-1` is the length itself so
/// it can serve as a slice endpoint.
fn rebase(i: i64, len: i64) -> i64 {
    if i < 0 {
        i + len + 1
    } else {
        i
    }
}

pub fn register(env: &Env) {
    register_fn(env, "length", |ctx, args| {
        const HINT: &str = "(length seq)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        match args[0].seq_len() {
            Some(len) => Ok(Value::Int(len as i64)),
            None => Err(ctx.error(ErrorKind::NotASequence, HINT, args[0].clone())),
        }
    });

    register_fn(env, "elem", |ctx, args| {
        const HINT: &str = "(elem index seq)";
        let (Some(i), Some(len)) = (
            args.first().and_then(Value::as_int),
            args.get(1).and_then(Value::seq_len),
        ) else {
            return Err(ctx.error(ErrorKind::WrongTypes, HINT, Value::list(args.to_vec())));
        };
        if args.len() != 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let i = rebase(i, len as i64);
        if i >= 0 && i < len as i64 {
            Ok(args[1].seq_elem(i as usize).unwrap_or_else(Value::nil))
        } else {
            Err(ctx.error(ErrorKind::NotValidIndex, HINT, Value::list(args.to_vec())))
        }
    });

    register_fn(env, "slice", |ctx, args| {
        const HINT: &str = "(slice start end seq)";
        if args.len() != 3 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let (Some(s), Some(e), Some(len)) = (
            args[0].as_int(),
            args[1].as_int(),
            args[2].seq_len(),
        ) else {
            return Err(ctx.error(ErrorKind::WrongTypes, HINT, Value::list(args.to_vec())));
        };
        let len = len as i64;
        let s = rebase(s, len);
        let e = rebase(e, len);
        if s <= e && s >= 0 && e <= len {
            Ok(args[2]
                .seq_slice(s as usize, e as usize)
                .unwrap_or_else(Value::nil))
        } else {
            Err(ctx.error(ErrorKind::NotValidIndex, HINT, Value::list(args.to_vec())))
        }
    });

    // Concatenation never mixes variants: all lists or all strings
    // (symbols count as strings and concatenate to a plain string).
    register_fn(env, "cat", |ctx, args| {
        const HINT: &str = "(cat seq ...)";
        let Some(first) = args.first() else {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        };
        if first.is_list() {
            if !args.iter().all(Value::is_list) {
                return Err(ctx.error(ErrorKind::NotAllLists, HINT, Value::list(args.to_vec())));
            }
            let mut out = Vec::new();
            for arg in args {
                if let Some(l) = arg.as_list() {
                    out.extend(l.borrow().iter().cloned());
                }
            }
            Ok(Value::list(out))
        } else if first.is_str() {
            if !args.iter().all(Value::is_str) {
                return Err(ctx.error(ErrorKind::NotAllStrings, HINT, Value::list(args.to_vec())));
            }
            let mut out = Vec::new();
            for arg in args {
                let _ = arg.with_str(|b| out.extend_from_slice(b));
            }
            Ok(Value::string(out))
        } else {
            Err(ctx.error(ErrorKind::NotASequence, HINT, first.clone()))
        }
    });
}

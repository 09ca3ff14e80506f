use imago_core::{intern, Env, ErrorKind, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    // Unsigned lexicographic byte compare: negative, zero or positive.
    register_fn(env, "cmp", |ctx, args| {
        const HINT: &str = "(cmp str str)";
        if args.len() != 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        if !args.iter().all(Value::is_str) {
            return Err(ctx.error(ErrorKind::NotAllStrings, HINT, Value::list(args.to_vec())));
        }
        let a = args[0].str_bytes().unwrap_or_default();
        let b = args[1].str_bytes().unwrap_or_default();
        for (x, y) in a.iter().zip(b.iter()) {
            let c = *x as i64 - *y as i64;
            if c != 0 {
                return Ok(Value::Int(c));
            }
        }
        Ok(Value::Int(a.len() as i64 - b.len() as i64))
    });

    // Read `width` bytes at `index` as a little-endian integer.
    register_fn(env, "code", |ctx, args| {
        const HINT: &str = "(code str [width index])";
        if args.is_empty() || args.len() > 3 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Some(bytes) = args[0].str_bytes() else {
            return Err(ctx.error(ErrorKind::NotAString, HINT, args[0].clone()));
        };
        let width = match args.get(1) {
            None => 1,
            Some(v) => match v.as_int() {
                Some(n) => ((n - 1) & 7) + 1,
                None => {
                    return Err(ctx.error(ErrorKind::NotANumber, HINT, v.clone()));
                }
            },
        };
        let mut index = match args.get(2) {
            None => 0,
            Some(v) => match v.as_int() {
                Some(n) => n,
                None => {
                    return Err(ctx.error(ErrorKind::NotANumber, HINT, v.clone()));
                }
            },
        };
        let len = bytes.len() as i64;
        if index < 0 {
            index += len + 1;
        }
        if index < 0 || index + width > len {
            return Err(ctx.error(ErrorKind::NotValidIndex, HINT, Value::list(args.to_vec())));
        }
        let mut code: i64 = 0;
        for k in 0..width {
            code |= (bytes[(index + k) as usize] as i64) << (8 * k);
        }
        Ok(Value::Int(code))
    });

    // Inverse of code: pack the low `width` bytes of an integer.
    register_fn(env, "char", |ctx, args| {
        const HINT: &str = "(char num [width])";
        if args.is_empty() || args.len() > 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Some(n) = args[0].as_int() else {
            return Err(ctx.error(ErrorKind::NotANumber, HINT, args[0].clone()));
        };
        let width = match args.get(1) {
            None => 1,
            Some(v) => match v.as_int() {
                Some(w) => (((w - 1) & 7) + 1) as usize,
                None => {
                    return Err(ctx.error(ErrorKind::NotANumber, HINT, v.clone()));
                }
            },
        };
        Ok(Value::string(n.to_le_bytes()[..width].to_vec()))
    });

    // Print all args into a fresh string: display form for strings and
    // memory streams, machine form for everything else.
    register_fn(env, "str", |_ctx, args| {
        let mut out: Vec<u8> = Vec::new();
        for arg in args {
            match arg {
                Value::Str(s) => out.extend_from_slice(s),
                Value::OutStream(s) => {
                    if let Some(bytes) = s.borrow().contents() {
                        out.extend_from_slice(bytes);
                    }
                }
                other => out.extend_from_slice(other.to_string().as_bytes()),
            }
        }
        Ok(Value::string(out))
    });

    register_fn(env, "sym", |ctx, args| {
        const HINT: &str = "(sym str)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        match &args[0] {
            Value::Symbol(_) => Ok(args[0].clone()),
            Value::Str(s) => Ok(Value::Symbol(intern(&String::from_utf8_lossy(s)))),
            other => Err(ctx.error(ErrorKind::NotAString, HINT, other.clone())),
        }
    });

    register_fn(env, "gensym", |ctx, args| {
        if args.is_empty() {
            Ok(ctx.gensym())
        } else {
            Err(ctx.error(
                ErrorKind::WrongNumOfArgs,
                "(gensym)",
                Value::list(args.to_vec()),
            ))
        }
    });

    // Split on a delimiter character set; a double-quoted substring is
    // one atomic token, quotes included.
    register_fn(env, "split", |ctx, args| {
        const HINT: &str = "(split str chars)";
        if args.len() != 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        if !args.iter().all(Value::is_str) {
            return Err(ctx.error(ErrorKind::NotAllStrings, HINT, Value::list(args.to_vec())));
        }
        let s = args[0].str_bytes().unwrap_or_default();
        let delims = args[1].str_bytes().unwrap_or_default();
        let len = s.len();
        let mut out = Vec::new();
        let mut i = 0;
        while i < len {
            while i < len && delims.contains(&s[i]) {
                i += 1;
            }
            if i == len {
                break;
            }
            let start = i;
            if s[i] == b'"' {
                loop {
                    i += 1;
                    if i >= len {
                        break;
                    }
                    if s[i] == b'"' {
                        i += 1;
                        break;
                    }
                }
            } else {
                while i < len && !delims.contains(&s[i]) {
                    i += 1;
                }
            }
            out.push(Value::string(s[start..i].to_vec()));
        }
        Ok(Value::list(out))
    });
}

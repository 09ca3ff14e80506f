use imago_core::{Env, ErrorKind, EvalContext, ImagoError, Value};

use crate::register_fn;

fn rebase(i: i64, len: i64) -> i64 {
    if i < 0 {
        i + len + 1
    } else {
        i
    }
}

/// Structural copy: fresh list cells all the way down, atoms shared.
fn deep_copy(v: &Value) -> Value {
    match v.as_list() {
        Some(l) => Value::list(l.borrow().iter().map(deep_copy).collect()),
        None => v.clone(),
    }
}

/// Position-wise identity with the `"_"` wildcard.
fn wildcard_eq(o1: &Value, o2: &Value) -> bool {
    if Value::identity_eq(o1, o2) {
        return true;
    }
    o2.with_str(|b| b == b"_").unwrap_or(false)
}

pub fn register(env: &Env) {
    register_fn(env, "list", |_ctx, args| Ok(Value::list(args.to_vec())));

    register_fn(env, "push", |ctx, args| {
        const HINT: &str = "(push array form ...)";
        if args.len() < 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Some(l) = args[0].as_list() else {
            return Err(ctx.error(ErrorKind::NotAList, HINT, args[0].clone()));
        };
        l.borrow_mut().extend(args[1..].iter().cloned());
        Ok(args[0].clone())
    });

    register_fn(env, "pop", |ctx, args| {
        const HINT: &str = "(pop array)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Some(l) = args[0].as_list() else {
            return Err(ctx.error(ErrorKind::NotAList, HINT, args[0].clone()));
        };
        let popped = l.borrow_mut().pop();
        Ok(popped.unwrap_or_else(Value::nil))
    });

    register_fn(env, "clear", |ctx, args| {
        const HINT: &str = "(clear array ...)";
        if args.is_empty() || !args.iter().all(Value::is_list) {
            return Err(ctx.error(ErrorKind::NotAllLists, HINT, Value::list(args.to_vec())));
        }
        for arg in args {
            if let Some(l) = arg.as_list() {
                l.borrow_mut().clear();
            }
        }
        Ok(args[args.len() - 1].clone())
    });

    register_fn(env, "elem-set", |ctx, args| {
        const HINT: &str = "(elem-set index list val)";
        if args.len() != 3 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let (Some(i), Some(l)) = (args[0].as_int(), args[1].as_list()) else {
            return Err(ctx.error(ErrorKind::WrongTypes, HINT, Value::list(args.to_vec())));
        };
        let len = l.borrow().len() as i64;
        let i = rebase(i, len);
        if i >= 0 && i < len {
            l.borrow_mut()[i as usize] = args[2].clone();
            Ok(args[2].clone())
        } else {
            Err(ctx.error(ErrorKind::NotValidIndex, HINT, Value::list(args.to_vec())))
        }
    });

    register_fn(env, "find", |ctx, args| {
        find_impl(ctx, args, "(find elem seq)", false)
    });

    register_fn(env, "find-rev", |ctx, args| {
        find_impl(ctx, args, "(find-rev elem seq)", true)
    });

    // Append the symbols of the second list that the first does not
    // already contain. Mutates and returns the first.
    register_fn(env, "merge", |ctx, args| {
        const HINT: &str = "(merge list list)";
        if args.len() != 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let (Some(dst), Some(src)) = (args[0].as_list(), args[1].as_list()) else {
            return Err(ctx.error(ErrorKind::NotAllLists, HINT, Value::list(args.to_vec())));
        };
        let incoming: Vec<Value> = src.borrow().clone();
        if !incoming.iter().all(Value::is_sym) {
            return Err(ctx.error(ErrorKind::WrongTypes, HINT, args[1].clone()));
        }
        let mut additions = Vec::new();
        {
            let present = dst.borrow();
            for sym in &incoming {
                let exists = present.iter().any(|v| Value::identity_eq(v, sym))
                    || additions.iter().any(|v| Value::identity_eq(v, sym));
                if !exists {
                    additions.push(sym.clone());
                }
            }
        }
        dst.borrow_mut().extend(additions);
        Ok(args[0].clone())
    });

    // Equal-length lists, position-wise identity, with the string "_"
    // matching anything.
    register_fn(env, "match?", |ctx, args| {
        const HINT: &str = "(match? list list)";
        if args.len() != 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let (Some(l1), Some(l2)) = (args[0].as_list(), args[1].as_list()) else {
            return Err(ctx.error(ErrorKind::NotAllLists, HINT, Value::list(args.to_vec())));
        };
        let a = l1.borrow();
        let b = l2.borrow();
        if a.len() != b.len() {
            return Ok(Value::nil());
        }
        let matched = a.iter().zip(b.iter()).all(|(o1, o2)| wildcard_eq(o1, o2));
        Ok(Value::bool_sym(matched))
    });

    // Quicksort partition step: order [start, end) around the element
    // at start using the comparator, return the pivot's final index.
    register_fn(env, "partition", |ctx, args| {
        const HINT: &str = "(partition lambda list start end)";
        if args.len() != 4 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let (Some(l), Some(start), Some(end)) = (
            args[1].as_list(),
            args[2].as_int(),
            args[3].as_int(),
        ) else {
            return Err(ctx.error(ErrorKind::WrongTypes, HINT, Value::list(args.to_vec())));
        };
        let len = l.borrow().len() as i64;
        if !(start >= 0 && start < end && end <= len) {
            return Err(ctx.error(ErrorKind::NotValidIndex, HINT, Value::list(args.to_vec())));
        }
        let (start, end) = (start as usize, end as usize);
        let mut pivot = start;
        for itr in start + 1..end {
            // the comparator may touch the list; re-check before indexing
            let pair = {
                let v = l.borrow();
                match (v.get(itr), v.get(start)) {
                    (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                    _ => None,
                }
            };
            let Some((a, b)) = pair else {
                return Err(ctx.error(ErrorKind::NotValidIndex, HINT, args[1].clone()));
            };
            let value = ctx.apply(&args[0], vec![a, b])?;
            if value.is_error() {
                return Ok(value);
            }
            if value.as_int().unwrap_or(0) < 0 {
                pivot += 1;
                if pivot != itr {
                    let mut v = l.borrow_mut();
                    if itr < v.len() && pivot < v.len() {
                        v.swap(itr, pivot);
                    }
                }
            }
        }
        if pivot != start {
            let mut v = l.borrow_mut();
            if start < v.len() && pivot < v.len() {
                v.swap(start, pivot);
            }
        }
        Ok(Value::Int(pivot as i64))
    });

    register_fn(env, "copy", |ctx, args| {
        if args.len() != 1 {
            return Err(ctx.error(
                ErrorKind::WrongNumOfArgs,
                "(copy form)",
                Value::list(args.to_vec()),
            ));
        }
        Ok(deep_copy(&args[0]))
    });
}

/// Find first (or last) position: in a list, the `eql` match for the
/// element; in a string, the element's first byte.
fn find_impl(
    ctx: &EvalContext,
    args: &[Value],
    hint: &str,
    from_end: bool,
) -> Result<Value, ImagoError> {
    if args.len() != 2 {
        return Err(ctx.error(ErrorKind::WrongNumOfArgs, hint, Value::list(args.to_vec())));
    }
    if let Some(l) = args[1].as_list() {
        let items = l.borrow();
        let pos = if from_end {
            items.iter().rposition(|v| Value::eql(v, &args[0]))
        } else {
            items.iter().position(|v| Value::eql(v, &args[0]))
        };
        return Ok(pos.map_or_else(Value::nil, |p| Value::Int(p as i64)));
    }
    if args[0].is_str() && args[1].is_str() {
        let needle = args[0].with_str(|b| b.first().copied()).flatten();
        let Some(needle) = needle else {
            return Ok(Value::nil());
        };
        let pos = args[1]
            .with_str(|hay| {
                if from_end {
                    hay.iter().rposition(|b| *b == needle)
                } else {
                    hay.iter().position(|b| *b == needle)
                }
            })
            .flatten();
        return Ok(pos.map_or_else(Value::nil, |p| Value::Int(p as i64)));
    }
    Err(ctx.error(ErrorKind::NotASequence, hint, Value::list(args.to_vec())))
}

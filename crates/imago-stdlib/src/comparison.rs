use imago_core::{Env, ErrorKind, EvalContext, ImagoError, Value};

use crate::register_fn;

/// `t` when every adjacent pair satisfies f, `nil` otherwise.
fn chain(
    ctx: &EvalContext,
    args: &[Value],
    hint: &str,
    f: impl Fn(i64, i64) -> bool,
) -> Result<Value, ImagoError> {
    if args.len() < 2 || !args.iter().all(Value::is_num) {
        return Err(ctx.error(ErrorKind::NotAllNums, hint, Value::list(args.to_vec())));
    }
    let mut prev = args[0].as_int().unwrap_or(0);
    for arg in &args[1..] {
        let next = arg.as_int().unwrap_or(0);
        if !f(prev, next) {
            return Ok(Value::nil());
        }
        prev = next;
    }
    Ok(Value::t())
}

pub fn register(env: &Env) {
    register_fn(env, "=", |ctx, args| {
        chain(ctx, args, "(= num num ...)", |a, b| a == b)
    });

    // All pairwise distinct, not merely adjacent.
    register_fn(env, "/=", |ctx, args| {
        if args.len() < 2 || !args.iter().all(Value::is_num) {
            return Err(ctx.error(
                ErrorKind::NotAllNums,
                "(/= num num ...)",
                Value::list(args.to_vec()),
            ));
        }
        for i in 0..args.len() {
            let a = args[i].as_int().unwrap_or(0);
            for arg in &args[i + 1..] {
                if a == arg.as_int().unwrap_or(0) {
                    return Ok(Value::nil());
                }
            }
        }
        Ok(Value::t())
    });

    register_fn(env, "<", |ctx, args| {
        chain(ctx, args, "(< num num ...)", |a, b| a < b)
    });

    register_fn(env, ">", |ctx, args| {
        chain(ctx, args, "(> num num ...)", |a, b| a > b)
    });

    register_fn(env, "<=", |ctx, args| {
        chain(ctx, args, "(<= num num ...)", |a, b| a <= b)
    });

    register_fn(env, ">=", |ctx, args| {
        chain(ctx, args, "(>= num num ...)", |a, b| a >= b)
    });

    register_fn(env, "eql", |ctx, args| {
        if args.len() != 2 {
            return Err(ctx.error(
                ErrorKind::WrongNumOfArgs,
                "(eql form form)",
                Value::list(args.to_vec()),
            ));
        }
        Ok(Value::bool_sym(Value::eql(&args[0], &args[1])))
    });
}

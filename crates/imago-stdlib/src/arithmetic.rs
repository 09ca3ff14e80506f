use imago_core::{Env, ErrorKind, EvalContext, ImagoError, Value};

use crate::register_fn;

/// Left-fold over two or more integers.
fn fold_nums(
    ctx: &EvalContext,
    args: &[Value],
    hint: &str,
    f: impl Fn(i64, i64) -> i64,
) -> Result<Value, ImagoError> {
    if args.len() < 2 || !args.iter().all(Value::is_num) {
        return Err(ctx.error(ErrorKind::NotAllNums, hint, Value::list(args.to_vec())));
    }
    let mut acc = args[0].as_int().unwrap_or(0);
    for arg in &args[1..] {
        acc = f(acc, arg.as_int().unwrap_or(0));
    }
    Ok(Value::Int(acc))
}

/// Like `fold_nums` but every right-hand operand must be nonzero.
fn fold_div(
    ctx: &EvalContext,
    args: &[Value],
    hint: &str,
    f: impl Fn(i64, i64) -> i64,
) -> Result<Value, ImagoError> {
    if args.len() < 2 || !args.iter().all(Value::is_num) {
        return Err(ctx.error(ErrorKind::NotAllNums, hint, Value::list(args.to_vec())));
    }
    let mut acc = args[0].as_int().unwrap_or(0);
    for arg in &args[1..] {
        let d = arg.as_int().unwrap_or(0);
        if d == 0 {
            return Err(ctx.error(ErrorKind::Error, hint, Value::list(args.to_vec())));
        }
        acc = f(acc, d);
    }
    Ok(Value::Int(acc))
}

pub fn register(env: &Env) {
    register_fn(env, "+", |ctx, args| {
        fold_nums(ctx, args, "(+ num num ...)", i64::wrapping_add)
    });

    register_fn(env, "-", |ctx, args| {
        fold_nums(ctx, args, "(- num num ...)", i64::wrapping_sub)
    });

    register_fn(env, "*", |ctx, args| {
        fold_nums(ctx, args, "(* num num ...)", i64::wrapping_mul)
    });

    register_fn(env, "/", |ctx, args| {
        fold_div(ctx, args, "(/ num num ...)", i64::wrapping_div)
    });

    register_fn(env, "%", |ctx, args| {
        fold_div(ctx, args, "(% num num ...)", i64::wrapping_rem)
    });

    register_fn(env, "max", |ctx, args| {
        fold_nums(ctx, args, "(max num num ...)", i64::max)
    });

    register_fn(env, "min", |ctx, args| {
        fold_nums(ctx, args, "(min num num ...)", i64::min)
    });

    // 16.16 fixed point: scale down after multiplying, up before
    // dividing.
    register_fn(env, "fmul", |ctx, args| {
        fold_nums(ctx, args, "(fmul fixed fixed ...)", |a, b| {
            a.wrapping_mul(b) >> 16
        })
    });

    register_fn(env, "fdiv", |ctx, args| {
        fold_div(ctx, args, "(fdiv fixed fixed ...)", |a, b| {
            (a << 16).wrapping_div(b)
        })
    });
}

use imago_core::{Env, ErrorKind, EvalContext, ImagoError, Value};

use crate::register_fn;

/// Fold with an identity, so zero and one argument are well-defined.
fn fold_bits(
    ctx: &EvalContext,
    args: &[Value],
    hint: &str,
    identity: i64,
    f: impl Fn(i64, i64) -> i64,
) -> Result<Value, ImagoError> {
    if !args.iter().all(Value::is_num) {
        return Err(ctx.error(ErrorKind::NotAllNums, hint, Value::list(args.to_vec())));
    }
    let mut acc = identity;
    for arg in args {
        acc = f(acc, arg.as_int().unwrap_or(0));
    }
    Ok(Value::Int(acc))
}

fn shift(
    ctx: &EvalContext,
    args: &[Value],
    hint: &str,
    f: impl Fn(i64, u32) -> i64,
) -> Result<Value, ImagoError> {
    if args.len() != 2 || !args.iter().all(Value::is_num) {
        return Err(ctx.error(ErrorKind::NotAllNums, hint, Value::list(args.to_vec())));
    }
    let n = args[0].as_int().unwrap_or(0);
    let c = args[1].as_int().unwrap_or(0) as u32;
    Ok(Value::Int(f(n, c)))
}

pub fn register(env: &Env) {
    register_fn(env, "logand", |ctx, args| {
        fold_bits(ctx, args, "(logand [num] ...)", -1, |a, b| a & b)
    });

    register_fn(env, "logior", |ctx, args| {
        fold_bits(ctx, args, "(logior [num] ...)", 0, |a, b| a | b)
    });

    register_fn(env, "logxor", |ctx, args| {
        fold_bits(ctx, args, "(logxor [num] ...)", 0, |a, b| a ^ b)
    });

    register_fn(env, "shl", |ctx, args| {
        shift(ctx, args, "(shl num cnt)", |n, c| n.wrapping_shl(c))
    });

    // Logical right shift.
    register_fn(env, "shr", |ctx, args| {
        shift(ctx, args, "(shr num cnt)", |n, c| {
            (n as u64).wrapping_shr(c) as i64
        })
    });

    // Arithmetic right shift.
    register_fn(env, "asr", |ctx, args| {
        shift(ctx, args, "(asr num cnt)", |n, c| n.wrapping_shr(c))
    });
}

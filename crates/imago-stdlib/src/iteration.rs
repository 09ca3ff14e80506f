use imago_core::{well_known, Env, ErrorKind, EvalContext, ImagoError, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    register_fn(env, "some!", |ctx, args| iterate(ctx, args, true));
    register_fn(env, "each!", |ctx, args| iterate(ctx, args, false));
}

/// Shared driver for `some!`/`each!`: call the lambda for each index of
/// `[start, end)` with the elements of every sequence at that position,
/// `_` bound to the index in a pushed frame. When `start > end` the
/// walk is descending with the `--start; --end` boundary adjustment.
/// `some!` stops when the result crosses its mode sentinel; `each!`
/// runs to completion.
fn iterate(ctx: &EvalContext, args: &[Value], has_mode: bool) -> Result<Value, ImagoError> {
    let hint = if has_mode {
        "(some! start end mode lambda (seq ...))"
    } else {
        "(each! start end lambda (seq ...))"
    };
    let expected = if has_mode { 5 } else { 4 };
    if args.len() != expected {
        return Err(ctx.error(ErrorKind::WrongNumOfArgs, hint, Value::list(args.to_vec())));
    }
    let Some(seqs) = args[expected - 1].as_list() else {
        return Err(ctx.error(ErrorKind::NotAList, hint, args[expected - 1].clone()));
    };
    let (Some(start0), Some(end0)) = (args[0].as_int(), args[1].as_int()) else {
        return Err(ctx.error(ErrorKind::WrongTypes, hint, Value::list(args.to_vec())));
    };
    let mode = if has_mode { args[2].clone() } else { Value::nil() };
    let lambda = args[expected - 2].clone();

    let seqs: Vec<Value> = seqs.borrow().clone();
    let mut max_len: Option<i64> = None;
    for s in &seqs {
        let Some(l) = s.seq_len() else {
            return Err(ctx.error(ErrorKind::NotASequence, hint, s.clone()));
        };
        let l = l as i64;
        max_len = Some(max_len.map_or(l, |m| m.min(l)));
    }
    let initial = if has_mode { mode.clone() } else { Value::nil() };
    let Some(max_len) = max_len else {
        return Ok(initial);
    };

    let mut start = start0;
    if start < 0 {
        start += max_len + 1;
    }
    let mut end = end0;
    if end < 0 {
        end += max_len + 1;
    }
    if start < 0 || start > max_len || end < 0 || end > max_len {
        return Err(ctx.error(ErrorKind::NotValidIndex, hint, Value::list(args.to_vec())));
    }
    let mut dir = 1;
    if start > end {
        dir = -1;
        start -= 1;
        end -= 1;
    }

    let wk = well_known();
    ctx.env_push();
    let result: Result<Value, ImagoError> = (|| {
        let mut value = initial;
        while start != end {
            ctx.insert(wk.underscore, Value::Int(start));
            let mut params = Vec::with_capacity(seqs.len());
            for s in &seqs {
                params.push(s.seq_elem(start as usize).unwrap_or_else(Value::nil));
            }
            value = ctx.apply(&lambda, params)?;
            if value.is_error() {
                break;
            }
            if has_mode {
                if mode.is_nil() != value.is_nil() {
                    break;
                }
            }
            start += dir;
        }
        Ok(value)
    })();
    ctx.env_pop();
    result
}

use std::time::{SystemTime, UNIX_EPOCH};

use imago_core::{Env, ErrorKind, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    // Nanoseconds since the epoch.
    register_fn(env, "time", |ctx, args| {
        if !args.is_empty() {
            return Err(ctx.error(
                ErrorKind::WrongNumOfArgs,
                "(time)",
                Value::list(args.to_vec()),
            ));
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0);
        Ok(Value::Int(nanos))
    });

    // File mtime in whole seconds; 0 when the path cannot be stat'ed.
    register_fn(env, "age", |ctx, args| {
        const HINT: &str = "(age path)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Some(path) = args[0].with_str(|b| String::from_utf8_lossy(b).into_owned()) else {
            return Err(ctx.error(ErrorKind::NotAString, HINT, args[0].clone()));
        };
        let secs = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Ok(Value::Int(secs))
    });

    // Bit-OR'd type code; subtype membership is a mask test.
    register_fn(env, "type-of", |ctx, args| {
        if args.len() != 1 {
            return Err(ctx.error(
                ErrorKind::WrongNumOfArgs,
                "(type-of form)",
                Value::list(args.to_vec()),
            ));
        }
        Ok(Value::Int(args[0].type_of()))
    });
}

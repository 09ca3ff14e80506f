use std::io::Write;
use std::path::Path;

use imago_core::{Env, ErrorKind, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    // Display form, no separators, value of the last argument.
    register_fn(env, "prin", |_ctx, args| {
        let mut value = Value::nil();
        for arg in args {
            print!("{}", arg.fmt_display());
            value = arg.clone();
        }
        let _ = std::io::stdout().flush();
        Ok(value)
    });

    register_fn(env, "print", |_ctx, args| {
        let mut value = Value::nil();
        for arg in args {
            print!("{}", arg.fmt_display());
            value = arg.clone();
        }
        println!();
        Ok(value)
    });

    // Write a string to a path, creating parent directories if needed.
    register_fn(env, "save", |ctx, args| {
        const HINT: &str = "(save str path)";
        if args.len() != 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let (Some(bytes), Some(path)) = (
            args[0].str_bytes(),
            args[1].with_str(|b| String::from_utf8_lossy(b).into_owned()),
        ) else {
            return Err(ctx.error(ErrorKind::NotAllStrings, HINT, Value::list(args.to_vec())));
        };
        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        match std::fs::write(&path, &bytes) {
            Ok(()) => Ok(args[0].clone()),
            Err(_) => Err(ctx.error(ErrorKind::OpenError, HINT, args[1].clone())),
        }
    });

    // Whole file as a string; nil when the file cannot be read.
    register_fn(env, "load", |ctx, args| {
        const HINT: &str = "(load path)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Some(path) = args[0].with_str(|b| String::from_utf8_lossy(b).into_owned()) else {
            return Err(ctx.error(ErrorKind::NotAString, HINT, args[0].clone()));
        };
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Value::string(bytes)),
            Err(_) => Ok(Value::nil()),
        }
    });
}

use imago_core::{Env, ErrorKind, InputStream, OutputStream, Value};

use crate::register_fn;

fn width_arg(v: &Value) -> Option<i64> {
    v.as_int().map(|w| ((w - 1) & 7) + 1)
}

pub fn register(env: &Env) {
    // nil on open failure, so scripts can probe for files.
    register_fn(env, "file-stream", |ctx, args| {
        const HINT: &str = "(file-stream path)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Some(path) = args[0].with_str(|b| String::from_utf8_lossy(b).into_owned()) else {
            return Err(ctx.error(ErrorKind::NotAString, HINT, args[0].clone()));
        };
        match InputStream::from_path(&path) {
            Ok(stream) => Ok(Value::instream(stream)),
            Err(_) => Ok(Value::nil()),
        }
    });

    register_fn(env, "string-stream", |ctx, args| {
        const HINT: &str = "(string-stream str)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Some(bytes) = args[0].str_bytes() else {
            return Err(ctx.error(ErrorKind::NotAString, HINT, args[0].clone()));
        };
        Ok(Value::outstream(OutputStream::memory(bytes)))
    });

    // One form from the stream; nil at end of input.
    register_fn(env, "read", |ctx, args| {
        const HINT: &str = "(read stream)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Value::InStream(stream) = &args[0] else {
            return Err(ctx.error(ErrorKind::NotAStream, HINT, args[0].clone()));
        };
        let form = imago_reader::read(ctx, &mut stream.borrow_mut())?;
        Ok(form.unwrap_or_else(Value::nil))
    });

    // 1-8 bytes packed into one little-endian integer; nil at end of
    // input.
    register_fn(env, "read-char", |ctx, args| {
        const HINT: &str = "(read-char stream [width])";
        if args.is_empty() || args.len() > 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Value::InStream(stream) = &args[0] else {
            return Err(ctx.error(ErrorKind::NotAStream, HINT, args[0].clone()));
        };
        let width = match args.get(1) {
            None => 1,
            Some(v) => match width_arg(v) {
                Some(w) => w,
                None => return Err(ctx.error(ErrorKind::NotANumber, HINT, v.clone())),
            },
        };
        let mut value: i64 = 0;
        let mut stream = stream.borrow_mut();
        for k in 0..width {
            match stream.next() {
                Some(b) => value |= (b as i64) << (8 * k),
                None => return Ok(Value::nil()),
            }
        }
        Ok(Value::Int(value))
    });

    register_fn(env, "read-line", |ctx, args| {
        const HINT: &str = "(read-line stream)";
        if args.len() != 1 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Value::InStream(stream) = &args[0] else {
            return Err(ctx.error(ErrorKind::NotAStream, HINT, args[0].clone()));
        };
        let line = stream.borrow_mut().read_line();
        Ok(line.map_or_else(Value::nil, Value::string))
    });

    register_fn(env, "write", |ctx, args| {
        const HINT: &str = "(write stream str)";
        if args.len() != 2 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Value::OutStream(stream) = &args[0] else {
            return Err(ctx.error(ErrorKind::NotAStream, HINT, args[0].clone()));
        };
        let Some(bytes) = args[1].str_bytes() else {
            return Err(ctx.error(ErrorKind::NotAString, HINT, args[1].clone()));
        };
        stream.borrow_mut().write(&bytes);
        Ok(args[0].clone())
    });

    // Write one packed integer, or a list of them, `width` bytes each.
    register_fn(env, "write-char", |ctx, args| {
        const HINT: &str = "(write-char stream list|num [width])";
        if args.len() < 2 || args.len() > 3 {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, Value::list(args.to_vec())));
        }
        let Value::OutStream(stream) = &args[0] else {
            return Err(ctx.error(ErrorKind::NotAStream, HINT, args[0].clone()));
        };
        let width = match args.get(2) {
            None => 1,
            Some(v) => match width_arg(v) {
                Some(w) => w as usize,
                None => return Err(ctx.error(ErrorKind::NotANumber, HINT, v.clone())),
            },
        };
        let nums: Vec<i64> = if let Some(l) = args[1].as_list() {
            let items = l.borrow();
            if items.is_empty() {
                return Err(ctx.error(
                    ErrorKind::WrongNumOfArgs,
                    HINT,
                    Value::list(args.to_vec()),
                ));
            }
            let mut nums = Vec::with_capacity(items.len());
            for item in items.iter() {
                match item.as_int() {
                    Some(n) => nums.push(n),
                    None => return Err(ctx.error(ErrorKind::NotANumber, HINT, item.clone())),
                }
            }
            nums
        } else if let Some(n) = args[1].as_int() {
            vec![n]
        } else {
            return Err(ctx.error(ErrorKind::NotANumber, HINT, args[1].clone()));
        };
        let mut stream = stream.borrow_mut();
        for n in nums {
            stream.write(&n.to_le_bytes()[..width]);
        }
        Ok(args[0].clone())
    });
}

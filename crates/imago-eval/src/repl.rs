use imago_core::{well_known, ErrorKind, EvalContext, ImagoError, Value};

use crate::expand;

/// Drive one input stream through the read → expand → eval → print
/// loop.
///
/// `*stream-name*` and `*stream-line*` are bound for the duration and
/// restored on exit; `*stream-line*` tracks the stream's own counter
/// form by form so errors report where they were raised. A top-level
/// error is printed and terminates this stream; it is also returned so
/// the caller can decide whether the whole interpreter stops (it does
/// for the boot stream).
pub fn repl(
    ctx: &EvalContext,
    stream: &Value,
    name: &str,
    print_results: bool,
) -> Result<(), ImagoError> {
    let wk = well_known();
    let Value::InStream(input) = stream else {
        return Err(ctx.error(ErrorKind::NotAStream, "(repl stream name)", stream.clone()));
    };
    let env = ctx.env();
    let saved_name = env.get(wk.stream_name);
    let saved_line = env.get(wk.stream_line);
    env.insert(wk.stream_name, Value::string(name));
    env.insert(wk.stream_line, Value::int(0));

    let result = loop {
        let form = match imago_reader::read(ctx, &mut input.borrow_mut()) {
            Ok(Some(form)) => form,
            Ok(None) => break Ok(()),
            Err(e) => {
                eprintln!("{e}");
                break Err(e);
            }
        };
        let line = input.borrow().line as i64;
        env.insert(wk.stream_line, Value::int(line));
        let mut form = form;
        let expanded: Result<(), ImagoError> = (|| {
            while expand::expand(ctx, &mut form, 0)? != 0 {}
            Ok(())
        })();
        if let Err(e) = expanded {
            eprintln!("{e}");
            break Err(e);
        }
        match ctx.eval(&form) {
            Ok(Value::Error(e)) => {
                eprintln!("{e}");
                break Err(e);
            }
            Ok(v) => {
                if print_results {
                    println!("{v}");
                }
            }
            Err(e) => {
                eprintln!("{e}");
                break Err(e);
            }
        }
    };

    match saved_name {
        Some(v) => env.insert(wk.stream_name, v),
        None => {
            env.erase(wk.stream_name);
        }
    }
    match saved_line {
        Some(v) => env.insert(wk.stream_line, v),
        None => {
            env.erase(wk.stream_line);
        }
    }
    result
}

use imago_core::{intern, well_known, ErrorKind, EvalContext, ImagoError, InputStream, Spur, Value};

/// Read one form from the stream. `Ok(None)` is end of input; callers
/// that need a value surface it as the `nil` symbol.
///
/// The grammar is driven entirely by the next peeked byte:
/// whitespace and `;` comments are skipped, `(` opens a list, `"`/`{`
/// open string literals (no escapes), a digit or `-`digit opens a
/// number, the four reader-macro characters wrap the following form,
/// and anything else starts a symbol.
pub fn read(ctx: &EvalContext, stream: &mut InputStream) -> Result<Option<Value>, ImagoError> {
    let c = loop {
        let c = skip_whitespace(stream);
        if c == Some(b';') {
            skip_line(stream);
            continue;
        }
        break c;
    };
    let wk = well_known();
    match c {
        None => Ok(None),
        Some(c @ (b')' | b'}')) => {
            stream.next();
            Err(ctx.error_at(
                ErrorKind::Error,
                "unexpected close",
                stream.line as i64,
                Value::string(vec![c]),
            ))
        }
        Some(b'(') => read_list(ctx, stream).map(Some),
        Some(b'"') => read_string(ctx, stream, b'"').map(Some),
        Some(b'{') => read_string(ctx, stream, b'}').map(Some),
        Some(b'\'') => read_rmacro(ctx, stream, wk.quote).map(Some),
        Some(b'`') => read_rmacro(ctx, stream, wk.qquote).map(Some),
        Some(b',') => read_rmacro(ctx, stream, wk.unquote).map(Some),
        Some(b'~') => read_rmacro(ctx, stream, wk.splicing).map(Some),
        Some(b'-') => {
            stream.next();
            if stream.peek().is_some_and(|p| p.is_ascii_digit()) {
                Ok(Some(read_number(stream, true)))
            } else {
                Ok(Some(read_symbol(stream, Some(b'-'))))
            }
        }
        Some(c) if c.is_ascii_digit() => Ok(Some(read_number(stream, false))),
        Some(_) => Ok(Some(read_symbol(stream, None))),
    }
}

/// Read every remaining form. Test and `eval_str` convenience.
pub fn read_all(ctx: &EvalContext, src: &str) -> Result<Vec<Value>, ImagoError> {
    let mut stream = InputStream::from_bytes(src);
    let mut out = Vec::new();
    while let Some(v) = read(ctx, &mut stream)? {
        out.push(v);
    }
    Ok(out)
}

fn skip_whitespace(stream: &mut InputStream) -> Option<u8> {
    loop {
        let p = stream.peek()?;
        if !p.is_ascii_whitespace() {
            return Some(p);
        }
        stream.next();
    }
}

fn skip_line(stream: &mut InputStream) {
    while let Some(c) = stream.next() {
        if c == b'\n' {
            break;
        }
    }
}

fn read_list(ctx: &EvalContext, stream: &mut InputStream) -> Result<Value, ImagoError> {
    stream.next(); // consume '('
    let mut items = Vec::new();
    loop {
        let c = loop {
            let c = skip_whitespace(stream);
            if c == Some(b';') {
                skip_line(stream);
                continue;
            }
            break c;
        };
        match c {
            None => {
                return Err(ctx.error_at(
                    ErrorKind::Error,
                    "unexpected end of stream",
                    stream.line as i64,
                    Value::list(items),
                ))
            }
            Some(b')') => {
                stream.next();
                return Ok(Value::list(items));
            }
            Some(_) => match read(ctx, stream)? {
                Some(v) => items.push(v),
                None => {
                    return Err(ctx.error_at(
                        ErrorKind::Error,
                        "unexpected end of stream",
                        stream.line as i64,
                        Value::list(items),
                    ))
                }
            },
        }
    }
}

fn read_string(
    ctx: &EvalContext,
    stream: &mut InputStream,
    term: u8,
) -> Result<Value, ImagoError> {
    stream.next(); // consume the opening quote
    let mut bytes = Vec::new();
    loop {
        match stream.next() {
            None => {
                return Err(ctx.error_at(
                    ErrorKind::Error,
                    "unterminated string",
                    stream.line as i64,
                    Value::string(bytes),
                ))
            }
            Some(c) if c == term => return Ok(Value::string(bytes)),
            Some(c) => bytes.push(c),
        }
    }
}

fn read_rmacro(
    ctx: &EvalContext,
    stream: &mut InputStream,
    sym: Spur,
) -> Result<Value, ImagoError> {
    stream.next(); // consume the macro character
    match read(ctx, stream)? {
        Some(form) => Ok(Value::list(vec![Value::Symbol(sym), form])),
        None => Err(ctx.error_at(
            ErrorKind::Error,
            "unexpected end of stream",
            stream.line as i64,
            Value::Symbol(sym),
        )),
    }
}

/// A symbol absorbs any run of bytes that is not whitespace and not a
/// paren. The caller may have already consumed the first byte.
fn read_symbol(stream: &mut InputStream, first: Option<u8>) -> Value {
    let mut bytes = Vec::new();
    if let Some(b) = first {
        bytes.push(b);
    }
    while let Some(p) = stream.peek() {
        if p == b'(' || p == b')' || p.is_ascii_whitespace() {
            break;
        }
        bytes.push(p);
        stream.next();
    }
    Value::Symbol(intern(&String::from_utf8_lossy(&bytes)))
}

/// A number absorbs digits, `.` and letters. The byte at index 1 picks
/// the base (`0x` hex, `0o` octal, `0b` binary); a `.` switches the
/// accumulator into fractional mode and the final value is scaled into
/// 16.16 fixed point. The sign is applied last.
fn read_number(stream: &mut InputStream, negative: bool) -> Value {
    let mut buffer = Vec::new();
    while let Some(p) = stream.peek() {
        if p == b'.' || p.is_ascii_digit() || p.is_ascii_alphabetic() {
            buffer.push(p);
            stream.next();
        } else {
            break;
        }
    }
    let mut base: i64 = 10;
    let mut start = 0;
    if buffer.len() > 1 {
        match buffer[1] {
            b'x' => {
                base = 16;
                start = 2;
            }
            b'o' => {
                base = 8;
                start = 2;
            }
            b'b' => {
                base = 2;
                start = 2;
            }
            _ => {}
        }
    }
    let mut value: i64 = 0;
    let mut frac: i64 = 0;
    for &c in &buffer[start..] {
        if c == b'.' {
            frac = 1;
            continue;
        }
        let d = match c {
            b'a'..=b'z' => (c - b'a' + 10) as i64,
            b'A'..=b'Z' => (c - b'A' + 10) as i64,
            _ => (c - b'0') as i64,
        };
        value = value.wrapping_mul(base).wrapping_add(d);
        frac = frac.wrapping_mul(base);
    }
    if frac != 0 {
        value = (value << 16).wrapping_div(frac);
    }
    if negative {
        value = value.wrapping_neg();
    }
    Value::Int(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read1(src: &str) -> Value {
        let ctx = EvalContext::new();
        let mut stream = InputStream::from_bytes(src);
        read(&ctx, &mut stream).unwrap().unwrap()
    }

    #[test]
    fn integers_and_bases() {
        assert_eq!(read1("42"), Value::int(42));
        assert_eq!(read1("-7"), Value::int(-7));
        assert_eq!(read1("0x10"), Value::int(16));
        assert_eq!(read1("0o17"), Value::int(15));
        assert_eq!(read1("0b101"), Value::int(5));
        assert_eq!(read1("-0x10"), Value::int(-16));
    }

    #[test]
    fn fixed_point() {
        // 1.5 -> 3 * 2^16 / 2
        assert_eq!(read1("1.5"), Value::int(98304));
        assert_eq!(read1("0.5"), Value::int(32768));
        assert_eq!(read1("-1.5"), Value::int(-98304));
        assert_eq!(read1("2.0"), Value::int(131072));
    }

    #[test]
    fn minus_alone_is_a_symbol() {
        assert_eq!(read1("-"), Value::symbol("-"));
        assert_eq!(read1("->x"), Value::symbol("->x"));
    }

    #[test]
    fn string_forms() {
        assert_eq!(read1("\"hello\""), Value::string("hello"));
        assert_eq!(read1("{braced text}"), Value::string("braced text"));
        assert_eq!(read1("\"\""), Value::string(""));
    }

    #[test]
    fn reader_macros() {
        assert_eq!(read1("'x").to_string(), "(quote x)");
        assert_eq!(read1("`x").to_string(), "(quasi-quote x)");
        assert_eq!(read1(",x").to_string(), "(unquote x)");
        assert_eq!(read1("~x").to_string(), "(unquote-splicing x)");
        assert_eq!(read1("'(a b)").to_string(), "(quote (a b))");
    }

    #[test]
    fn comments_and_whitespace() {
        assert_eq!(read1("  ; comment\n  42"), Value::int(42));
        assert_eq!(read1("(1 ; two\n 3)").to_string(), "(1 3)");
    }

    #[test]
    fn nested_lists() {
        assert_eq!(read1("(a (b (c)) d)").to_string(), "(a (b (c)) d)");
        assert_eq!(read1("()").to_string(), "()");
    }

    #[test]
    fn stray_close_is_an_error() {
        let ctx = EvalContext::new();
        let mut stream = InputStream::from_bytes(")");
        assert!(read(&ctx, &mut stream).is_err());
        let mut stream = InputStream::from_bytes("}");
        assert!(read(&ctx, &mut stream).is_err());
    }

    #[test]
    fn unterminated_forms_error() {
        let ctx = EvalContext::new();
        let mut stream = InputStream::from_bytes("(1 2");
        assert!(read(&ctx, &mut stream).is_err());
        let mut stream = InputStream::from_bytes("\"abc");
        assert!(read(&ctx, &mut stream).is_err());
    }

    #[test]
    fn end_of_input_is_none() {
        let ctx = EvalContext::new();
        let mut stream = InputStream::from_bytes("  ; just a comment");
        assert_eq!(read(&ctx, &mut stream).unwrap(), None);
    }

    #[test]
    fn symbols_are_canonical() {
        let a = read1("foobar");
        let b = read1("foobar");
        assert!(Value::identity_eq(&a, &b));
    }

    #[test]
    fn reader_error_carries_line() {
        let ctx = EvalContext::new();
        let mut stream = InputStream::from_bytes("1\n2\n)");
        assert_eq!(read(&ctx, &mut stream).unwrap(), Some(Value::int(1)));
        assert_eq!(read(&ctx, &mut stream).unwrap(), Some(Value::int(2)));
        let err = read(&ctx, &mut stream).unwrap_err();
        assert_eq!(err.line(), 3);
    }
}

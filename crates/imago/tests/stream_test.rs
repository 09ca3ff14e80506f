use imago_core::Value;
use imago_eval::Interpreter;

fn eval_with(interp: &Interpreter, src: &str) -> Value {
    interp
        .eval_str(src)
        .unwrap_or_else(|e| panic!("failed to eval `{src}`: {e}"))
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt").display().to_string();
    let interp = Interpreter::new();
    assert_eq!(
        eval_with(&interp, &format!("(save \"payload\" \"{path}\")")),
        Value::string("payload")
    );
    assert_eq!(
        eval_with(&interp, &format!("(load \"{path}\")")),
        Value::string("payload")
    );
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a/b/c.txt").display().to_string();
    let interp = Interpreter::new();
    eval_with(&interp, &format!("(save \"deep\" \"{path}\")"));
    assert_eq!(
        eval_with(&interp, &format!("(load \"{path}\")")),
        Value::string("deep")
    );
}

#[test]
fn load_of_missing_file_is_nil() {
    let interp = Interpreter::new();
    assert_eq!(eval_with(&interp, "(load \"no/such/file\")"), Value::nil());
}

#[test]
fn file_stream_reads_forms() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.lisp").display().to_string();
    std::fs::write(&path, "(+ 1 2) 42").unwrap();
    let interp = Interpreter::new();
    eval_with(&interp, &format!("(defq fs (file-stream \"{path}\"))"));
    assert_eq!(eval_with(&interp, "(eval (read fs))"), Value::int(3));
    assert_eq!(eval_with(&interp, "(read fs)"), Value::int(42));
    // end of input surfaces as nil
    assert_eq!(eval_with(&interp, "(read fs)"), Value::nil());
}

#[test]
fn file_stream_of_missing_path_is_nil() {
    let interp = Interpreter::new();
    assert_eq!(
        eval_with(&interp, "(file-stream \"no/such/file\")"),
        Value::nil()
    );
}

#[test]
fn read_char_packs_little_endian() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bytes.bin").display().to_string();
    std::fs::write(&path, b"AB").unwrap();
    let interp = Interpreter::new();
    eval_with(&interp, &format!("(defq fs (file-stream \"{path}\"))"));
    // 'A' | 'B' << 8
    assert_eq!(eval_with(&interp, "(read-char fs 2)"), Value::int(0x4241));
    assert_eq!(eval_with(&interp, "(read-char fs)"), Value::nil());
}

#[test]
fn read_line_strips_the_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lines.txt").display().to_string();
    std::fs::write(&path, "one\ntwo").unwrap();
    let interp = Interpreter::new();
    eval_with(&interp, &format!("(defq fs (file-stream \"{path}\"))"));
    assert_eq!(eval_with(&interp, "(read-line fs)"), Value::string("one"));
    assert_eq!(eval_with(&interp, "(read-line fs)"), Value::string("two"));
    assert_eq!(eval_with(&interp, "(read-line fs)"), Value::nil());
}

#[test]
fn string_stream_accumulates() {
    let interp = Interpreter::new();
    eval_with(&interp, "(defq ss (string-stream \"\"))");
    eval_with(&interp, "(write ss \"hi\")");
    eval_with(&interp, "(write-char ss 33)");
    assert_eq!(eval_with(&interp, "(str ss)"), Value::string("hi!"));
}

#[test]
fn string_stream_starts_with_contents() {
    let interp = Interpreter::new();
    assert_eq!(
        eval_with(&interp, "(str (string-stream \"seed\"))"),
        Value::string("seed")
    );
}

#[test]
fn write_char_widths_and_lists() {
    let interp = Interpreter::new();
    eval_with(&interp, "(defq ss (string-stream \"\"))");
    // 0x4241 over two bytes is "AB"
    eval_with(&interp, "(write-char ss 16961 2)");
    eval_with(&interp, "(write-char ss (list 67 68))");
    assert_eq!(eval_with(&interp, "(str ss)"), Value::string("ABCD"));
}

#[test]
fn write_returns_the_stream() {
    let interp = Interpreter::new();
    // the same stream object comes back
    assert_eq!(
        eval_with(&interp, "(defq ss (string-stream \"\")) (eql ss (write ss \"x\"))"),
        Value::t()
    );
    assert_eq!(
        eval_with(
            &interp,
            "(defq ss2 (string-stream \"\")) (str (write (write ss2 \"a\") \"b\"))"
        ),
        Value::string("ab")
    );
}

#[test]
fn age_of_fresh_file_is_positive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt").display().to_string();
    std::fs::write(&path, "x").unwrap();
    let interp = Interpreter::new();
    assert!(eval_with(&interp, &format!("(age \"{path}\")")).as_int().unwrap() > 0);
}

use imago_core::{intern, well_known, InputStream, Value};
use imago_eval::{repl, Interpreter};

fn stream(src: &str) -> Value {
    Value::instream(InputStream::from_bytes(src))
}

#[test]
fn repl_runs_a_stream_to_completion() {
    let interp = Interpreter::new();
    let result = repl(&interp.ctx, &stream("(defq a 1) (defq b (+ a 1))"), "test", false);
    assert!(result.is_ok());
    assert_eq!(interp.ctx.lookup(intern("a")), Some(Value::int(1)));
    assert_eq!(interp.ctx.lookup(intern("b")), Some(Value::int(2)));
}

#[test]
fn error_terminates_the_stream() {
    let interp = Interpreter::new();
    let result = repl(
        &interp.ctx,
        &stream("(defq a 1) (no-such-fn) (defq a 99)"),
        "test",
        false,
    );
    assert!(result.is_err());
    // the form after the error never ran
    assert_eq!(interp.ctx.lookup(intern("a")), Some(Value::int(1)));
}

#[test]
fn errors_carry_stream_name_and_line() {
    let interp = Interpreter::new();
    let err = repl(
        &interp.ctx,
        &stream("(defq a 1)\n(defq b 2)\n(boom)"),
        "test.inc",
        false,
    )
    .unwrap_err();
    assert_eq!(err.file(), "test.inc");
    assert_eq!(err.line(), 3);
}

#[test]
fn stream_bindings_restored_on_exit() {
    let interp = Interpreter::new();
    let wk = well_known();
    let before = interp.ctx.lookup(wk.stream_name);
    repl(&interp.ctx, &stream("(defq a 1)"), "inner", false).unwrap();
    assert_eq!(interp.ctx.lookup(wk.stream_name), before);
}

#[test]
fn macros_defined_in_a_stream_apply_later_in_it() {
    let interp = Interpreter::new();
    repl(
        &interp.ctx,
        &stream("(defmacro double (x) `(* 2 ,x)) (defq r (double 21))"),
        "test",
        false,
    )
    .unwrap();
    assert_eq!(interp.ctx.lookup(intern("r")), Some(Value::int(42)));
}

#[test]
fn reader_errors_terminate_too() {
    let interp = Interpreter::new();
    assert!(repl(&interp.ctx, &stream("(defq a 1) )"), "test", false).is_err());
}

use imago_core::Value;
use imago_eval::Interpreter;

fn eval(src: &str) -> Value {
    let interp = Interpreter::new();
    interp
        .eval_str(src)
        .unwrap_or_else(|e| panic!("failed to eval `{src}`: {e}"))
}

fn eval_to_string(src: &str) -> String {
    eval(src).to_string()
}

fn eval_is_error(src: &str) -> bool {
    let interp = Interpreter::new();
    match interp.eval_str(src) {
        Err(_) => true,
        Ok(v) => v.is_error(),
    }
}

#[test]
fn required_params() {
    assert_eq!(eval_to_string("((lambda (a b) (list a b)) 1 2)"), "(1 2)");
}

#[test]
fn rest_takes_a_slice() {
    assert_eq!(
        eval_to_string("((lambda (a &rest b) (list a b)) 1 2 3)"),
        "(1 (2 3))"
    );
    assert_eq!(
        eval_to_string("((lambda (a &rest b) (list a b)) 1)"),
        "(1 ())"
    );
}

#[test]
fn optional_binds_nil_when_absent() {
    assert_eq!(
        eval_to_string("((lambda (a &optional b) (list a b)) 1)"),
        "(1 nil)"
    );
    assert_eq!(
        eval_to_string("((lambda (a &optional b) (list a b)) 1 2)"),
        "(1 2)"
    );
    assert_eq!(
        eval_to_string("((lambda (a &optional b c) (list a b c)) 1 2)"),
        "(1 2 nil)"
    );
}

#[test]
fn nested_list_patterns() {
    assert_eq!(
        eval_to_string("((lambda ((a b) c) (list a b c)) '(1 2) 3)"),
        "(1 2 3)"
    );
    assert_eq!(
        eval_to_string("((lambda ((a (b c)) d) (list a b c d)) '(1 (2 3)) 4)"),
        "(1 2 3 4)"
    );
}

#[test]
fn arity_mismatches() {
    assert!(eval_is_error("((lambda (a) a))"));
    assert!(eval_is_error("((lambda (a) a) 1 2)"));
    assert!(eval_is_error("((lambda ((a b)) a) 5)"));
}

#[test]
fn bind_builtin_into_current_frame() {
    assert_eq!(eval("(bind '(a b) '(1 2)) (+ a b)"), Value::int(3));
    assert_eq!(
        eval_to_string("(bind '(x &rest y) \"abc\") (list x y)"),
        "(\"a\" \"bc\")"
    );
    assert!(eval_is_error("(bind '(a) '(1 2))"));
    assert!(eval_is_error("(bind 5 '(1))"));
    assert!(eval_is_error("(bind '(a) 5)"));
}

#[test]
fn bind_against_strings() {
    // strings are sequences; elements are one-byte strings
    assert_eq!(
        eval_to_string("(bind '(a b c) \"xyz\") (list a b c)"),
        "(\"x\" \"y\" \"z\")"
    );
}

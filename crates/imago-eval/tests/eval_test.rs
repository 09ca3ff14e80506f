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

/// True when evaluation surfaces an error, whether as Err or as an
/// error value.
fn eval_is_error(src: &str) -> bool {
    let interp = Interpreter::new();
    match interp.eval_str(src) {
        Err(_) => true,
        Ok(v) => v.is_error(),
    }
}

#[test]
fn self_evaluating_forms() {
    assert_eq!(eval("42"), Value::int(42));
    assert_eq!(eval("\"abc\""), Value::string("abc"));
    assert_eq!(eval_to_string("()"), "()");
}

#[test]
fn arithmetic() {
    assert_eq!(eval("(+ 1 2 3)"), Value::int(6));
    assert_eq!(eval("(- 10 3 2)"), Value::int(5));
    assert_eq!(eval("(* 2 3 4)"), Value::int(24));
    assert_eq!(eval("(/ 100 5 2)"), Value::int(10));
    assert_eq!(eval("(% 10 3)"), Value::int(1));
    assert_eq!(eval("(max 1 7 3)"), Value::int(7));
    assert_eq!(eval("(min 4 2 9)"), Value::int(2));
}

#[test]
fn division_by_zero_is_an_error() {
    assert!(eval_is_error("(/ 1 0)"));
    assert!(eval_is_error("(% 1 0)"));
}

#[test]
fn lambda_application() {
    assert_eq!(eval("(defq f (lambda (x) (* x x))) (f 7)"), Value::int(49));
    assert_eq!(eval("((lambda (x y) (+ x y)) 3 4)"), Value::int(7));
    assert_eq!(eval("((lambda () 99))"), Value::int(99));
}

#[test]
fn lambda_body_sequences() {
    assert_eq!(
        eval("((lambda (x) (defq y (+ x 1)) (* y 2)) 10)"),
        Value::int(22)
    );
}

#[test]
fn recursion() {
    assert_eq!(
        eval(
            "(defq fact (lambda (n) (cond ((< n 2) 1) (t (* n (fact (- n 1)))))))
             (fact 10)"
        ),
        Value::int(3628800)
    );
}

#[test]
fn symbol_not_bound() {
    assert!(eval_is_error("no-such-symbol"));
    assert!(eval_is_error("(setq no-such-symbol 1)"));
}

#[test]
fn defq_setq() {
    assert_eq!(eval("(defq x 5) x"), Value::int(5));
    assert_eq!(eval("(defq x 1 y 2) (+ x y)"), Value::int(3));
    assert_eq!(eval("(defq x 1) (setq x 9) x"), Value::int(9));
    // defq returns the value, defmacro the name
    assert_eq!(eval("(defq x 5)"), Value::int(5));
}

#[test]
fn progn_creates_a_frame() {
    // the inner defq shadows; the outer binding is untouched
    assert_eq!(eval("(defq x 1) (progn (defq x 2) x)"), Value::int(2));
    assert_eq!(eval("(defq x 1) (progn (defq x 2) x) x"), Value::int(1));
    // setq reaches through the frame
    assert_eq!(eval("(defq x 1) (progn (setq x 2)) x"), Value::int(2));
}

#[test]
fn cond_dispatch() {
    assert_eq!(
        eval("(cond ((eql 1 2) 'a) ((eql 1 1) 'b) (t 'c))"),
        Value::symbol("b")
    );
    assert_eq!(eval("(cond (nil 1))"), Value::nil());
    assert_eq!(eval("(cond)"), Value::nil());
    assert_eq!(eval("(cond (t))"), Value::nil());
    assert!(eval_is_error("(cond 5)"));
}

#[test]
fn while_loop() {
    assert_eq!(
        eval("(defq acc 0) (while (< acc 5) (setq acc (+ acc 1))) acc"),
        Value::int(5)
    );
    assert_eq!(eval("(while nil 1)"), Value::nil());
}

#[test]
fn catch_semantics() {
    // handler value when non-nil
    assert_eq!(eval("(catch (/ 1 0) t)"), Value::t());
    // the original error when the handler yields nil
    assert!(eval("(catch (/ 1 0) nil)").is_error());
    // pass-through when no error
    assert_eq!(eval("(catch 5 t)"), Value::int(5));
}

#[test]
fn error_values_are_contagious() {
    assert!(eval_is_error("(+ 1 (/ 1 0))"));
    // an error stored as a value still propagates through arguments
    assert!(eval_is_error("(+ (catch (/ 1 0) nil) 1)"));
    assert!(eval_is_error("((lambda (e) 1) (catch (/ 1 0) nil))"));
}

#[test]
fn quote_returns_form_unevaluated() {
    assert_eq!(eval_to_string("(quote (a b c))"), "(a b c)");
    assert_eq!(eval("'x"), Value::symbol("x"));
    assert_eq!(eval_to_string("''x"), "(quote x)");
}

#[test]
fn eval_builtin() {
    assert_eq!(eval("(defq a 5) (eval 'a)"), Value::int(5));
    assert_eq!(eval("(eval '(+ 1 2))"), Value::int(3));
    assert_eq!(eval("(eval '(+ 1 2) (env))"), Value::int(3));
    assert!(eval_is_error("(eval '(+ 1 2) 9)"));
}

#[test]
fn apply_builtin() {
    assert_eq!(eval("(apply + (list 1 2 3))"), Value::int(6));
    assert_eq!(eval("(apply (lambda (a b) (* a b)) '(6 7))"), Value::int(42));
    assert!(eval_is_error("(apply 1 2)"));
}

#[test]
fn def_set_on_explicit_env() {
    assert_eq!(eval("(def (env) 'q 42) q"), Value::int(42));
    assert_eq!(eval("(defq w 1) (set (env) 'w 5) w"), Value::int(5));
    assert!(eval_is_error("(set (env) 'missing 1)"));
    assert_eq!(eval("(defq v 3) (def? 'v)"), Value::int(3));
    assert_eq!(eval("(def? 'zz)"), Value::nil());
}

#[test]
fn env_is_first_class() {
    assert_eq!(eval("(type-of (env))"), Value::int(Value::Env(imago_core::Env::new()).type_of()));
    // eval with an explicit environment sees its bindings
    assert_eq!(eval("(defq e (env)) (def e 'inner 7) (eval 'inner e)"), Value::int(7));
}

#[test]
fn throw_builtin() {
    assert!(eval_is_error("(throw \"boom\" 42)"));
    assert_eq!(eval("(catch (throw \"boom\" 42) t)"), Value::t());
}

#[test]
fn not_a_lambda() {
    assert!(eval_is_error("(1 2)"));
    assert!(eval_is_error("(\"s\" 1)"));
    assert!(eval_is_error("((list 1 2) 3)"));
}

#[test]
fn gensym_and_sym() {
    let interp = Interpreter::new();
    let a = interp.eval_str("(gensym)").unwrap();
    let b = interp.eval_str("(gensym)").unwrap();
    assert!(!Value::identity_eq(&a, &b));
    assert_eq!(eval("(eql 'abc (sym \"abc\"))"), Value::t());
    assert_eq!(eval("(sym 'abc)"), Value::symbol("abc"));
}

#[test]
fn raw_builtins_survive_rebinding() {
    // the raw flag travels with the value, not the name
    assert_eq!(eval("(defq iff cond) (iff (nil 1) (t 2))"), Value::int(2));
    assert_eq!(eval_to_string("(defq q quote) (q (a b))"), "(a b)");
}

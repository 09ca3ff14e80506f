use std::rc::Rc;

use imago_core::{intern, well_known, Env, ErrorKind, EvalContext, ImagoError, NativeFn, Value};

use crate::bind::env_bind;

/// Register the control built-ins. The raw ones receive the whole
/// unevaluated form (head included); rebinding one of them to another
/// name keeps its raw behavior because the flag lives on the value.
pub fn register(env: &Env) {
    register_raw(env, "quote", quote);
    register_raw(env, "quasi-quote", qquote);
    register_raw(env, "cond", cond);
    register_raw(env, "while", lwhile);
    register_raw(env, "catch", catch);
    register_raw(env, "lambda", closure);
    register_raw(env, "macro", closure);
    register_raw(env, "progn", progn);
    register_raw(env, "env", env_fn);
    register_raw(env, "defq", defq);
    register_raw(env, "setq", setq);
    register_raw(env, "defmacro", defmacro);

    register_fn(env, "eval", eval_fn);
    register_fn(env, "apply", apply_fn);
    register_fn(env, "bind", bind_fn);
    register_fn(env, "def", def);
    register_fn(env, "set", set);
    register_fn(env, "def?", defined);
    register_fn(env, "throw", throw);
}

fn register_fn(
    env: &Env,
    name: &str,
    f: fn(&EvalContext, &[Value]) -> Result<Value, ImagoError>,
) {
    env.insert(intern(name), Value::Func(Rc::new(NativeFn::new(name, f))));
}

fn register_raw(
    env: &Env,
    name: &str,
    f: fn(&EvalContext, &[Value]) -> Result<Value, ImagoError>,
) {
    env.insert(intern(name), Value::Func(Rc::new(NativeFn::raw(name, f))));
}

fn form_value(form: &[Value]) -> Value {
    Value::list(form.to_vec())
}

// ── Raw specials ──────────────────────────────────────────────────

fn quote(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    if form.len() == 2 {
        Ok(form[1].clone())
    } else {
        Err(ctx.error(ErrorKind::WrongNumOfArgs, "(quote form)", form_value(form)))
    }
}

/// `lambda` and `macro` evaluate to a copy of their own form; the
/// applier recognises the head marker later.
fn closure(_ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    Ok(form_value(form))
}

fn qquote(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    if form.len() != 2 {
        return Err(ctx.error(
            ErrorKind::WrongNumOfArgs,
            "(quasi-quote form)",
            form_value(form),
        ));
    }
    let wk = well_known();
    let Some(items) = form[1].as_list() else {
        return Ok(form[1].clone());
    };
    let items: Vec<Value> = items.borrow().clone();
    let mut cat_list = vec![Value::Symbol(wk.cat)];
    for item in &items {
        qquote1(ctx, item, &mut cat_list)?;
    }
    ctx.eval(&Value::list(cat_list))
}

/// Contribute one reconstructed sibling to the surrounding `(cat ...)`:
/// `(unquote e)` becomes `(list e)`, `(unquote-splicing e)` becomes `e`,
/// any other sub-list is rebuilt recursively right now and wrapped
/// `(list (quote built))`, and atoms wrap as `(list (quote atom))`.
fn qquote1(ctx: &EvalContext, o: &Value, cat_list: &mut Vec<Value>) -> Result<(), ImagoError> {
    let wk = well_known();
    let sub = o.as_list().map(|l| l.borrow().clone());
    if let Some(sub) = sub {
        if let Some(first) = sub.first() {
            if first.as_spur() == Some(wk.unquote) {
                let inner = sub.get(1).cloned().unwrap_or_else(Value::nil);
                cat_list.push(Value::list(vec![Value::Symbol(wk.list), inner]));
                return Ok(());
            }
            if first.as_spur() == Some(wk.splicing) {
                cat_list.push(sub.get(1).cloned().unwrap_or_else(Value::nil));
                return Ok(());
            }
            let mut inner_cat = vec![Value::Symbol(wk.cat)];
            for i in &sub {
                qquote1(ctx, i, &mut inner_cat)?;
            }
            let built = ctx.eval(&Value::list(inner_cat))?;
            cat_list.push(Value::list(vec![
                Value::Symbol(wk.list),
                Value::list(vec![Value::Symbol(wk.quote), built]),
            ]));
            return Ok(());
        }
    }
    cat_list.push(Value::list(vec![
        Value::Symbol(wk.list),
        Value::list(vec![Value::Symbol(wk.quote), o.clone()]),
    ]));
    Ok(())
}

fn cond(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(cond (tst body) ...)";
    for clause in &form[1..] {
        let Some(lst) = clause.as_list() else {
            return Err(ctx.error(ErrorKind::NotAList, HINT, form_value(form)));
        };
        let items: Vec<Value> = lst.borrow().clone();
        if items.is_empty() {
            return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, form_value(form)));
        }
        let tst = ctx.eval(&items[0])?;
        if tst.is_error() {
            return Ok(tst);
        }
        if tst.is_truthy() {
            let mut value = Value::nil();
            for body in &items[1..] {
                value = ctx.eval(body)?;
                if value.is_error() {
                    break;
                }
            }
            return Ok(value);
        }
    }
    Ok(Value::nil())
}

fn lwhile(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    if form.len() < 2 {
        return Err(ctx.error(
            ErrorKind::WrongNumOfArgs,
            "(while tst body)",
            form_value(form),
        ));
    }
    loop {
        let mut value = ctx.eval(&form[1])?;
        if value.is_error() || value.is_nil() {
            return Ok(value);
        }
        for body in &form[2..] {
            value = ctx.eval(body)?;
            if value.is_error() {
                return Ok(value);
            }
        }
    }
}

fn catch(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    if form.len() != 3 {
        return Err(ctx.error(
            ErrorKind::WrongNumOfArgs,
            "(catch form eform)",
            form_value(form),
        ));
    }
    let value = match ctx.eval(&form[1]) {
        Ok(v) if !v.is_error() => return Ok(v),
        Ok(v) => v,
        Err(e) => Value::Error(e),
    };
    let handler = ctx.eval(&form[2])?;
    if handler.is_error() || !handler.is_nil() {
        return Ok(handler);
    }
    Ok(value)
}

/// Sequencing in its own frame; the value of the last form.
fn progn(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    ctx.env_push();
    let result: Result<Value, ImagoError> = (|| {
        let mut value = Value::nil();
        for body in &form[1..] {
            value = ctx.eval(body)?;
            if value.is_error() {
                break;
            }
        }
        Ok(value)
    })();
    ctx.env_pop();
    result
}

fn env_fn(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(env [num])";
    match form.len() {
        1 => Ok(Value::Env(ctx.env())),
        2 => match form[1].as_int() {
            Some(n) => {
                if n > 0 {
                    ctx.env().reserve(n as usize);
                }
                Ok(Value::Env(ctx.env()))
            }
            None => Err(ctx.error(ErrorKind::NotANumber, HINT, form_value(form))),
        },
        _ => Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, form_value(form))),
    }
}

fn defq(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(defq var val [var val] ...)";
    let len = form.len();
    if len < 3 || len % 2 == 0 {
        return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, form_value(form)));
    }
    let env = ctx.env();
    let mut value = Value::nil();
    let mut i = 1;
    while i < len {
        let Some(s) = form[i].as_spur() else {
            return Err(ctx.error(ErrorKind::NotASymbol, HINT, form_value(form)));
        };
        value = ctx.eval(&form[i + 1])?;
        if value.is_error() {
            break;
        }
        env.insert(s, value.clone());
        i += 2;
    }
    Ok(value)
}

fn setq(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(setq var val [var val] ...)";
    let len = form.len();
    if len < 3 || len % 2 == 0 {
        return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, form_value(form)));
    }
    let env = ctx.env();
    let mut value = Value::nil();
    let mut i = 1;
    while i < len {
        let Some(s) = form[i].as_spur() else {
            return Err(ctx.error(ErrorKind::NotASymbol, HINT, form_value(form)));
        };
        value = ctx.eval(&form[i + 1])?;
        if value.is_error() {
            break;
        }
        if !env.set_existing(s, value.clone()) {
            return Err(ctx.error(ErrorKind::SymbolNotBound, HINT, form[i].clone()));
        }
        i += 2;
    }
    Ok(value)
}

/// `(defmacro name (param ...) body ...)` stores `(macro (param ...)
/// body ...)` under `name` in the current frame and returns the name.
fn defmacro(ctx: &EvalContext, form: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(defmacro name (param ...) body)";
    let name = form.get(1).and_then(|v| v.as_spur());
    let params_ok = form.get(2).is_some_and(Value::is_list);
    let Some(name) = name else {
        return Err(ctx.error(ErrorKind::WrongTypes, HINT, form_value(form)));
    };
    if !params_ok || form.len() <= 3 {
        return Err(ctx.error(ErrorKind::WrongTypes, HINT, form_value(form)));
    }
    let wk = well_known();
    let mut body: Vec<Value> = form[1..].to_vec();
    body[0] = Value::Symbol(wk.macro_);
    ctx.env().insert(name, Value::list(body));
    Ok(Value::Symbol(name))
}

// ── Evaluated-argument control functions ──────────────────────────

fn eval_fn(ctx: &EvalContext, args: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(eval form [env])";
    match args.len() {
        1 => ctx.eval(&args[0]),
        2 => {
            let Value::Env(env) = &args[1] else {
                return Err(ctx.error(ErrorKind::NotAnEnvironment, HINT, args[1].clone()));
            };
            let old = ctx.swap_env(env.clone());
            let result = ctx.eval(&args[0]);
            ctx.swap_env(old);
            result
        }
        _ => Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, form_value(args))),
    }
}

fn apply_fn(ctx: &EvalContext, args: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(apply lambda list)";
    if args.len() == 2 {
        if let Some(lst) = args[1].as_list() {
            let call_args: Vec<Value> = lst.borrow().clone();
            return ctx.apply(&args[0], call_args);
        }
    }
    Err(ctx.error(ErrorKind::WrongTypes, HINT, form_value(args)))
}

fn bind_fn(ctx: &EvalContext, args: &[Value]) -> Result<Value, ImagoError> {
    if args.len() == 2 {
        env_bind(ctx, &args[0], &args[1])
    } else {
        Err(ctx.error(
            ErrorKind::WrongNumOfArgs,
            "(bind (param ...) seq)",
            form_value(args),
        ))
    }
}

fn def(ctx: &EvalContext, args: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(def env var val [var val] ...)";
    let len = args.len();
    if len < 3 || len % 2 == 0 {
        return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, form_value(args)));
    }
    let Value::Env(env) = &args[0] else {
        return Err(ctx.error(ErrorKind::NotAnEnvironment, HINT, args[0].clone()));
    };
    let mut value = Value::nil();
    let mut i = 1;
    while i < len {
        let Some(s) = args[i].as_spur() else {
            return Err(ctx.error(ErrorKind::NotASymbol, HINT, form_value(args)));
        };
        value = args[i + 1].clone();
        env.insert(s, value.clone());
        i += 2;
    }
    Ok(value)
}

fn set(ctx: &EvalContext, args: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(set env var val [var val] ...)";
    let len = args.len();
    if len < 3 || len % 2 == 0 {
        return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, form_value(args)));
    }
    let Value::Env(env) = &args[0] else {
        return Err(ctx.error(ErrorKind::NotAnEnvironment, HINT, args[0].clone()));
    };
    let mut value = Value::nil();
    let mut i = 1;
    while i < len {
        let Some(s) = args[i].as_spur() else {
            return Err(ctx.error(ErrorKind::NotASymbol, HINT, form_value(args)));
        };
        value = args[i + 1].clone();
        if !env.set_existing(s, value.clone()) {
            return Err(ctx.error(ErrorKind::SymbolNotBound, HINT, args[i].clone()));
        }
        i += 2;
    }
    Ok(value)
}

fn defined(ctx: &EvalContext, args: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(def? var)";
    if args.len() != 1 {
        return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, form_value(args)));
    }
    let Some(s) = args[0].as_spur() else {
        return Err(ctx.error(ErrorKind::NotASymbol, HINT, args[0].clone()));
    };
    Ok(ctx.lookup(s).unwrap_or_else(Value::nil))
}

fn throw(ctx: &EvalContext, args: &[Value]) -> Result<Value, ImagoError> {
    const HINT: &str = "(throw str form)";
    if args.len() == 2 {
        if let Some(msg) = args[0].with_str(|b| String::from_utf8_lossy(b).into_owned()) {
            return Err(ctx.error(ErrorKind::Error, &msg, args[1].clone()));
        }
    }
    Err(ctx.error(ErrorKind::WrongTypes, HINT, form_value(args)))
}

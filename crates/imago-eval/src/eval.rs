use imago_core::{well_known, ErrorKind, EvalContext, Value};

use crate::{bind, expand, special};

pub type EvalResult = Result<Value, imago_core::ImagoError>;

/// The interpreter: an evaluation context with the control specials and
/// the standard library registered into its root environment.
pub struct Interpreter {
    pub ctx: EvalContext,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let ctx = EvalContext::new();
        ctx.set_eval_fn(eval_value);
        ctx.set_apply_fn(apply_value);
        let wk = well_known();
        let env = ctx.env();
        env.insert(wk.nil, Value::nil());
        env.insert(wk.t, Value::t());
        env.insert(wk.stream_name, Value::string("repl"));
        env.insert(wk.stream_line, Value::int(0));
        special::register(&env);
        imago_stdlib::register_stdlib(&env);
        Interpreter { ctx }
    }

    pub fn eval(&self, form: &Value) -> EvalResult {
        self.ctx.eval(form)
    }

    /// Read, expand and evaluate every form in the string; the value of
    /// the last form. Error values short-circuit the remaining forms.
    pub fn eval_str(&self, src: &str) -> EvalResult {
        let forms = imago_reader::read_all(&self.ctx, src)?;
        let mut result = Value::nil();
        for mut form in forms {
            while expand::expand(&self.ctx, &mut form, 0)? != 0 {}
            result = self.ctx.eval(&form)?;
            if result.is_error() {
                break;
            }
        }
        Ok(result)
    }
}

/// Evaluate one form. Symbols look up (missing is `symbol_not_bound`),
/// non-empty lists dispatch on their evaluated head, everything else is
/// self-evaluating. A raw built-in head receives the whole original
/// form; otherwise the tail is reduced left to right, short-circuiting
/// on the first error value.
pub fn eval_value(ctx: &EvalContext, form: &Value) -> EvalResult {
    match form {
        Value::Symbol(s) => ctx
            .lookup(*s)
            .ok_or_else(|| ctx.error(ErrorKind::SymbolNotBound, "(eval form)", form.clone())),
        Value::List(items) => {
            let (head, len) = {
                let b = items.borrow();
                match b.first() {
                    None => return Ok(form.clone()),
                    Some(h) => (h.clone(), b.len()),
                }
            };
            let func = eval_value(ctx, &head)?;
            if func.is_error() {
                return Ok(func);
            }
            if let Value::Func(f) = &func {
                if f.raw {
                    let whole: Vec<Value> = items.borrow().clone();
                    return (f.func)(ctx, &whole);
                }
            }
            let mut args = Vec::with_capacity(len - 1);
            let mut i = 1;
            while i < len {
                let arg = { items.borrow().get(i).cloned() };
                let Some(arg) = arg else { break };
                let v = eval_value(ctx, &arg)?;
                if v.is_error() {
                    return Ok(v);
                }
                args.push(v);
                i += 1;
            }
            apply_value(ctx, &func, args)
        }
        _ => Ok(form.clone()),
    }
}

/// Apply a callee to already-evaluated arguments. Built-ins are called
/// directly; a list headed `lambda` or `macro` with a parameter list is
/// a closure: push a frame on the current chain, bind, evaluate the
/// body forms in order, pop. Anything else is `not_a_lambda`.
pub fn apply_value(ctx: &EvalContext, func: &Value, args: Vec<Value>) -> EvalResult {
    const HINT: &str = "(lambda ([arg ...]) body)";
    match func {
        Value::Func(f) => (f.func)(ctx, &args),
        Value::List(lst) => {
            let wk = well_known();
            let parts = {
                let b = lst.borrow();
                let marker = b.first().and_then(|v| v.as_spur());
                let is_closure = matches!(marker, Some(s) if s == wk.lambda || s == wk.macro_);
                if is_closure && b.len() > 1 && b[1].is_list() {
                    Some((b[1].clone(), b[2..].to_vec()))
                } else {
                    None
                }
            };
            let Some((params, body)) = parts else {
                return Err(ctx.error(ErrorKind::NotALambda, HINT, func.clone()));
            };
            ctx.env_push();
            let result: EvalResult = (|| {
                let bound = bind::env_bind(ctx, &params, &Value::list(args))?;
                if bound.is_error() {
                    return Ok(bound);
                }
                let mut value = Value::nil();
                for form in &body {
                    value = eval_value(ctx, form)?;
                    if value.is_error() {
                        break;
                    }
                }
                Ok(value)
            })();
            ctx.env_pop();
            result
        }
        _ => Err(ctx.error(ErrorKind::NotALambda, HINT, func.clone())),
    }
}

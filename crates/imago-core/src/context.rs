use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{ErrorKind, ImagoError};
use crate::value::{intern, well_known, Env, Value};

pub type EvalFn = fn(&EvalContext, &Value) -> Result<Value, ImagoError>;
pub type ApplyFn = fn(&EvalContext, &Value, Vec<Value>) -> Result<Value, ImagoError>;

/// Interpreter state shared by every built-in: the current environment
/// (a strictly push/pop stack of frames, plus a transient swap for
/// `eval` with an explicit environment argument), the gensym counter,
/// and callbacks into the evaluator crate. The callbacks are installed
/// once at interpreter construction; they let built-ins that live below
/// the evaluator (`partition`, `some!`, `read`, ...) call back up.
pub struct EvalContext {
    env: RefCell<Env>,
    next_sym: Cell<u64>,
    eval_fn: Cell<Option<EvalFn>>,
    apply_fn: Cell<Option<ApplyFn>>,
}

impl EvalContext {
    pub fn new() -> Self {
        EvalContext {
            env: RefCell::new(Env::new()),
            next_sym: Cell::new(0),
            eval_fn: Cell::new(None),
            apply_fn: Cell::new(None),
        }
    }

    // -- Environment stack --

    /// The current environment (cheap clone of the frame handle).
    pub fn env(&self) -> Env {
        self.env.borrow().clone()
    }

    /// Swap in a different environment; used by `eval` with an explicit
    /// env argument. Returns the previous one so the caller can restore.
    pub fn swap_env(&self, env: Env) -> Env {
        self.env.replace(env)
    }

    /// Enter a fresh child frame of the current environment.
    pub fn env_push(&self) {
        let current = self.env();
        *self.env.borrow_mut() = Env::with_parent(Rc::new(current));
    }

    /// Leave the current frame, restoring its parent.
    pub fn env_pop(&self) {
        let parent = self.env.borrow().parent.clone();
        if let Some(parent) = parent {
            *self.env.borrow_mut() = (*parent).clone();
        }
    }

    /// Find a binding anywhere in the current chain.
    pub fn lookup(&self, name: lasso::Spur) -> Option<Value> {
        self.env.borrow().get(name)
    }

    /// Bind into the current frame.
    pub fn insert(&self, name: lasso::Spur, val: Value) {
        self.env.borrow().insert(name, val);
    }

    // -- Evaluator callbacks --

    pub fn set_eval_fn(&self, f: EvalFn) {
        self.eval_fn.set(Some(f));
    }

    pub fn set_apply_fn(&self, f: ApplyFn) {
        self.apply_fn.set(Some(f));
    }

    pub fn eval(&self, form: &Value) -> Result<Value, ImagoError> {
        match self.eval_fn.get() {
            Some(f) => f(self, form),
            None => Err(self.error(ErrorKind::Error, "(eval form)", form.clone())),
        }
    }

    pub fn apply(&self, func: &Value, args: Vec<Value>) -> Result<Value, ImagoError> {
        match self.apply_fn.get() {
            Some(f) => f(self, func, args),
            None => Err(self.error(ErrorKind::Error, "(apply lambda list)", func.clone())),
        }
    }

    // -- Errors and gensym --

    /// Build an error stamped with the current `*stream-name*` and
    /// `*stream-line*` bindings.
    pub fn error(&self, kind: ErrorKind, hint: &str, form: Value) -> ImagoError {
        let wk = well_known();
        let env = self.env.borrow();
        let file = env
            .get(wk.stream_name)
            .and_then(|v| v.with_str(|b| String::from_utf8_lossy(b).into_owned()))
            .unwrap_or_else(|| "repl".to_string());
        let line = env
            .get(wk.stream_line)
            .and_then(|v| v.as_int())
            .unwrap_or(0);
        ImagoError::new(kind, hint, file, line, form)
    }

    /// Like `error`, but with an explicit line number. The reader uses
    /// this: its stream's own counter is fresher than the
    /// `*stream-line*` binding while a form is still being read.
    pub fn error_at(&self, kind: ErrorKind, hint: &str, line: i64, form: Value) -> ImagoError {
        let wk = well_known();
        let file = self
            .env
            .borrow()
            .get(wk.stream_name)
            .and_then(|v| v.with_str(|b| String::from_utf8_lossy(b).into_owned()))
            .unwrap_or_else(|| "repl".to_string());
        ImagoError::new(kind, hint, file, line, form)
    }

    /// A fresh interned symbol `Gn`.
    pub fn gensym(&self) -> Value {
        let n = self.next_sym.get();
        self.next_sym.set(n + 1);
        Value::Symbol(intern(&format!("G{n}")))
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

mod arithmetic;
mod bitwise;
mod comparison;
mod io;
mod iteration;
mod list;
mod sequence;
mod stream;
mod string;
mod system;

use std::rc::Rc;

use imago_core::{intern, Env, EvalContext, ImagoError, NativeFn, Value};

pub fn register_stdlib(env: &Env) {
    arithmetic::register(env);
    bitwise::register(env);
    comparison::register(env);
    sequence::register(env);
    list::register(env);
    string::register(env);
    stream::register(env);
    io::register(env);
    iteration::register(env);
    system::register(env);
}

fn register_fn(
    env: &Env,
    name: &str,
    f: impl Fn(&EvalContext, &[Value]) -> Result<Value, ImagoError> + 'static,
) {
    env.insert(intern(name), Value::Func(Rc::new(NativeFn::new(name, f))));
}

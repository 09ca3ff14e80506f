pub mod context;
pub mod error;
pub mod stream;
pub mod value;

pub use context::{ApplyFn, EvalContext, EvalFn};
pub use error::{ErrorKind, ImagoError};
pub use lasso::Spur;
pub use stream::{ByteSource, InputStream, OutSink, OutputStream};
pub use value::{
    compare_spurs, intern, resolve, type_mask, well_known, with_resolved, Env, NativeFn,
    NativeFnInner, Value, WellKnown,
};

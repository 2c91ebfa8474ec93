//! Language-independent runtime
//!
//! Everything the front-ends share: tagged values and their frozen copies,
//! the error taxonomy, the lexical environment, operator semantics, the
//! per-run [`ExecutionContext`](context::ExecutionContext), the external
//! function bridge and the immutable frame record.

pub mod context;
pub mod describe;
pub mod errors;
pub mod external;
pub mod frame;
pub mod ops;
pub mod scope;
pub mod value;

pub use context::{ExecutionContext, FunctionCallLog, LanguageFeatures, RunOutput};
pub use errors::{ErrorCategory, RuntimeError, RuntimeErrorKind};
pub use external::{Arity, ExternalFunction, LogicError};
pub use frame::{Frame, FrameStatus, FrameTrace, LogLine, TraceError, TIME_SCALE_FACTOR};
pub use value::{FrozenValue, Value};

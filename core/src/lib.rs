//! Request-to-subprocess dispatch for the benchmark gateway.
//!
//! The gateway hands a problem name and its query parameters to [`Dispatcher`],
//! which builds the tool's argument vector and runs it through an [`Executor`].

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod invocation;
pub mod runtime;

pub use config::ToolConfig;
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use invocation::{ArgumentVector, Invocation, Parameters, Problem};
pub use runtime::{Executor, InvocationResult, ProcessRuntime};

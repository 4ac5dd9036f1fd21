//! The command dispatcher: turns a request into one tool invocation.
//!
//! The dispatcher is stateless apart from its immutable configuration. Each
//! call builds its own argument vector, so concurrent or consecutive requests
//! cannot see each other's parameters. There is no cap on concurrent spawns.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ToolConfig;
use crate::error::Result;
use crate::invocation::{Invocation, Parameters, Problem};
use crate::runtime::{Executor, InvocationResult};

#[derive(Clone)]
pub struct Dispatcher {
    tool: String,
    script: String,
    executor: Arc<dyn Executor>,
}

impl Dispatcher {
    pub fn new(tool: impl Into<String>, script: impl Into<String>, executor: Arc<dyn Executor>) -> Self {
        Self {
            tool: tool.into(),
            script: script.into(),
            executor,
        }
    }

    /// Dispatcher backed by a real process runner.
    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(&config.tool, &config.script, Arc::new(config.runtime()))
    }

    /// Run every problem: `[tool, script, "all"]`.
    pub async fn run_all(&self) -> Result<InvocationResult> {
        info!("Running all problems");
        self.dispatch(Invocation::All).await
    }

    /// Run one problem with its parameters forwarded as `key=value` tokens.
    ///
    /// Validation happens before anything is spawned.
    pub async fn run_problem(&self, problem: &str, parameters: Parameters) -> Result<InvocationResult> {
        let problem = Problem::parse(problem)?;
        parameters.validate()?;
        info!("Running problem '{}' with {} parameter(s)", problem, parameters.len());
        self.dispatch(Invocation::Problem { problem, parameters }).await
    }

    async fn dispatch(&self, invocation: Invocation) -> Result<InvocationResult> {
        let argv = invocation.argv(&self.tool, &self.script);
        debug!("argv: {:?}", argv.as_slice());
        self.executor.invoke(&argv).await
    }
}

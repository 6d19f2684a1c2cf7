//! Scripted [`ToolRunner`] for unit tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bottler_core::ports::{ProvisionResult, ToolInvocation, ToolOutput, ToolRunner};

type Responder = Box<dyn Fn(&ToolInvocation) -> ProvisionResult<ToolOutput> + Send + Sync>;

/// Answers invocations from a rule list and records every call.
///
/// The first rule whose needle occurs in the joined command line wins;
/// unmatched commands succeed with empty output.
pub struct ScriptedRunner {
    rules: Vec<(String, Responder)>,
    calls: Mutex<Vec<ToolInvocation>>,
}

pub fn exit(code: i32, stdout: &str, stderr: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        timed_out: false,
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on<F>(mut self, needle: &str, responder: F) -> Self
    where
        F: Fn(&ToolInvocation) -> ProvisionResult<ToolOutput> + Send + Sync + 'static,
    {
        self.rules.push((needle.to_string(), Box::new(responder)));
        self
    }

    pub fn reply(self, needle: &str, output: ToolOutput) -> Self {
        self.on(needle, move |_| Ok(output.clone()))
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Joined command lines of every recorded call.
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(ToolInvocation::display).collect()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }
}

#[async_trait]
impl ToolRunner for ScriptedRunner {
    async fn run(&self, invocation: ToolInvocation) -> ProvisionResult<ToolOutput> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());
        let line = invocation.display();
        for (needle, responder) in &self.rules {
            if line.contains(needle.as_str()) {
                return responder(&invocation);
            }
        }
        Ok(exit(0, "", ""))
    }
}

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cmdpipe::exec::CommandRunner;
use cmdpipe::{CmdpipeError, CmdpipeResult, ExecOutput, ExitOutcome, Invocation};

/// A fake runner that:
/// - records every invocation it is asked to run
/// - replays scripted results in order, then succeeds with empty output.
pub struct FakeRunner {
    script: VecDeque<CmdpipeResult<ExecOutput>>,
    executed: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeRunner {
    pub fn new(executed: Arc<Mutex<Vec<Invocation>>>) -> Self {
        Self {
            script: VecDeque::new(),
            executed,
        }
    }

    pub fn then_ok(mut self, stdout: &str) -> Self {
        self.script.push_back(Ok(success(stdout)));
        self
    }

    pub fn then_exit(mut self, code: i32) -> Self {
        self.script.push_back(Err(CmdpipeError::AbnormalExit {
            label: "fake".to_string(),
            command: "fake".to_string(),
            code,
            stderr: None,
        }));
        self
    }

    pub fn then_err(mut self, err: CmdpipeError) -> Self {
        self.script.push_back(Err(err));
        self
    }
}

pub fn success(stdout: &str) -> ExecOutput {
    ExecOutput {
        status: ExitOutcome::Exited(0),
        stdout: Some(stdout.to_string()),
        stderr: Some(String::new()),
    }
}

impl CommandRunner for FakeRunner {
    fn run_command<'a>(
        &'a mut self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = CmdpipeResult<ExecOutput>> + Send + 'a>> {
        {
            let mut guard = self.executed.lock().unwrap();
            guard.push(invocation.clone());
        }

        let next = self.script.pop_front().unwrap_or_else(|| Ok(success("")));
        Box::pin(async move { next })
    }
}

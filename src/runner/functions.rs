//! The impls and functions
//!
use std::{io, process::{Command, Stdio}, time::Instant};
use log::*;
use crate::runner::{ProcessOutput, ProcessRunner, SystemRunner};

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
    /// Surface the stderr of the command in the log, one line at a time.
    pub fn log_stderr(&self, program: &str) {
        for line in String::from_utf8_lossy(&self.stderr).lines().filter(|l| !l.trim().is_empty()) {
            warn!("{}: {}", program, line);
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput> {
        debug!("running: {} {}", program, args.join(" "));
        let timer = Instant::now();

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        debug!("{} finished with {} in {:?}", program, output.status, timer.elapsed());
        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Fails the test when any command is run; for runs that must stop before conversion.
#[cfg(test)]
pub(crate) struct UnusedRunner;

#[cfg(test)]
impl ProcessRunner for UnusedRunner {
    fn run(&self, program: &str, _args: &[String]) -> io::Result<ProcessOutput> {
        panic!("{} should not have been run", program);
    }
}

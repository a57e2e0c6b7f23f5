//! Console commands.

use crate::core::Job;

/// A parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add`: start one more worker.
    AddWorker,
    /// `remove`: stop the newest worker.
    RemoveWorker,
    /// `exit`: shut the pool down and leave the console.
    Exit,
    /// Any other non-empty input, submitted verbatim.
    Submit(Job),
    /// Blank line.
    Empty,
}

impl Command {
    /// Parse one line. Surrounding whitespace is ignored.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "add" => Self::AddWorker,
            "remove" => Self::RemoveWorker,
            "exit" => Self::Exit,
            job => Self::Submit(job.to_string()),
        }
    }
}

impl From<&str> for Command {
    fn from(line: &str) -> Self {
        Self::parse(line)
    }
}

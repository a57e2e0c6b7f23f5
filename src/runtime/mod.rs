//! Console front-end: typed commands and the interactive loop.

pub mod command;
pub mod console;

pub use command::Command;
pub use console::{dispatch, run_console, Flow, PROMPT};

//! Terminal interaction capabilities
//!
//! Workflows never talk to the terminal directly. They report progress through a [`Reporter`]
//! and ask questions through a [`Prompter`], so they can run against scripted implementations
//! in tests.
//!
//! - [`progress`] - Spinner-backed [`Reporter`]
//! - [`prompt`] - dialoguer-backed [`Prompter`]

pub mod progress;
pub mod prompt;

pub use progress::{Reporter, TerminalReporter};
pub use prompt::{Prompter, TerminalPrompter};

//! Command implementations.

pub mod cacerts;
pub mod detect;
pub mod dispatcher;
pub mod list;
pub mod start;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

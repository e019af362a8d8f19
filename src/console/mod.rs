mod command;
mod executor;

pub use command::{Command, CommandError};
pub use executor::{ConsoleAction, ConsoleReply, execute, execute_line};

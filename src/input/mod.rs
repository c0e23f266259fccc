//! Console input
//!
//! Lines typed by the user are parsed by the command map and applied to
//! the form shell by the console session.

pub mod console;
pub mod keymap;

pub use console::{Console, Flow};
pub use keymap::{create_default_commands, parse_line, Command, CommandAction};

//! Naming configuration for envflag.
//!
//! Decides which environment variable stands in for each option:
//! - `Naming::Plain` - the option name itself
//! - `Naming::Prefix` - a fixed prefix plus the option name
//! - `Naming::Program` - the program name plus the option name

mod naming;
mod settings;

pub use naming::{sanitize, Naming};
pub use settings::{program_name, Config};

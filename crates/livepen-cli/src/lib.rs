#![forbid(unsafe_code)]

pub mod cli;
pub mod compose;
pub mod error;
pub mod fit;
pub mod scripts;
pub mod util;

pub use cli::{Cli, Commands, run};
pub use error::{CliError, Result};

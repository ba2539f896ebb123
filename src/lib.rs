pub mod acquire;
pub mod artifact;
pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod io;
pub mod pipeline;
pub mod process;
pub mod registry;
pub mod signing;
pub mod source;

pub use error::{ForgeError, Result};

pub mod aws;
pub mod cli;
pub mod codec;
pub mod commands;
pub mod constants;
pub mod error;
pub mod profile;
pub mod prompt;
pub mod switch;

pub use error::{Error, Result};

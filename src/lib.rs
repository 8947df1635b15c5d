pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod compose;
pub mod config;
pub mod domain;
pub mod error;
pub mod host;
pub mod publish;
pub mod ui;

pub use error::{ReleaseError, Result};

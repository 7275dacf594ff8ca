//! fconf library
//!
//! Scanner, parser and document model for Asterisk style configuration
//! files, plus the web server and CLI built on them.

pub mod ast;
pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod server;
pub mod utils;

pub use ast::Document;
pub use cli::Cli;
pub use config::{BundleConfig, Config};
pub use error::{Error, Result};
pub use parser::{parse_reader, parse_str, Parser};

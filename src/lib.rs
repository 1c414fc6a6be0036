pub mod agent;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod schema;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{Result, WikiSqlError};

pub mod cache;
pub mod client;
pub mod example;
pub mod splits;
pub mod wikisql;

pub use cache::*;
pub use client::*;
pub use example::*;
pub use splits::*;
pub use wikisql::*;

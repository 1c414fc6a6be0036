pub mod example;
pub mod loader;
pub mod types;

pub use example::*;
pub use loader::*;
pub use types::*;

pub mod generator;
pub mod openai;
pub mod prompt;

pub use generator::*;
pub use openai::*;
pub use prompt::*;

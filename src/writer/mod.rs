pub mod sql_gen;
pub mod sqlite;
pub mod test_dbs;

pub use sql_gen::*;
pub use sqlite::*;
pub use test_dbs::*;

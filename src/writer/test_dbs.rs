use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::sqlite::{ConversionResult, SqliteWriter};
use crate::dataset::example::Example;
use crate::error::Result;

/// Manages disposable databases under `<data_root>/test_dbs/`.
pub struct TestDbManager {
    db_dir: PathBuf,
}

impl TestDbManager {
    pub fn new(data_root: &Path) -> Result<Self> {
        let db_dir = data_root.join("test_dbs");
        fs::create_dir_all(&db_dir)?;
        Ok(Self { db_dir })
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    pub fn db_path(&self, name: &str) -> PathBuf {
        self.db_dir.join(format!("{}.sqlite", name))
    }

    /// Create (or refresh) a named database from the given examples.
    pub fn create_test_db(
        &self,
        name: &str,
        examples: &[Example],
    ) -> Result<(PathBuf, Vec<ConversionResult>)> {
        let db_path = self.db_path(name);
        let mut writer = SqliteWriter::new(&db_path)?;

        let mut results = Vec::with_capacity(examples.len());
        for example in examples {
            results.push(writer.convert_example(example)?);
        }

        info!("created test database {:?} ({} tables)", db_path, results.len());
        Ok((db_path, results))
    }

    /// Delete every `.sqlite` file in the test database directory.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.db_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("sqlite") {
                fs::remove_file(&path)?;
                info!("removed test database {:?}", path);
                removed += 1;
            }
        }
        Ok(removed)
    }
}

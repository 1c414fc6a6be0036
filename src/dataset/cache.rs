use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::dataset::example::Example;
use crate::dataset::splits::Split;
use crate::error::Result;

/// On-disk cache of downloaded splits, one JSONL file per split under
/// `<data_root>/wikisql/`.
pub struct SplitCache {
    data_dir: PathBuf,
}

impl SplitCache {
    pub fn new(data_root: &Path) -> Result<Self> {
        let data_dir = data_root.join("wikisql");
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn split_path(&self, split: Split) -> PathBuf {
        self.data_dir.join(format!("{}.jsonl", split.name()))
    }

    /// In-progress download target, renamed into place on success so a
    /// crashed download never looks cached.
    pub fn partial_path(&self, split: Split) -> PathBuf {
        self.data_dir.join(format!("{}.jsonl.part", split.name()))
    }

    pub fn is_cached(&self, split: Split) -> bool {
        self.split_path(split).exists()
    }

    pub fn file_size(&self, split: Split) -> Option<u64> {
        fs::metadata(self.split_path(split)).ok().map(|m| m.len())
    }

    /// Count cached examples by counting lines.
    pub fn example_count(&self, split: Split) -> Result<u64> {
        let file = File::open(self.split_path(split))?;
        let count = BufReader::new(file)
            .lines()
            .filter_map(|l| l.ok())
            .filter(|l| !l.trim().is_empty())
            .count() as u64;
        Ok(count)
    }

    /// Read up to `limit` examples from the cached split file, in file
    /// order. Each line is parsed and validated before it is returned.
    pub fn read_examples(&self, split: Split, limit: Option<usize>) -> Result<Vec<Example>> {
        let path = self.split_path(split);
        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut examples = Vec::new();
        for line in reader.lines() {
            if let Some(limit) = limit {
                if examples.len() >= limit {
                    break;
                }
            }
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let example: Example = serde_json::from_str(&line)?;
            example.validate()?;
            examples.push(example);
        }

        Ok(examples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_split(cache: &SplitCache, split: Split, lines: &[&str]) {
        let mut file = File::create(cache.split_path(split)).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    #[test]
    fn test_split_paths_use_public_names() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SplitCache::new(dir.path()).unwrap();
        assert!(cache.split_path(Split::Dev).ends_with("wikisql/dev.jsonl"));
        assert!(cache.split_path(Split::Train).ends_with("wikisql/train.jsonl"));
    }

    #[test]
    fn test_read_examples_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SplitCache::new(dir.path()).unwrap();
        write_split(
            &cache,
            Split::Dev,
            &[
                r#"{"question": "q0", "table": {"header": ["a"], "types": ["text"], "rows": []}}"#,
                r#"{"question": "q1", "table": {"header": ["a"], "types": ["text"], "rows": []}}"#,
                r#"{"question": "q2", "table": {"header": ["a"], "types": ["text"], "rows": []}}"#,
            ],
        );

        let two = cache.read_examples(Split::Dev, Some(2)).unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[1].question, "q1");

        let all = cache.read_examples(Split::Dev, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(cache.example_count(Split::Dev).unwrap(), 3);
    }

    #[test]
    fn test_read_examples_rejects_invalid_line() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SplitCache::new(dir.path()).unwrap();
        write_split(
            &cache,
            Split::Test,
            &[r#"{"question": "q", "table": {"header": ["a", "b"], "types": ["text"], "rows": []}}"#],
        );
        assert!(cache.read_examples(Split::Test, None).is_err());
    }
}

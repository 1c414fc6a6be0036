use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config;
use crate::dataset::cache::SplitCache;
use crate::dataset::client::{DatasetClient, MAX_PAGE_LENGTH};
use crate::dataset::example::Example;
use crate::dataset::splits::{Split, ALL_SPLITS};
use crate::error::{Result, WikiSqlError};

/// Local cache status of one split, for the `info` command.
#[derive(Debug)]
pub struct SplitStatus {
    pub split: Split,
    pub cached: bool,
    pub examples: Option<u64>,
    pub file_size: Option<u64>,
    pub path: PathBuf,
}

/// WikiSQL access layer: downloads splits from the hosted rows API
/// into JSONL files and serves examples out of an in-memory map keyed
/// by split and limit.
pub struct WikiSqlDataset {
    client: DatasetClient,
    cache: SplitCache,
    loaded: HashMap<String, Arc<Vec<Example>>>,
}

impl WikiSqlDataset {
    pub fn new(data_root: &Path) -> Result<Self> {
        let client = DatasetClient::new(config::hf_auth_token())?;
        let cache = SplitCache::new(data_root)?;
        Ok(Self {
            client,
            cache,
            loaded: HashMap::new(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        self.cache.data_dir()
    }

    /// Download a split into the JSONL cache, paging through the
    /// provider. Skips the download when the split is already cached,
    /// unless `force` is set.
    pub fn download(&self, split: Split, force: bool) -> Result<PathBuf> {
        let dest = self.cache.split_path(split);
        if dest.exists() && !force {
            info!("split '{}' already cached at {:?}", split, dest);
            return Ok(dest);
        }

        let total = self.client.fetch_split_size(split)?;
        debug!("provider reports {} rows for split '{}'", total, split);

        let part = self.cache.partial_path(split);
        let mut file = File::create(&part)?;

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:8} [{bar:40.cyan/blue}] {pos}/{len} examples")
                .unwrap()
                .progress_chars("=>-"),
        );
        pb.set_message(split.name().to_string());

        let mut written: u64 = 0;
        loop {
            let page = self.client.fetch_rows(split, written, MAX_PAGE_LENGTH)?;
            if page.rows.is_empty() {
                break;
            }

            for item in page.rows {
                let example: Example = serde_json::from_value(item.row).map_err(|e| {
                    WikiSqlError::Retrieval(format!(
                        "row {} of split '{}' does not parse as an example: {}",
                        item.row_idx, split, e
                    ))
                })?;
                example.validate()?;
                writeln!(file, "{}", serde_json::to_string(&example)?)?;
                written += 1;
            }

            pb.set_position(written);
            if written >= page.num_rows_total {
                break;
            }
        }

        file.flush()?;
        drop(file);
        fs::rename(&part, &dest)?;
        pb.finish_with_message(format!("{}: {} examples", split, written));

        Ok(dest)
    }

    /// Load up to `limit` examples of a split. Results are held in a
    /// flat map keyed by split and limit, so repeated calls with the
    /// same arguments return the same allocation.
    pub fn load_split(&mut self, split: Split, limit: Option<usize>) -> Result<Arc<Vec<Example>>> {
        let key = cache_key(split, limit);
        if let Some(cached) = self.loaded.get(&key) {
            return Ok(Arc::clone(cached));
        }

        if !self.cache.is_cached(split) {
            self.download(split, false)?;
        }

        let examples = Arc::new(self.cache.read_examples(split, limit)?);
        debug!("loaded {} examples for split '{}'", examples.len(), split);
        self.loaded.insert(key, Arc::clone(&examples));
        Ok(examples)
    }

    /// Fetch one example by position in the full split.
    pub fn get_example(&mut self, split: Split, index: usize) -> Result<Example> {
        let examples = self.load_split(split, None)?;
        examples
            .get(index)
            .cloned()
            .ok_or_else(|| WikiSqlError::OutOfRange {
                split: split.name().to_string(),
                index,
                len: examples.len(),
            })
    }

    /// Examples `[index, index + limit)` of the full split, clamped to
    /// the split end. The start index must be in range; the width may
    /// run past it (including `usize::MAX`) without overflowing.
    pub fn example_window(
        &mut self,
        split: Split,
        index: usize,
        limit: usize,
    ) -> Result<Vec<Example>> {
        let examples = self.load_split(split, None)?;
        if index >= examples.len() {
            return Err(WikiSqlError::OutOfRange {
                split: split.name().to_string(),
                index,
                len: examples.len(),
            });
        }
        let end = index.saturating_add(limit).min(examples.len());
        Ok(examples[index..end].to_vec())
    }

    /// Case-insensitive substring search over questions, returning at
    /// most `limit` matches in split order.
    pub fn search_examples(
        &mut self,
        keyword: &str,
        split: Split,
        limit: usize,
    ) -> Result<Vec<Example>> {
        let needle = keyword.to_lowercase();
        let examples = self.load_split(split, None)?;
        Ok(examples
            .iter()
            .filter(|ex| ex.question.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    pub fn splits_info(&self) -> Vec<SplitStatus> {
        ALL_SPLITS
            .iter()
            .map(|&split| {
                let cached = self.cache.is_cached(split);
                let examples = if cached {
                    self.cache.example_count(split).ok()
                } else {
                    None
                };
                SplitStatus {
                    split,
                    cached,
                    examples,
                    file_size: self.cache.file_size(split),
                    path: self.cache.split_path(split),
                }
            })
            .collect()
    }
}

fn cache_key(split: Split, limit: Option<usize>) -> String {
    match limit {
        Some(n) => format!("{}_{}", split, n),
        None => format!("{}_all", split),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_distinguishes_limits() {
        assert_eq!(cache_key(Split::Dev, Some(2)), "dev_2");
        assert_eq!(cache_key(Split::Dev, Some(3)), "dev_3");
        assert_eq!(cache_key(Split::Dev, None), "dev_all");
        assert_ne!(cache_key(Split::Train, Some(2)), cache_key(Split::Dev, Some(2)));
    }
}

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WikiSqlError};

/// The three WikiSQL splits. The public name `dev` corresponds to the
/// provider's `validation` split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Dev,
    Test,
}

pub const ALL_SPLITS: &[Split] = &[Split::Train, Split::Dev, Split::Test];

impl Split {
    /// Name used in user-facing output and cache file names.
    pub fn name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Dev => "dev",
            Split::Test => "test",
        }
    }

    /// Name the dataset provider knows this split by.
    pub fn provider_name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Dev => "validation",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Split {
    type Err = WikiSqlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "dev" | "validation" => Ok(Split::Dev),
            "test" => Ok(Split::Test),
            other => Err(WikiSqlError::Validation(format!(
                "unknown split '{}' (valid splits: train, dev, test)",
                other
            ))),
        }
    }
}

/// Parse a list of split arguments as given on the command line. The
/// keyword `all` expands to every split; duplicates are dropped while
/// keeping first-occurrence order.
pub fn parse_split_args(args: &[String]) -> Result<Vec<Split>> {
    let mut splits = Vec::new();
    for arg in args {
        if arg.eq_ignore_ascii_case("all") {
            for split in ALL_SPLITS {
                if !splits.contains(split) {
                    splits.push(*split);
                }
            }
        } else {
            let split: Split = arg.parse()?;
            if !splits.contains(&split) {
                splits.push(split);
            }
        }
    }
    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_splits() {
        assert_eq!("train".parse::<Split>().unwrap(), Split::Train);
        assert_eq!("dev".parse::<Split>().unwrap(), Split::Dev);
        assert_eq!("TEST".parse::<Split>().unwrap(), Split::Test);
    }

    #[test]
    fn test_validation_aliases_to_dev() {
        assert_eq!("validation".parse::<Split>().unwrap(), Split::Dev);
    }

    #[test]
    fn test_parse_unknown_split() {
        let err = "weird".parse::<Split>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("weird"));
        assert!(msg.contains("train, dev, test"));
    }

    #[test]
    fn test_dev_maps_to_validation() {
        assert_eq!(Split::Dev.provider_name(), "validation");
        assert_eq!(Split::Dev.name(), "dev");
        assert_eq!(Split::Train.provider_name(), "train");
    }

    #[test]
    fn test_parse_split_args_all_expands() {
        let args = vec!["all".to_string()];
        let splits = parse_split_args(&args).unwrap();
        assert_eq!(splits, vec![Split::Train, Split::Dev, Split::Test]);
    }

    #[test]
    fn test_parse_split_args_dedupes_in_order() {
        let args = vec![
            "test".to_string(),
            "dev".to_string(),
            "test".to_string(),
            "all".to_string(),
        ];
        let splits = parse_split_args(&args).unwrap();
        assert_eq!(splits, vec![Split::Test, Split::Dev, Split::Train]);
    }

    #[test]
    fn test_parse_split_args_rejects_unknown() {
        let args = vec!["train".to_string(), "weird".to_string()];
        assert!(parse_split_args(&args).is_err());
    }
}

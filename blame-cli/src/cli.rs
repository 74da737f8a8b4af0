//! Argument parsing, following `Osse-blamediff`'s `clap::Parser`-based argument struct.

use std::path::PathBuf;

use clap::Parser;

use crate::error::CliError;

/// Show what revision and author last modified each line of a file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The repository to blame in; defaults to discovering one from the current directory.
    #[arg(short = 'C', long, default_value = ".")]
    pub repository: PathBuf,

    /// The commit to blame at; defaults to `HEAD`.
    #[arg(long, default_value = "HEAD")]
    pub revision: String,

    /// Restrict the blame to a 1-based inclusive line range, e.g. `-L 10,20`.
    #[arg(short = 'L', long = "range", value_parser = parse_range)]
    pub range: Option<(u32, u32)>,

    /// Rewrite author identities through the repository's `.mailmap`.
    #[arg(long)]
    pub mailmap: bool,

    /// Follow renames of the blamed file across commits.
    #[arg(long = "follow")]
    pub follow: bool,

    /// Only follow the first parent of merge commits.
    #[arg(long)]
    pub first_parent: bool,

    /// Ignore whitespace-only changes when diffing blob revisions.
    #[arg(short = 'w', long)]
    pub ignore_whitespace: bool,

    /// The path, relative to the repository root, to blame.
    pub path: PathBuf,
}

fn parse_range(value: &str) -> Result<(u32, u32), CliError> {
    let (start, end) = value.split_once(',').ok_or_else(|| CliError::InvalidRange { value: value.to_owned() })?;
    let start: u32 = start.trim().parse().map_err(|_| CliError::InvalidRange { value: value.to_owned() })?;
    let end: u32 = end.trim().parse().map_err(|_| CliError::InvalidRange { value: value.to_owned() })?;
    if start == 0 || start > end {
        return Err(CliError::InvalidRange { value: value.to_owned() });
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_blame_head_with_no_range_restriction() {
        let args = Args::try_parse_from(["blame", "src/main.rs"]).unwrap();
        assert_eq!(args.revision, "HEAD");
        assert_eq!(args.range, None);
        assert!(!args.mailmap);
        assert!(!args.follow);
        assert!(!args.first_parent);
        assert!(!args.ignore_whitespace);
        assert_eq!(args.path, PathBuf::from("src/main.rs"));
    }

    #[test]
    fn range_flag_parses_1_based_bounds() {
        let args = Args::try_parse_from(["blame", "-L", "10,20", "src/main.rs"]).unwrap();
        assert_eq!(args.range, Some((10, 20)));
    }

    #[test]
    fn malformed_range_is_rejected() {
        for bad in ["10", "0,5", "20,10", "abc,5"] {
            assert!(Args::try_parse_from(["blame", "-L", bad, "src/main.rs"]).is_err(), "expected '{bad}' to be rejected");
        }
    }
}

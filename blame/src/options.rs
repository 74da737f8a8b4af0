use std::ops::{Range, RangeInclusive};

use crate::Error;

bitflags::bitflags! {
    /// Behavioural switches recognized by [`Options`].
    ///
    /// The four copy-tracking flags form a lattice: enabling a stronger one implies every
    /// weaker one. [`Flags::normalized`] performs that upgrade.
    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
    pub struct Flags: u16 {
        /// Rewrite author signatures through the repository's mailmap.
        const USE_MAILMAP = 1 << 0;
        /// Follow the blamed file across renames within the same commit lineage.
        const TRACK_COPIES_SAME_FILE = 1 << 1;
        /// Additionally detect the file having been moved from another path in the same commit.
        const TRACK_COPIES_SAME_COMMIT_MOVES = 1 << 2;
        /// Additionally detect lines copied from another file changed in the same commit.
        const TRACK_COPIES_SAME_COMMIT_COPIES = 1 << 3;
        /// Additionally detect lines copied from any file reachable in the parent commit.
        const TRACK_COPIES_ANY_COMMIT_COPIES = 1 << 4;
        /// Only ever follow the first parent of a merge commit.
        const FIRST_PARENT = 1 << 5;
        /// Ignore whitespace-only changes when diffing blobs.
        const IGNORE_WHITESPACE = 1 << 6;
    }
}

impl Flags {
    /// Upgrade weaker copy-tracking flags implied by a stronger one that is set.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.contains(Flags::TRACK_COPIES_ANY_COMMIT_COPIES) {
            self |= Flags::TRACK_COPIES_SAME_COMMIT_COPIES;
        }
        if self.contains(Flags::TRACK_COPIES_SAME_COMMIT_COPIES) {
            self |= Flags::TRACK_COPIES_SAME_COMMIT_MOVES;
        }
        if self.contains(Flags::TRACK_COPIES_SAME_COMMIT_MOVES) {
            self |= Flags::TRACK_COPIES_SAME_FILE;
        }
        self
    }
}

/// The diff algorithm used to compare two blob revisions.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum DiffAlgorithm {
    /// The patience-like histogram algorithm, `git`'s default for blame.
    #[default]
    Histogram,
    /// The classic Myers algorithm.
    Myers,
}

/// One or more 1-based inclusive line ranges to restrict a blame to.
///
/// Mirrors `git`'s own `-L` handling: an empty set of ranges means "the whole file".
#[derive(Debug, Clone, Default)]
pub enum BlameRanges {
    /// Blame every line of the file.
    #[default]
    WholeFile,
    /// Blame only the given 0-based, end-exclusive ranges.
    PartialFile(Vec<Range<u32>>),
}

impl BlameRanges {
    /// Create ranges from a single 1-based inclusive range, as used by `git -L`.
    pub fn from_one_based_inclusive_range(range: RangeInclusive<u32>) -> Self {
        Self::PartialFile(vec![Self::to_zero_based_exclusive(range)])
    }

    /// Create ranges from multiple 1-based inclusive ranges, merging overlaps and adjacencies.
    pub fn from_one_based_inclusive_ranges(ranges: Vec<RangeInclusive<u32>>) -> Self {
        let mut result = Self::PartialFile(Vec::new());
        for range in ranges {
            // Construction-time merges never fail: `PartialFile` is always the active variant here.
            result
                .merge(Self::to_zero_based_exclusive(range))
                .expect("just constructed as PartialFile");
        }
        if matches!(&result, Self::PartialFile(v) if v.is_empty()) {
            return Self::WholeFile;
        }
        result
    }

    /// Add another 1-based inclusive range, merging it with an existing overlapping or adjacent one.
    pub fn add_range(&mut self, range: RangeInclusive<u32>) -> Result<(), Error> {
        if matches!(self, Self::WholeFile) {
            *self = Self::PartialFile(Vec::new());
        }
        self.merge(Self::to_zero_based_exclusive(range))
    }

    fn to_zero_based_exclusive(range: RangeInclusive<u32>) -> Range<u32> {
        range.start().saturating_sub(1)..*range.end()
    }

    fn merge(&mut self, new_range: Range<u32>) -> Result<(), Error> {
        let Self::PartialFile(ranges) = self else {
            return Err(Error::InvalidLineRange {
                min_line: new_range.start,
                max_line: new_range.end,
                num_lines: 0,
            });
        };
        for existing in ranges.iter_mut() {
            let overlaps = new_range.start <= existing.end && existing.start <= new_range.end;
            let adjacent = new_range.start == existing.end || existing.start == new_range.end;
            if overlaps || adjacent {
                existing.start = existing.start.min(new_range.start);
                existing.end = existing.end.max(new_range.end);
                return Ok(());
            }
        }
        ranges.push(new_range);
        Ok(())
    }

    /// Resolve to concrete 0-based exclusive ranges given the file's total line count.
    pub fn to_ranges(&self, num_lines: u32) -> Vec<Range<u32>> {
        match self {
            Self::WholeFile => vec![0..num_lines],
            Self::PartialFile(ranges) => ranges.clone(),
        }
    }
}

/// Options controlling a blame computation.
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// The algorithm used to diff two blob revisions.
    pub diff_algorithm: DiffAlgorithm,
    /// The window of lines to blame; defaults to the whole file.
    pub ranges: BlameRanges,
    /// Don't cross below this commit; entries still suspected there are sealed as boundaries.
    pub oldest_commit: Option<crate::CommitId>,
    /// Behavioural flags, see [`Flags`].
    pub flags: Flags,
}

impl Options {
    /// Normalize option implications, e.g. upgrading weaker copy-tracking flags.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.flags = self.flags.normalized();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_upgrades_the_full_copy_tracking_lattice() {
        let flags = Flags::TRACK_COPIES_ANY_COMMIT_COPIES.normalized();
        assert!(flags.contains(Flags::TRACK_COPIES_ANY_COMMIT_COPIES));
        assert!(flags.contains(Flags::TRACK_COPIES_SAME_COMMIT_COPIES));
        assert!(flags.contains(Flags::TRACK_COPIES_SAME_COMMIT_MOVES));
        assert!(flags.contains(Flags::TRACK_COPIES_SAME_FILE));
    }

    #[test]
    fn normalized_does_not_imply_unrelated_flags() {
        let flags = Flags::TRACK_COPIES_SAME_COMMIT_MOVES.normalized();
        assert!(!flags.contains(Flags::TRACK_COPIES_SAME_COMMIT_COPIES));
        assert!(!flags.contains(Flags::TRACK_COPIES_ANY_COMMIT_COPIES));
        assert!(!flags.contains(Flags::USE_MAILMAP));
        assert!(!flags.contains(Flags::FIRST_PARENT));
    }

    #[test]
    fn normalized_is_a_no_op_on_an_empty_set() {
        assert_eq!(Flags::empty().normalized(), Flags::empty());
    }

    #[test]
    fn overlapping_ranges_merge_into_one() {
        let ranges = BlameRanges::from_one_based_inclusive_ranges(vec![1..=5, 3..=8]);
        assert_eq!(ranges.to_ranges(100), vec![0..8]);
    }

    #[test]
    fn adjacent_ranges_merge_into_one() {
        let ranges = BlameRanges::from_one_based_inclusive_ranges(vec![1..=5, 6..=10]);
        assert_eq!(ranges.to_ranges(100), vec![0..10]);
    }

    #[test]
    fn disjoint_ranges_stay_separate() {
        let ranges = BlameRanges::from_one_based_inclusive_ranges(vec![1..=5, 10..=15]);
        assert_eq!(ranges.to_ranges(100), vec![0..5, 9..15]);
    }

    #[test]
    fn add_range_merges_into_an_existing_whole_file_selection() {
        let mut ranges = BlameRanges::WholeFile;
        ranges.add_range(1..=3).unwrap();
        assert_eq!(ranges.to_ranges(100), vec![0..3]);
    }

    #[test]
    fn add_range_merges_with_an_existing_overlapping_range() {
        let mut ranges = BlameRanges::from_one_based_inclusive_range(5..=10);
        ranges.add_range(8..=12).unwrap();
        assert_eq!(ranges.to_ranges(100), vec![4..12]);
    }

    #[test]
    fn empty_construction_list_yields_whole_file() {
        let ranges = BlameRanges::from_one_based_inclusive_ranges(Vec::new());
        assert!(matches!(ranges, BlameRanges::WholeFile));
    }

    #[test]
    fn whole_file_resolves_to_the_full_line_count() {
        let ranges = BlameRanges::WholeFile;
        assert_eq!(ranges.to_ranges(42), vec![0..42]);
    }
}

//! Sealed attribution ranges and the sorted store that accumulates them.

use bstr::BString;

use crate::{entry::Entry, traits::Signature, CommitId};

/// A maximal contiguous range of final-file lines sharing the same attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Hunk {
    /// 1-based start line in the blamed (final) file.
    pub final_start_line: u32,
    pub lines_in_hunk: u32,
    /// 1-based start line in the originating file revision.
    pub orig_start_line: u32,
    pub orig_path: BString,
    pub final_commit_id: CommitId,
    pub orig_commit_id: CommitId,
    pub boundary: bool,
    pub final_signature: Signature,
    pub orig_signature: Signature,
}

impl Hunk {
    /// A hunk representing not-yet-committed lines, identified by an all-zero commit id.
    pub fn is_buffer_blame(&self) -> bool {
        self.final_commit_id.is_null()
    }

    pub fn final_range(&self) -> std::ops::Range<u32> {
        self.final_start_line..self.final_start_line + self.lines_in_hunk
    }

    pub(crate) fn from_entry(entry: &Entry, signature: Signature) -> Self {
        Hunk {
            final_start_line: entry.lno + 1,
            lines_in_hunk: entry.num_lines,
            orig_start_line: entry.s_lno + 1,
            orig_path: entry.suspect.path.clone(),
            final_commit_id: entry.suspect.commit_id,
            orig_commit_id: entry.suspect.commit_id,
            boundary: entry.is_boundary,
            final_signature: signature.clone(),
            orig_signature: signature,
        }
    }
}

/// A vector of [`Hunk`]s kept sorted on `final_start_line`, contiguous and non-overlapping.
#[derive(Debug, Default, Clone)]
pub struct HunkStore {
    hunks: Vec<Hunk>,
}

impl HunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn as_slice(&self) -> &[Hunk] {
        &self.hunks
    }

    pub fn into_vec(self) -> Vec<Hunk> {
        self.hunks
    }

    pub fn get(&self, index: usize) -> Option<&Hunk> {
        self.hunks.get(index)
    }

    fn search(&self, final_start_line: u32) -> Result<usize, usize> {
        self.hunks.binary_search_by_key(&final_start_line, |h| h.final_start_line)
    }

    /// Insert `hunk`, keeping the vector sorted on `final_start_line`.
    pub fn insert_sorted(&mut self, hunk: Hunk) {
        let index = match self.search(hunk.final_start_line) {
            Ok(i) | Err(i) => i,
        };
        self.hunks.insert(index, hunk);
    }

    /// Index of the unique hunk covering 1-based final line `line`, if any.
    pub fn index_by_line(&self, line: u32) -> Option<usize> {
        // `partition_point` finds the first hunk whose range could still contain `line`;
        // since ranges are contiguous and sorted, this is either the covering hunk or none.
        let index = self.hunks.partition_point(|h| h.final_start_line + h.lines_in_hunk <= line);
        self.hunks
            .get(index)
            .filter(|h| h.final_range().contains(&line))
            .map(|_| index)
    }

    pub fn by_line(&self, line: u32) -> Option<&Hunk> {
        self.index_by_line(line).map(|i| &self.hunks[i])
    }

    /// Split the hunk at `index` at `rel` lines from its start (`0 < rel < lines_in_hunk`),
    /// inserting the successor. Returns the index of the successor hunk.
    pub fn split(&mut self, index: usize, rel: u32) -> usize {
        let hunk = &self.hunks[index];
        debug_assert!(rel > 0 && rel < hunk.lines_in_hunk);

        let mut successor = hunk.clone();
        successor.final_start_line += rel;
        successor.orig_start_line += rel;
        successor.lines_in_hunk -= rel;

        self.hunks[index].lines_in_hunk = rel;
        self.hunks.insert(index + 1, successor);
        index + 1
    }

    /// Shift every hunk whose `final_start_line >= start_line` by `delta` (may be negative).
    /// The caller is responsible for keeping the result free of zero-length or overlapping hunks.
    pub fn shift_by(&mut self, start_line: u32, delta: i64) {
        for hunk in &mut self.hunks {
            if hunk.final_start_line >= start_line {
                hunk.final_start_line = (i64::from(hunk.final_start_line) + delta) as u32;
            }
        }
    }

    /// Remove the hunk at `index`.
    pub fn remove(&mut self, index: usize) -> Hunk {
        self.hunks.remove(index)
    }
}

impl std::ops::Index<usize> for HunkStore {
    type Output = Hunk;
    fn index(&self, index: usize) -> &Hunk {
        &self.hunks[index]
    }
}

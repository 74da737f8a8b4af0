use crate::hunk::HunkStore;

/// The identity of a commit or blob. A type alias over [`gix_hash::ObjectId`], the way every
/// crate in this ecosystem spells object identity.
pub type CommitId = gix_hash::ObjectId;

/// Counters describing the work a blame computation performed, for observability and
/// benchmarking; not load-bearing for correctness.
#[derive(Debug, Default, Copy, Clone)]
pub struct Statistics {
    /// Commits dequeued and processed by the history walker.
    pub commits_traversed: usize,
    /// Origins resolved by walking a commit's tree to the blamed path.
    pub trees_decoded: usize,
    /// Tree lookups performed to see whether a parent's tree still has the blamed path, and if
    /// so, whether it names the same blob.
    pub trees_diffed: usize,
    /// Blob pairs compared by the diff engine.
    pub blobs_diffed: usize,
}

/// The result of a completed blame computation: every line of the final blob, attributed to the
/// commit (and, optionally, the path and author) that introduced it.
#[derive(Debug, Clone)]
pub struct Blame {
    pub(crate) hunks: HunkStore,
    pub(crate) final_blob: Vec<u8>,
    pub(crate) statistics: Statistics,
}

impl Blame {
    /// The number of hunks in this blame result.
    pub fn hunk_count(&self) -> u32 {
        self.hunks.len() as u32
    }

    /// The hunk at `index`, in final-line order, or `None` if out of range.
    pub fn hunk_by_index(&self, index: u32) -> Option<&crate::Hunk> {
        self.hunks.get(index as usize)
    }

    /// The hunk covering 1-based final line `line`, or `None` if `line` is out of range.
    pub fn hunk_by_line(&self, line: u32) -> Option<&crate::Hunk> {
        self.hunks.by_line(line)
    }

    /// All hunks, in final-line order.
    pub fn hunks(&self) -> &[crate::Hunk] {
        self.hunks.as_slice()
    }

    /// The content of the blamed revision (or buffer, for a [`crate::blame_buffer`] result).
    pub fn final_blob(&self) -> &[u8] {
        &self.final_blob
    }

    /// Counters describing the work performed to produce this result.
    pub fn statistics(&self) -> Statistics {
        self.statistics
    }
}

//! Port traits for the external collaborators the engine consumes.
//!
//! The algorithm in [`crate::pass`] and [`crate::walker`] is written entirely against these
//! traits. Production code assembles them from real `gix-*` crates in [`crate::backend::gix`];
//! tests assemble them from small in-memory fixtures (see `tests/fixture.rs`).

use bstr::BStr;

use crate::{CommitId, DiffAlgorithm, Error};

/// A single line-oriented change between an "old" (parent) and a "new" (child) blob.
///
/// Ranges are given in the *new* blob's line space, mirroring how `git`'s own diff hunks are
/// reported (`old_start/old_lines/new_start/new_lines`). [`Change::Unchanged`] and
/// [`Change::AddedOrReplaced`] partition the new blob's lines; [`Change::Deleted`] carries no
/// width in the new blob but is needed to track the running offset between the two line spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A range of lines in the new blob that is identical to a same-sized range in the old blob.
    Unchanged(std::ops::Range<u32>),
    /// A range of lines in the new blob that was added or replaced; `usize` is how many
    /// corresponding lines were removed from the old blob at that point.
    AddedOrReplaced(std::ops::Range<u32>, u32),
    /// Lines were removed from the old blob at this position in the new blob; carries no width
    /// in the new blob. `u32` is how many lines were removed.
    Deleted(u32, u32),
}

/// Gives access to blob content by object id.
pub trait ObjectStore {
    /// Load the raw content of the blob named by `id`.
    fn blob_data(&self, id: &CommitId) -> Result<Vec<u8>, Error>;
}

/// Information about a single commit needed to drive the walk.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit's parents, oldest-edge first, in the order they were recorded (tie-break order).
    pub parents: Vec<CommitId>,
    /// Commit time, used to prioritize the walk (newest first).
    pub time_seconds: i64,
    /// The id of the commit's root tree.
    pub tree_id: CommitId,
}

/// A rewritten author/committer identity, independent of any particular object format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub name: Vec<u8>,
    pub email: Vec<u8>,
    pub time_seconds: i64,
}

/// Gives access to the commit graph: parents, timestamps, trees, and path lookups within a tree.
pub trait CommitGraph {
    /// Resolve `"HEAD"` (or whatever the implementation treats as the default commit).
    fn head(&self) -> Result<CommitId, Error>;
    /// Look up a commit's parents, time, and tree.
    fn commit_info(&self, id: &CommitId) -> Result<CommitInfo, Error>;
    /// Look up the blob id at `path` within `tree_id`, or `None` if absent or not a blob.
    fn tree_entry(&self, tree_id: &CommitId, path: &BStr) -> Result<Option<CommitId>, Error>;
    /// The commit's author, used to stamp [`crate::Hunk::final_signature`]/`orig_signature`.
    fn author(&self, id: &CommitId) -> Result<Signature, Error>;
}

/// Compares two token streams (typically lines) and reports the changes between them.
pub trait DiffEngine {
    /// Diff `old` against `new`, returning changes in `new`'s line space, ordered by position.
    /// When `ignore_whitespace` is set, lines differing only in spaces or tabs compare equal.
    fn diff(&self, old: &[u8], new: &[u8], algorithm: DiffAlgorithm, ignore_whitespace: bool) -> Result<Vec<Change>, Error>;
}

/// A detected rename or copy between two trees.
#[derive(Debug, Clone)]
pub struct Rename {
    pub old_path: Vec<u8>,
    pub new_path: Vec<u8>,
    pub is_copy: bool,
}

/// Detects renames and content copies between two trees. Failures are non-fatal: callers fall
/// back to a same-path lookup when this trait is absent or returns no match.
pub trait RenameDetector {
    /// Find a path in `old_tree` that `path` (as it appears in `new_tree`) was renamed or copied
    /// from, if any.
    fn find_source(
        &self,
        old_tree: &CommitId,
        new_tree: &CommitId,
        path: &BStr,
        allow_copies_same_commit: bool,
        allow_copies_any_commit: bool,
    ) -> Result<Option<Rename>, Error>;
}

/// Rewrites a recorded author identity through a name/email rewrite table.
pub trait Mailmap {
    /// Resolve `signature` to its canonical form; returns a clone of the input when there is no
    /// rewrite rule for it.
    fn resolve(&self, signature: &Signature) -> Signature;
}

/// A [`Mailmap`] that performs no rewriting, used when `Flags::USE_MAILMAP` is unset.
pub struct NullMailmap;

impl Mailmap for NullMailmap {
    fn resolve(&self, signature: &Signature) -> Signature {
        signature.clone()
    }
}

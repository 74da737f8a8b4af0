//! An engine that attributes each line of a file revision to the commit that introduced it.
//!
//! The algorithm is written entirely against the small set of traits in [`traits`]
//! ([`ObjectStore`], [`CommitGraph`], [`DiffEngine`], [`RenameDetector`], [`Mailmap`]); it knows
//! nothing about any particular object database. The [`backend::gix`] module wires these traits
//! to a real `gix::Repository` for production use.
//!
//! ```ignore
//! let result = blame::blame_file(&graph, &objects, &diff, renames.as_ref(), &mailmap, commit, path.into(), Options::default())?;
//! for hunk in result.hunks() {
//!     println!("{}..{} -> {}", hunk.final_start_line, hunk.final_start_line + hunk.lines_in_hunk, hunk.final_commit_id);
//! }
//! ```

mod entry;
mod error;
mod hunk;
mod line_index;
mod options;
mod origin;
mod overlay;
mod pass;
mod traits;
mod types;
mod walker;

#[cfg(feature = "gix-backend")]
pub mod backend;

pub use error::Error;
pub use hunk::{Hunk, HunkStore};
pub use options::{BlameRanges, DiffAlgorithm, Flags, Options};
pub use traits::{Change, CommitGraph, CommitInfo, DiffEngine, Mailmap, NullMailmap, Rename, RenameDetector, ObjectStore, Signature};
pub use types::{Blame, CommitId, Statistics};

use bstr::BString;

use crate::{line_index::LineIndex, walker::Walker};

/// Blame `path` as it exists at `start_commit`, walking history through `graph`/`objects`/`diff`
/// (and, if copy tracking is enabled in `options.flags`, `renames`) to attribute every selected
/// line to the commit and revision that introduced it.
pub fn blame_file<G, O, D, R, M>(
    graph: &G,
    objects: &O,
    diff: &D,
    renames: Option<&R>,
    mailmap: &M,
    start_commit: CommitId,
    path: BString,
    options: Options,
) -> Result<Blame, Error>
where
    G: CommitGraph,
    O: ObjectStore,
    D: DiffEngine,
    R: RenameDetector,
    M: Mailmap,
{
    let options = options.normalized();
    let final_blob = {
        let info = graph.commit_info(&start_commit)?;
        let blob_id = graph
            .tree_entry(&info.tree_id, path.as_ref())?
            .ok_or_else(|| Error::PathNotFound { path: path.to_string() })?;
        objects.blob_data(&blob_id)?
    };

    let walker = Walker::new(graph, objects, diff, renames, mailmap, options);
    let (hunks, statistics) = walker.run(start_commit, path.as_ref())?;

    Ok(Blame {
        hunks,
        final_blob,
        statistics,
    })
}

/// Blame lines of `buffer`, an uncommitted revision of the file `reference` was computed for, by
/// overlaying it onto `reference`'s already-finalized hunks: unchanged lines keep their
/// attribution, and lines with no counterpart in `reference`'s blob are attributed to a null,
/// all-zero commit id ([`Hunk::is_buffer_blame`]).
///
/// This is purely local: it diffs `buffer` against `reference.final_blob()` once and shifts and
/// splits `reference`'s hunks accordingly, without any further history traversal.
pub fn blame_buffer<D>(
    reference: &Blame,
    diff: &D,
    path: &bstr::BStr,
    algorithm: DiffAlgorithm,
    ignore_whitespace: bool,
    buffer: &[u8],
) -> Result<Blame, Error>
where
    D: DiffEngine,
{
    if buffer.is_empty() {
        return Err(Error::EmptyBuffer);
    }
    let changes = diff.diff(&reference.final_blob, buffer, algorithm, ignore_whitespace)?;
    let hunks = overlay::apply(reference.hunks.clone(), &changes, LineIndex::build(buffer).num_lines(), path);

    Ok(Blame {
        hunks,
        final_blob: buffer.to_vec(),
        statistics: reference.statistics,
    })
}

//! The buffer overlay: projects a completed history blame onto an uncommitted revision of the
//! same file, without walking any further history.
//!
//! Committed hunks are diffed once against the buffer; unchanged runs keep their attribution
//! (split and renumbered as needed), and runs with no counterpart in the committed blob are
//! attributed to a null, all-zero commit id.

use bstr::BStr;

use crate::{
    hunk::{Hunk, HunkStore},
    pass::{ChangeMap, Classified},
    traits::{Change, Signature},
    CommitId,
};

fn null_commit_id() -> CommitId {
    gix_hash::Kind::Sha1.null()
}

/// Reattribute `committed` (indexed by the committed revision's line numbers) onto the buffer's
/// line numbers, given `changes` (a diff of the committed blob against the buffer) and the
/// buffer's own total line count.
pub(crate) fn apply(committed: HunkStore, changes: &[Change], buffer_num_lines: u32, path: &BStr) -> HunkStore {
    let map = ChangeMap::new(changes);
    let mut result = HunkStore::new();

    for piece in map.classify(0..buffer_num_lines) {
        match piece {
            Classified::Unchanged { new_range, old_start } => {
                project_unchanged(&committed, &mut result, new_range.start, old_start, new_range.len() as u32);
            }
            Classified::Changed { new_range } => {
                result.insert_sorted(Hunk {
                    final_start_line: new_range.start + 1,
                    lines_in_hunk: new_range.len() as u32,
                    orig_start_line: new_range.start + 1,
                    orig_path: path.to_owned(),
                    final_commit_id: null_commit_id(),
                    orig_commit_id: null_commit_id(),
                    boundary: false,
                    final_signature: Signature::default(),
                    orig_signature: Signature::default(),
                });
            }
        }
    }
    result
}

/// Walk the committed hunks covering 0-based old-space lines `old_start..old_start+len`,
/// re-stamping each covered sub-range at its new 0-based position starting at `new_start`.
fn project_unchanged(committed: &HunkStore, result: &mut HunkStore, new_start: u32, old_start: u32, len: u32) {
    let mut old_pos = old_start;
    let mut new_pos = new_start;
    let mut remaining = len;

    while remaining > 0 {
        let hunk = committed
            .by_line(old_pos + 1)
            .expect("diff reported this range as unchanged, so it must be covered by a committed hunk");
        let hunk_end = hunk.final_start_line - 1 + hunk.lines_in_hunk;
        let take = (hunk_end - old_pos).min(remaining);
        let within_hunk = old_pos - (hunk.final_start_line - 1);

        result.insert_sorted(Hunk {
            final_start_line: new_pos + 1,
            lines_in_hunk: take,
            orig_start_line: hunk.orig_start_line + within_hunk,
            orig_path: hunk.orig_path.clone(),
            final_commit_id: hunk.final_commit_id,
            orig_commit_id: hunk.orig_commit_id,
            boundary: hunk.boundary,
            final_signature: hunk.final_signature.clone(),
            orig_signature: hunk.orig_signature.clone(),
        });

        old_pos += take;
        new_pos += take;
        remaining -= take;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Signature;

    fn hunk(final_start: u32, lines: u32, commit: CommitId) -> Hunk {
        Hunk {
            final_start_line: final_start,
            lines_in_hunk: lines,
            orig_start_line: final_start,
            orig_path: "file.rs".into(),
            final_commit_id: commit,
            orig_commit_id: commit,
            boundary: false,
            final_signature: Signature::default(),
            orig_signature: Signature::default(),
        }
    }

    fn fake_commit() -> CommitId {
        gix_hash::ObjectId::from_hex(b"1111111111111111111111111111111111111111").unwrap()
    }

    #[test]
    fn unchanged_buffer_reproduces_committed_hunks() {
        let commit = fake_commit();
        let mut committed = HunkStore::new();
        committed.insert_sorted(hunk(1, 3, commit));
        committed.insert_sorted(hunk(4, 2, commit));

        let changes = vec![Change::Unchanged(0..5)];
        let result = apply(committed, &changes, 5, BStr::new(b"file.rs"));

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(0).unwrap().lines_in_hunk, 3);
        assert_eq!(result.get(1).unwrap().lines_in_hunk, 2);
    }

    #[test]
    fn inserted_lines_get_null_commit() {
        let commit = fake_commit();
        let mut committed = HunkStore::new();
        committed.insert_sorted(hunk(1, 3, commit));

        // one line inserted after the first
        let changes = vec![Change::Unchanged(0..1), Change::AddedOrReplaced(1..2, 0), Change::Unchanged(2..4)];
        let result = apply(committed, &changes, 4, BStr::new(b"file.rs"));

        assert_eq!(result.len(), 3);
        let inserted = result.by_line(2).unwrap();
        assert!(inserted.is_buffer_blame());
    }
}

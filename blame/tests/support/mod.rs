//! An in-memory fixture backend implementing the port traits, used instead of a real `.git`
//! directory. Paths are flat (no subdirectories) since none of the scenarios tested here need them.

use std::collections::HashMap;

use bstr::{BStr, BString};
use blame::{Change, CommitGraph, CommitId, CommitInfo, DiffAlgorithm, DiffEngine, Error, ObjectStore, Rename, RenameDetector, Signature};

pub struct FixtureCommit {
    pub parents: Vec<CommitId>,
    pub time_seconds: i64,
    pub author: Signature,
    /// path -> blob id; doubles as this fixture's "tree id" (there is only ever one tree per commit).
    pub files: HashMap<BString, CommitId>,
}

#[derive(Default)]
pub struct Fixture {
    commits: HashMap<CommitId, FixtureCommit>,
    blobs: HashMap<CommitId, Vec<u8>>,
    head: Option<CommitId>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_head(&mut self, id: CommitId) {
        self.head = Some(id);
    }

    pub fn add_blob(&mut self, id: CommitId, content: &[u8]) {
        self.blobs.insert(id, content.to_vec());
    }

    pub fn add_commit(&mut self, id: CommitId, parents: Vec<CommitId>, time_seconds: i64, author: &str, files: &[(&str, CommitId)]) {
        self.commits.insert(
            id,
            FixtureCommit {
                parents,
                time_seconds,
                author: Signature {
                    name: author.as_bytes().to_vec(),
                    email: format!("{author}@example.com").into_bytes(),
                    time_seconds,
                },
                files: files.iter().map(|(p, b)| (BString::from(*p), *b)).collect(),
            },
        );
    }
}

impl ObjectStore for Fixture {
    fn blob_data(&self, id: &CommitId) -> Result<Vec<u8>, Error> {
        self.blobs.get(id).cloned().ok_or_else(|| Error::ObjectAccess {
            id: id.to_string(),
            source: "no such blob in fixture".into(),
        })
    }
}

impl CommitGraph for Fixture {
    fn head(&self) -> Result<CommitId, Error> {
        self.head.ok_or_else(|| Error::UnresolvedHead { target: "HEAD".into() })
    }

    fn commit_info(&self, id: &CommitId) -> Result<CommitInfo, Error> {
        let commit = self.commits.get(id).ok_or_else(|| Error::ObjectAccess {
            id: id.to_string(),
            source: "no such commit in fixture".into(),
        })?;
        Ok(CommitInfo {
            parents: commit.parents.clone(),
            time_seconds: commit.time_seconds,
            tree_id: *id,
        })
    }

    fn tree_entry(&self, tree_id: &CommitId, path: &BStr) -> Result<Option<CommitId>, Error> {
        Ok(self.commits.get(tree_id).and_then(|c| c.files.get(path.as_ref() as &BStr)).copied())
    }

    fn author(&self, id: &CommitId) -> Result<Signature, Error> {
        Ok(self
            .commits
            .get(id)
            .ok_or_else(|| Error::ObjectAccess {
                id: id.to_string(),
                source: "no such commit in fixture".into(),
            })?
            .author
            .clone())
    }
}

/// Renames are looked up from a side table the test populates directly: `(new_tree, path) ->
/// (old_path, is_copy)`, since detecting them from tree content alone isn't this fixture's concern.
#[derive(Default)]
pub struct FixtureRenames {
    table: HashMap<(CommitId, BString), Rename>,
}

impl FixtureRenames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, new_tree: CommitId, new_path: &str, old_path: &str, is_copy: bool) {
        self.table.insert(
            (new_tree, BString::from(new_path)),
            Rename {
                old_path: old_path.into(),
                new_path: new_path.into(),
                is_copy,
            },
        );
    }
}

impl RenameDetector for FixtureRenames {
    fn find_source(
        &self,
        _old_tree: &CommitId,
        new_tree: &CommitId,
        path: &BStr,
        _allow_copies_same_commit: bool,
        _allow_copies_any_commit: bool,
    ) -> Result<Option<Rename>, Error> {
        Ok(self.table.get(&(*new_tree, BString::from(path))).cloned())
    }
}

/// Diffs line-oriented content with the `similar` crate, translating its ops into gapless
/// [`Change`]s the way a [`DiffEngine`] implementation must.
pub struct SimilarDiff;

impl DiffEngine for SimilarDiff {
    fn diff(&self, old: &[u8], new: &[u8], _algorithm: DiffAlgorithm, ignore_whitespace: bool) -> Result<Vec<Change>, Error> {
        let old_normalized;
        let new_normalized;
        let (old, new) = if ignore_whitespace {
            old_normalized = strip_whitespace(old);
            new_normalized = strip_whitespace(new);
            (old_normalized.as_slice(), new_normalized.as_slice())
        } else {
            (old, new)
        };
        let old_lines: Vec<&[u8]> = split_lines(old);
        let new_lines: Vec<&[u8]> = split_lines(new);
        let ops = similar::capture_diff_slices(similar::Algorithm::Myers, &old_lines, &new_lines);

        let mut changes = Vec::with_capacity(ops.len());
        for op in ops {
            match op {
                similar::DiffOp::Equal { new_index, len, .. } => {
                    changes.push(Change::Unchanged(new_index as u32..(new_index + len) as u32));
                }
                similar::DiffOp::Delete { new_index, old_len, .. } => {
                    changes.push(Change::Deleted(new_index as u32, old_len as u32));
                }
                similar::DiffOp::Insert { new_index, new_len, .. } => {
                    changes.push(Change::AddedOrReplaced(new_index as u32..(new_index + new_len) as u32, 0));
                }
                similar::DiffOp::Replace {
                    new_index, new_len, old_len, ..
                } => {
                    changes.push(Change::AddedOrReplaced(new_index as u32..(new_index + new_len) as u32, old_len as u32));
                }
            }
        }
        Ok(changes)
    }
}

fn split_lines(buf: &[u8]) -> Vec<&[u8]> {
    if buf.is_empty() {
        return Vec::new();
    }
    buf.split_inclusive(|&b| b == b'\n').collect()
}

/// Strips spaces and tabs from each line's content, keeping its terminator untouched, so that
/// lines differing only in whitespace compare equal under [`SimilarDiff`].
fn strip_whitespace(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len());
    for line in buf.split_inclusive(|&b| b == b'\n') {
        let content = line.strip_suffix(b"\r\n").or_else(|| line.strip_suffix(b"\n")).unwrap_or(line);
        let terminator = &line[content.len()..];
        out.extend(content.iter().copied().filter(|&b| b != b' ' && b != b'\t'));
        out.extend_from_slice(terminator);
    }
    out
}

pub fn lines_blob(lines: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    out
}

pub fn oid(repeated_hex_digit: char) -> CommitId {
    let hex: String = std::iter::repeat(repeated_hex_digit).take(40).collect();
    gix_hash::ObjectId::from_hex(hex.as_bytes()).expect("valid fixture hex id")
}

//! The history walker: drives commits through the pass-blame engine in reverse-chronological
//! order until every entry has been sealed into a [`Hunk`].

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
    rc::Rc,
};

use bstr::{BStr, BString};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    entry::{Entries, Entry, EntryId},
    hunk::{Hunk, HunkStore},
    origin::{Origin, OriginCache},
    pass::{ChangeMap, Classified},
    traits::{CommitGraph, DiffEngine, Mailmap, ObjectStore, RenameDetector},
    CommitId, Error, Flags, Options, Statistics,
};

/// Orders pending commits newest-first, breaking ties on commit id for determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueKey {
    time_seconds: i64,
    commit_id: CommitId,
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time_seconds
            .cmp(&other.time_seconds)
            .then_with(|| self.commit_id.cmp(&other.commit_id))
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An entry still suspected on its original commit, tagged with whether it has ever been
/// successfully diffed against a parent. An entry that reaches the end of the parent list
/// without ever being diffed is sealed as a boundary: either the commit has no parents, or none
/// of its parents even contain the path.
struct Pending {
    id: EntryId,
    diffed_any: bool,
}

/// Walks history from a seed commit, moving each entry's suspicion back through parents until it
/// can move no further, then seals it into `hunks`.
pub(crate) struct Walker<'repo, G, O, D, R, M> {
    graph: &'repo G,
    diff: &'repo D,
    renames: Option<&'repo R>,
    mailmap: &'repo M,
    options: Options,
    entries: Entries,
    origins: OriginCache<'repo, G, O>,
    pending: HashMap<CommitId, Vec<EntryId>>,
    heap: BinaryHeap<QueueKey>,
    hunks: HunkStore,
    statistics: Statistics,
}

impl<'repo, G, O, D, R, M> Walker<'repo, G, O, D, R, M>
where
    G: CommitGraph,
    O: ObjectStore,
    D: DiffEngine,
    R: RenameDetector,
    M: Mailmap,
{
    pub(crate) fn new(graph: &'repo G, objects: &'repo O, diff: &'repo D, renames: Option<&'repo R>, mailmap: &'repo M, options: Options) -> Self {
        Walker {
            graph,
            diff,
            renames,
            mailmap,
            options,
            entries: Entries::new(),
            origins: OriginCache::new(graph, objects),
            pending: HashMap::new(),
            heap: BinaryHeap::new(),
            hunks: HunkStore::new(),
            statistics: Statistics::default(),
        }
    }

    /// Blame `path` as it exists at `start_commit`, over the line windows `options.ranges`
    /// resolves to against the final blob.
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(%start_commit, ?path)))]
    pub(crate) fn run(mut self, start_commit: CommitId, path: &BStr) -> Result<(HunkStore, Statistics), Error> {
        let origin = self
            .origins
            .get(&start_commit, path, &mut self.statistics)?
            .ok_or_else(|| Error::PathNotFound { path: path.to_string() })?;

        let windows = origin.lines.resolve_window(&self.options)?;
        for window in windows {
            let id = self.entries.insert(Entry {
                suspect: origin.clone(),
                lno: window.start,
                s_lno: window.start,
                num_lines: window.end - window.start,
                is_boundary: false,
            });
            self.enqueue(id, start_commit);
        }

        while let Some(key) = self.heap.pop() {
            let Some(ids) = self.pending.remove(&key.commit_id) else {
                continue;
            };
            if ids.is_empty() {
                continue;
            }
            self.statistics.commits_traversed += 1;
            self.process_commit(&key.commit_id, ids)?;
        }

        Ok((self.hunks, self.statistics))
    }

    fn enqueue(&mut self, id: EntryId, commit_id: CommitId) {
        let is_new = !self.pending.contains_key(&commit_id);
        self.pending.entry(commit_id).or_default().push(id);
        if is_new {
            // time_seconds is looked up lazily on pop via commit_info; here we only need it to
            // order the heap, so fetch it eagerly once per distinct commit.
            if let Ok(info) = self.graph.commit_info(&commit_id) {
                self.heap.push(QueueKey {
                    time_seconds: info.time_seconds,
                    commit_id,
                });
            } else {
                self.heap.push(QueueKey { time_seconds: i64::MIN, commit_id });
            }
        }
    }

    fn process_commit(&mut self, commit_id: &CommitId, ids: Vec<EntryId>) -> Result<(), Error> {
        if self.options.oldest_commit.as_ref() == Some(commit_id) {
            #[cfg(feature = "tracing")]
            tracing::debug!(commit = %commit_id, entries = ids.len(), "oldest-commit reached, sealing as boundary");
            for id in ids {
                self.seal(id, true)?;
            }
            return Ok(());
        }

        let info = self.graph.commit_info(commit_id)?;
        let parents: &[CommitId] = if self.options.flags.contains(Flags::FIRST_PARENT) {
            &info.parents[..info.parents.len().min(1)]
        } else {
            &info.parents
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(commit = %commit_id, parents = parents.len(), entries = ids.len(), "visiting commit");

        let mut remaining: Vec<Pending> = ids.into_iter().map(|id| Pending { id, diffed_any: false }).collect();

        for parent in parents {
            if remaining.is_empty() {
                break;
            }
            let mut next_remaining = Vec::with_capacity(remaining.len());
            for pending in remaining {
                let mut leftover = self.pass_against_parent(pending, commit_id, parent)?;
                next_remaining.append(&mut leftover);
            }
            remaining = next_remaining;
        }

        for pending in remaining {
            self.seal(pending.id, !pending.diffed_any)?;
        }
        Ok(())
    }

    /// Attempt to move as much of `pending`'s entry as possible from `commit_id` to `parent`.
    /// Returns the pieces (as further `Pending`s) that remain suspected on `commit_id` afterward,
    /// either because they genuinely differ from the parent or because the parent has no origin
    /// to compare against.
    fn pass_against_parent(&mut self, pending: Pending, commit_id: &CommitId, parent: &CommitId) -> Result<Vec<Pending>, Error> {
        let entry = self.entries.get(pending.id).clone();
        let source_path = self.resolve_source_path(commit_id, parent, &entry.suspect.path)?;

        let Some(parent_origin) = self.origins.get(parent, source_path.as_ref(), &mut self.statistics)? else {
            return Ok(vec![pending]);
        };

        let ignore_whitespace = self.options.flags.contains(Flags::IGNORE_WHITESPACE);
        let changes = self
            .diff
            .diff(&parent_origin.blob, &entry.suspect.blob, self.options.diff_algorithm, ignore_whitespace)?;
        self.statistics.blobs_diffed += 1;
        let map = ChangeMap::new(&changes);
        let classified = map.classify(entry.suspect_range());

        #[cfg(feature = "tracing")]
        tracing::trace!(child = %commit_id, parent = %parent, changes = changes.len(), pieces = classified.len(), "diffed entry against parent");

        if classified.is_empty() {
            return Ok(vec![Pending { id: pending.id, diffed_any: true }]);
        }

        let mut leftover = Vec::new();
        let mut current = pending.id;
        for (i, piece) in classified.iter().enumerate() {
            let len = piece_len(piece);
            let (this_id, rest) = if i + 1 == classified.len() {
                (current, None)
            } else {
                let (prefix, suffix) = self.entries.split(current, len);
                (prefix, Some(suffix))
            };

            match piece {
                Classified::Unchanged { old_start, .. } => {
                    self.entries.reassign(this_id, parent_origin.clone(), *old_start);
                    self.enqueue(this_id, *parent);
                }
                Classified::Changed { .. } => {
                    leftover.push(Pending { id: this_id, diffed_any: true });
                }
            }

            if let Some(rest) = rest {
                current = rest;
            }
        }
        Ok(leftover)
    }

    /// Find the path to look up in `parent`'s tree for `path` as it appears at `commit_id`:
    /// the same path, unless rename/copy tracking is enabled and a detector locates a different
    /// source. A failed or absent detector is not an error; it just falls back to the same path.
    fn resolve_source_path(&self, commit_id: &CommitId, parent: &CommitId, path: &BStr) -> Result<BString, Error> {
        let flags = self.options.flags.normalized();
        if !flags.contains(Flags::TRACK_COPIES_SAME_FILE) {
            return Ok(BString::from(path));
        }
        let Some(detector) = self.renames else {
            return Ok(BString::from(path));
        };
        let this_tree = self.graph.commit_info(commit_id)?.tree_id;
        let parent_tree = self.graph.commit_info(parent)?.tree_id;
        let allow_copies_same_commit = flags.contains(Flags::TRACK_COPIES_SAME_COMMIT_COPIES);
        let allow_copies_any_commit = flags.contains(Flags::TRACK_COPIES_ANY_COMMIT_COPIES);
        match detector.find_source(&parent_tree, &this_tree, path, allow_copies_same_commit, allow_copies_any_commit)? {
            Some(rename) => Ok(BString::from(rename.old_path)),
            None => Ok(BString::from(path)),
        }
    }

    fn seal(&mut self, id: EntryId, is_boundary: bool) -> Result<(), Error> {
        let entry = self.entries.get_mut(id);
        entry.is_boundary = is_boundary;
        let entry = self.entries.get(id);

        #[cfg(feature = "tracing")]
        tracing::debug!(commit = %entry.suspect.commit_id, lno = entry.lno, num_lines = entry.num_lines, boundary = is_boundary, "sealed entry");

        let signature = self.resolve_signature(&entry.suspect)?;
        self.hunks.insert_sorted(Hunk::from_entry(entry, signature));
        Ok(())
    }

    fn resolve_signature(&self, suspect: &Rc<Origin>) -> Result<crate::traits::Signature, Error> {
        let raw = self.graph.author(&suspect.commit_id)?;
        Ok(if self.options.flags.contains(Flags::USE_MAILMAP) {
            self.mailmap.resolve(&raw)
        } else {
            raw
        })
    }
}

fn piece_len(c: &Classified) -> u32 {
    match c {
        Classified::Unchanged { new_range, .. } | Classified::Changed { new_range } => new_range.len() as u32,
    }
}

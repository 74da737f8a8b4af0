//! Suspects: a cached `(commit, path)` pair resolved to its blob content.

use std::{collections::HashMap, rc::Rc};

use bstr::BString;

use crate::{line_index::LineIndex, CommitGraph, CommitId, Error, ObjectStore, Statistics};

/// A suspected source of some lines: a `(commit, path)` pair, resolved to blob content.
///
/// Two origins are equal when their `commit_id` and `path` are equal. Origins are interned per
/// walk and shared via [`Rc`] so that many entries can point at the same suspect without
/// reloading or duplicating its blob.
#[derive(Debug)]
pub struct Origin {
    pub commit_id: CommitId,
    pub path: BString,
    pub blob: Vec<u8>,
    pub lines: LineIndex,
}

impl PartialEq for Origin {
    fn eq(&self, other: &Self) -> bool {
        self.commit_id == other.commit_id && self.path == other.path
    }
}
impl Eq for Origin {}

/// Interns [`Origin`]s per `(commit, path)` so a suspect's blob is loaded at most once per walk.
pub struct OriginCache<'repo, G, O> {
    graph: &'repo G,
    objects: &'repo O,
    cache: HashMap<(CommitId, BString), Rc<Origin>>,
}

impl<'repo, G, O> OriginCache<'repo, G, O>
where
    G: CommitGraph,
    O: ObjectStore,
{
    pub fn new(graph: &'repo G, objects: &'repo O) -> Self {
        OriginCache {
            graph,
            objects,
            cache: HashMap::new(),
        }
    }

    /// Resolve the suspect at `(commit_id, path)`, loading and line-indexing its blob on first
    /// access. Returns `Ok(None)` if the path does not exist (or isn't a blob) in that commit's
    /// tree, which the caller treats as a boundary rather than a hard error.
    pub fn get(&mut self, commit_id: &CommitId, path: &bstr::BStr, stats: &mut Statistics) -> Result<Option<Rc<Origin>>, Error> {
        let key = (*commit_id, BString::from(path));
        if let Some(origin) = self.cache.get(&key) {
            return Ok(Some(origin.clone()));
        }
        stats.trees_decoded += 1;
        stats.trees_diffed += 1;

        let info = self.graph.commit_info(commit_id)?;
        let Some(blob_id) = self.graph.tree_entry(&info.tree_id, path)? else {
            return Ok(None);
        };
        let blob = self.objects.blob_data(&blob_id)?;
        let lines = LineIndex::build(&blob);
        let origin = Rc::new(Origin {
            commit_id: *commit_id,
            path: BString::from(path),
            blob,
            lines,
        });
        self.cache.insert(key, origin.clone());
        Ok(Some(origin))
    }
}

//! The worklist of unresolved line ranges, each currently suspected to originate at some [`Origin`].

use std::rc::Rc;

use crate::origin::Origin;

/// An index into an [`Entries`] arena. Stable for the lifetime of the entry it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// An unresolved range of lines in the *final* blob, currently suspected to originate in `suspect`.
#[derive(Debug, Clone)]
pub struct Entry {
    pub suspect: Rc<Origin>,
    /// 0-based start line in the *final* blob. Never changes once the entry is created.
    pub lno: u32,
    /// 0-based start line in `suspect`'s blob.
    pub s_lno: u32,
    pub num_lines: u32,
    pub is_boundary: bool,
}

impl Entry {
    pub fn final_range(&self) -> std::ops::Range<u32> {
        self.lno..self.lno + self.num_lines
    }
    pub fn suspect_range(&self) -> std::ops::Range<u32> {
        self.s_lno..self.s_lno + self.num_lines
    }
}

/// An arena of [`Entry`] values, addressed by stable [`EntryId`]s.
///
/// A `Vec<Entry>` with index handles, per the accepted redesign of the reference algorithm's
/// pointer-linked worklist: splits return the indices of the prefix and suffix rather than
/// splicing pointers. Entries are conceptually sorted by `lno` (their fixed position in the final
/// blob), disjoint, and cover the blamed window minus whatever has already been sealed; that
/// invariant is tracked explicitly by `order`, a vector of `EntryId`s kept in `lno` order
/// alongside the arena, rather than re-derived by sorting on demand.
#[derive(Default)]
pub struct Entries {
    slots: Vec<Entry>,
    order: Vec<EntryId>,
}

impl Entries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.slots.len());
        self.slots.push(entry);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: EntryId) -> &Entry {
        &self.slots[id.0]
    }

    pub fn get_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.slots[id.0]
    }

    /// All entries in ascending `lno` order, as maintained by the sorted index vector.
    pub fn ordered(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.order.iter().map(move |id| self.get(*id))
    }

    fn position_of(&self, id: EntryId) -> usize {
        self.order.iter().position(|&x| x == id).expect("id must be present in the sorted index vector")
    }

    /// Insert `entry` into the sorted index vector immediately before `anchor`. Returns the new
    /// entry's id.
    pub fn insert_before(&mut self, anchor: EntryId, entry: Entry) -> EntryId {
        let id = EntryId(self.slots.len());
        self.slots.push(entry);
        let pos = self.position_of(anchor);
        self.order.insert(pos, id);
        id
    }

    /// Insert `entry` into the sorted index vector immediately after `anchor`. Returns the new
    /// entry's id.
    pub fn insert_after(&mut self, anchor: EntryId, entry: Entry) -> EntryId {
        let id = EntryId(self.slots.len());
        self.slots.push(entry);
        let pos = self.position_of(anchor);
        self.order.insert(pos + 1, id);
        id
    }

    /// Split `id` at `at` lines from its start (measured in the final blob).
    ///
    /// Requires `0 < at < entry.num_lines`. The entry named by `id` is shrunk in place to the
    /// prefix; a new entry is inserted for the suffix immediately after it in the sorted index
    /// vector. Both keep the same suspect; the suffix's `s_lno` is offset by `at`.
    pub fn split(&mut self, id: EntryId, at: u32) -> (EntryId, EntryId) {
        let entry = self.get(id).clone();
        debug_assert!(at > 0 && at < entry.num_lines, "split point must be interior");

        let suffix = Entry {
            suspect: entry.suspect.clone(),
            lno: entry.lno + at,
            s_lno: entry.s_lno + at,
            num_lines: entry.num_lines - at,
            is_boundary: entry.is_boundary,
        };
        self.get_mut(id).num_lines = at;
        let suffix_id = self.insert_after(id, suffix);
        (id, suffix_id)
    }

    /// Reassign `id`'s suspect and source line, e.g. after mapping it onto a parent commit.
    /// `lno` and `num_lines` are untouched: they describe the entry's fixed position in the
    /// final blob, so its place in the sorted index vector is unaffected.
    pub fn reassign(&mut self, id: EntryId, suspect: Rc<Origin>, s_lno: u32) {
        let entry = self.get_mut(id);
        entry.suspect = suspect;
        entry.s_lno = s_lno;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_index::LineIndex;

    fn origin(commit_hex: char) -> Rc<Origin> {
        let commit_id = gix_hash::ObjectId::from_hex(std::iter::repeat(commit_hex).take(40).collect::<String>().as_bytes()).unwrap();
        Rc::new(Origin {
            commit_id,
            path: "f".into(),
            blob: Vec::new(),
            lines: LineIndex::build(b""),
        })
    }

    fn entry(lno: u32, num_lines: u32) -> Entry {
        Entry {
            suspect: origin('1'),
            lno,
            s_lno: lno,
            num_lines,
            is_boundary: false,
        }
    }

    #[test]
    fn split_preserves_total_lines_and_keeps_suffix_adjacent_in_order() {
        let mut entries = Entries::new();
        let id = entries.insert(entry(0, 10));

        let (prefix, suffix) = entries.split(id, 4);

        assert_eq!(entries.get(prefix).num_lines, 4);
        assert_eq!(entries.get(suffix).num_lines, 6);
        assert_eq!(entries.get(suffix).lno, 4);
        assert_eq!(entries.get(suffix).s_lno, 4);

        assert_eq!(entries.order, vec![prefix, suffix]);
    }

    #[test]
    fn insert_before_and_after_preserve_sorted_order() {
        let mut entries = Entries::new();
        let middle = entries.insert(entry(5, 5));
        let before = entries.insert_before(middle, entry(0, 5));
        let after = entries.insert_after(middle, entry(10, 5));

        let order: Vec<EntryId> = entries.order.clone();
        assert_eq!(order, vec![before, middle, after]);

        let lnos: Vec<u32> = entries.ordered().map(|e| e.lno).collect();
        assert_eq!(lnos, vec![0, 5, 10]);
    }

    #[test]
    fn reassign_does_not_move_an_entry_within_the_sorted_order() {
        let mut entries = Entries::new();
        let first = entries.insert(entry(0, 3));
        let second = entries.insert(entry(3, 3));

        entries.reassign(second, origin('2'), 0);

        assert_eq!(entries.order, vec![first, second]);
        assert_eq!(entries.get(second).lno, 3, "lno is fixed once created");
    }
}

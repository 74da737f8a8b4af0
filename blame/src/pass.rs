//! The pass-blame engine: moving as many of an entry's lines as possible from a child suspect to
//! a parent, one parent at a time.

use std::ops::{AddAssign, Range, SubAssign};

use crate::traits::Change;

/// The offset, in lines, between a position in the *new* (child/suspect) blob and the
/// corresponding position in the *old* (parent) blob, accumulated while scanning a diff.
///
/// `Added(n)`: the new blob has `n` more lines up to this point than the old one (inserts so
/// far outweigh deletions). `Deleted(n)`: the reverse. The same two-variant trick used by the
/// reference implementation's offset type avoids a signed integer that could be confused with a
/// line count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Offset {
    Added(u32),
    Deleted(u32),
}

impl Offset {
    /// Map a range in the new blob back to the corresponding range in the old blob.
    fn shifted_range(&self, range: &Range<u32>) -> Range<u32> {
        match self {
            Offset::Added(added) => {
                debug_assert!(range.start >= *added, "{self:?} {range:?}");
                range.start - added..range.end - added
            }
            Offset::Deleted(deleted) => range.start + deleted..range.end + deleted,
        }
    }
}

impl AddAssign<u32> for Offset {
    fn add_assign(&mut self, rhs: u32) {
        *self = match *self {
            Self::Added(added) => Self::Added(added + rhs),
            Self::Deleted(deleted) if rhs > deleted => Self::Added(rhs - deleted),
            Self::Deleted(deleted) => Self::Deleted(deleted - rhs),
        };
    }
}

impl SubAssign<u32> for Offset {
    fn sub_assign(&mut self, rhs: u32) {
        *self = match *self {
            Self::Added(added) if rhs > added => Self::Deleted(rhs - added),
            Self::Added(added) => Self::Added(added - rhs),
            Self::Deleted(deleted) => Self::Deleted(deleted + rhs),
        };
    }
}

#[derive(Debug, Clone, Copy)]
enum SegmentKind {
    /// Lines that map 1-to-1 onto the parent; carries the parent-space start of the segment.
    Unchanged { old_start: u32 },
    /// Lines with no counterpart in the parent: inserted, or replacing removed parent lines.
    Changed,
}

/// A gapless partition of a suspect blob's line space into unchanged and changed runs, built
/// once per (parent, suspect) diff and then reused to classify every entry suspected there.
pub(crate) struct ChangeMap {
    segments: Vec<(Range<u32>, SegmentKind)>,
}

impl ChangeMap {
    /// `changes` must already be a gapless partition of the suspect's line space, ordered by
    /// position, as produced by a [`crate::DiffEngine`] implementation.
    pub(crate) fn new(changes: &[Change]) -> Self {
        let mut offset = Offset::Added(0);
        let mut segments = Vec::with_capacity(changes.len());
        for change in changes {
            match change {
                Change::Unchanged(range) => {
                    if !range.is_empty() {
                        let old_start = offset.shifted_range(range).start;
                        segments.push((range.clone(), SegmentKind::Unchanged { old_start }));
                    }
                }
                Change::AddedOrReplaced(range, removed) => {
                    if !range.is_empty() {
                        segments.push((range.clone(), SegmentKind::Changed));
                    }
                    update_offset(&mut offset, range.len() as u32, *removed);
                }
                Change::Deleted(pos, removed) => {
                    update_offset(&mut offset, 0, *removed);
                    let _ = pos;
                }
            }
        }
        ChangeMap { segments }
    }

    /// Split `range` (in suspect-space) into the sub-ranges that map onto the parent
    /// (`Classified::Unchanged`) and those that don't (`Classified::Changed`), in order.
    pub(crate) fn classify(&self, range: Range<u32>) -> Vec<Classified> {
        let mut out = Vec::new();
        for (seg_range, kind) in &self.segments {
            if seg_range.end <= range.start {
                continue;
            }
            if seg_range.start >= range.end {
                break;
            }
            let clipped_start = seg_range.start.max(range.start);
            let clipped_end = seg_range.end.min(range.end);
            if clipped_start >= clipped_end {
                continue;
            }
            match kind {
                SegmentKind::Unchanged { old_start } => {
                    let delta = clipped_start - seg_range.start;
                    let old_start = old_start + delta;
                    out.push(Classified::Unchanged {
                        new_range: clipped_start..clipped_end,
                        old_start,
                    });
                }
                SegmentKind::Changed => out.push(Classified::Changed {
                    new_range: clipped_start..clipped_end,
                }),
            }
        }
        out
    }
}

fn update_offset(offset: &mut Offset, added: u32, removed: u32) {
    if added >= removed {
        *offset += added - removed;
    } else {
        *offset -= removed - added;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Classified {
    Unchanged { new_range: Range<u32>, old_start: u32 },
    Changed { new_range: Range<u32> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_maps_through_insertion() {
        // parent: [a, b, c] ; suspect: [a, X, b, c] (one line inserted at position 1)
        let changes = vec![
            Change::Unchanged(0..1),
            Change::AddedOrReplaced(1..2, 0),
            Change::Unchanged(2..4),
        ];
        let map = ChangeMap::new(&changes);
        let got = map.classify(0..4);
        assert_eq!(
            got,
            vec![
                Classified::Unchanged {
                    new_range: 0..1,
                    old_start: 0
                },
                Classified::Changed { new_range: 1..2 },
                Classified::Unchanged {
                    new_range: 2..4,
                    old_start: 1
                },
            ]
        );
    }

    #[test]
    fn unchanged_maps_through_deletion() {
        // parent: [a, b, c, d] ; suspect: [a, d] (b,c deleted between them)
        let changes = vec![
            Change::Unchanged(0..1),
            Change::Deleted(1, 2),
            Change::Unchanged(1..2),
        ];
        let map = ChangeMap::new(&changes);
        let got = map.classify(0..2);
        assert_eq!(
            got,
            vec![
                Classified::Unchanged {
                    new_range: 0..1,
                    old_start: 0
                },
                Classified::Unchanged {
                    new_range: 1..2,
                    old_start: 3
                },
            ]
        );
    }

    #[test]
    fn classify_clips_to_requested_range() {
        let changes = vec![Change::Unchanged(0..10)];
        let map = ChangeMap::new(&changes);
        let got = map.classify(3..5);
        assert_eq!(
            got,
            vec![Classified::Unchanged {
                new_range: 3..5,
                old_start: 3
            }]
        );
    }
}

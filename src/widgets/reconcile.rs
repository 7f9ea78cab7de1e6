//! Pure diff of two child widget lists.
//!
//! The element tree never mutates itself while walking the new widgets.
//! It asks [`diff_children`] for a patch list first, then applies it.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use super::widget::{Key, Widget, WidgetRef};

/// What two widgets must share for one to update the other's element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub type_id: TypeId,
    pub key: Option<Key>,
}

impl Signature {
    pub fn of(widget: &dyn Widget) -> Self {
        Self {
            type_id: widget.as_any().type_id(),
            key: widget.key().cloned(),
        }
    }
}

/// True when `new` may be applied to the element currently showing `old`.
pub fn can_update(old: &dyn Widget, new: &dyn Widget) -> bool {
    Signature::of(old) == Signature::of(new)
}

/// One step of turning the old child list into the new one. Indices refer to
/// positions in the respective lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
    /// Keep the old element and give it the new widget.
    Update { old: usize, new: usize },
    /// Inflate a fresh element for the new widget.
    Insert { new: usize },
    /// Unmount the old element.
    Remove { old: usize },
}

impl Patch {
    /// An update whose element changes position.
    pub fn is_move(&self) -> bool {
        matches!(self, Patch::Update { old, new } if old != new)
    }
}

/// Matching slot of a child: its key, or for unkeyed children its position
/// among the unkeyed siblings of the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
    Keyed(TypeId, Key),
    Positional(TypeId, usize),
}

fn slots(widgets: &[WidgetRef]) -> Vec<Slot> {
    let mut unkeyed: HashMap<TypeId, usize> = HashMap::new();
    widgets
        .iter()
        .map(|widget| {
            let signature = Signature::of(&**widget);
            match signature.key {
                Some(key) => Slot::Keyed(signature.type_id, key),
                None => {
                    let ordinal = unkeyed.entry(signature.type_id).or_default();
                    let slot = Slot::Positional(signature.type_id, *ordinal);
                    *ordinal += 1;
                    slot
                }
            }
        })
        .collect()
}

/// Diffs `old` against `new`.
///
/// Keyed children match by type and key through a map, so reordering,
/// inserting or removing one keyed child costs exactly one patch for it and
/// leaves the others as plain updates. Removals come first, in old order,
/// followed by one update or insert per new child, in new order.
pub fn diff_children(old: &[WidgetRef], new: &[WidgetRef]) -> Vec<Patch> {
    let mut available: HashMap<Slot, usize> = slots(old)
        .into_iter()
        .enumerate()
        .map(|(index, slot)| (slot, index))
        .collect();

    let mut matched = Vec::with_capacity(new.len());
    for (new_index, slot) in slots(new).into_iter().enumerate() {
        matched.push(match available.remove(&slot) {
            Some(old_index) => Patch::Update {
                old: old_index,
                new: new_index,
            },
            None => Patch::Insert { new: new_index },
        });
    }

    let mut removed: Vec<usize> = available.into_values().collect();
    removed.sort_unstable();
    removed
        .into_iter()
        .map(|old| Patch::Remove { old })
        .chain(matched)
        .collect()
}

/// First key used by more than one sibling.
pub fn duplicate_key(widgets: &[WidgetRef]) -> Option<Key> {
    let mut seen = HashSet::new();
    widgets
        .iter()
        .filter_map(|widget| widget.key())
        .find(|key| !seen.insert(*key))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{FixedSize, IntoWidget, Stack, widgets};

    fn keyed(keys: &[i64]) -> Vec<WidgetRef> {
        widgets(keys.iter().map(|&key| FixedSize::new(10.0, 10.0).with_key(key)))
    }

    #[test]
    fn test_identical_lists_update_in_place() {
        let old = keyed(&[1, 2, 3]);
        let new = keyed(&[1, 2, 3]);
        let patches = diff_children(&old, &new);
        assert_eq!(patches.len(), 3);
        assert!(patches.iter().all(|p| matches!(p, Patch::Update { .. }) && !p.is_move()));
    }

    #[test]
    fn test_reorder_is_only_moves() {
        let old = keyed(&[1, 2, 3]);
        let new = keyed(&[3, 1, 2]);
        assert_eq!(
            diff_children(&old, &new),
            vec![
                Patch::Update { old: 2, new: 0 },
                Patch::Update { old: 0, new: 1 },
                Patch::Update { old: 1, new: 2 },
            ]
        );
    }

    #[test]
    fn test_insert_and_remove_touch_one_child_each() {
        let old = keyed(&[1, 2, 3]);
        let new = keyed(&[1, 4, 3]);
        assert_eq!(
            diff_children(&old, &new),
            vec![
                Patch::Remove { old: 1 },
                Patch::Update { old: 0, new: 0 },
                Patch::Insert { new: 1 },
                Patch::Update { old: 2, new: 2 },
            ]
        );
    }

    #[test]
    fn test_type_change_replaces_element() {
        let old = widgets([FixedSize::new(1.0, 1.0)]);
        let new = widgets([Stack::new(Vec::new())]);
        assert_eq!(
            diff_children(&old, &new),
            vec![Patch::Remove { old: 0 }, Patch::Insert { new: 0 }]
        );
    }

    #[test]
    fn test_unkeyed_match_by_type_and_position() {
        let old: Vec<WidgetRef> = vec![
            FixedSize::new(1.0, 1.0).into_widget(),
            Stack::new(Vec::new()).into_widget(),
            FixedSize::new(2.0, 2.0).into_widget(),
        ];
        let new: Vec<WidgetRef> = vec![
            Stack::new(Vec::new()).into_widget(),
            FixedSize::new(3.0, 3.0).into_widget(),
        ];
        assert_eq!(
            diff_children(&old, &new),
            vec![
                Patch::Remove { old: 2 },
                Patch::Update { old: 1, new: 0 },
                Patch::Update { old: 0, new: 1 },
            ]
        );
    }

    #[test]
    fn test_duplicate_keys_are_found() {
        assert_eq!(duplicate_key(&keyed(&[1, 2, 1])), Some(Key::Int(1)));
        assert_eq!(duplicate_key(&keyed(&[1, 2, 3])), None);
    }
}

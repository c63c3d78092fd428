// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered entry collection with immutable snapshots.
//
// Every mutation builds a new `Vec` and swaps the `Arc`; snapshots handed out
// earlier keep seeing the list as it was.

use std::sync::Arc;

use proofsheet_core::error::{ProofsheetError, Result};
use proofsheet_core::{Entry, EntryId, Offset, OrientationPreference, RasterHandle, Rotation, Scale};
use tracing::debug;

/// Field changes for one entry. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    /// `Some(None)` clears the title.
    pub title: Option<Option<String>>,
    /// `Some(None)` clears the size.
    pub size: Option<Option<String>>,
    pub orientation: Option<OrientationPreference>,
    /// Raw percentage; clamped to 50..=100.
    pub scale: Option<i32>,
    /// Raw percentage; clamped to -100..=100.
    pub offset_x: Option<i32>,
    /// Raw percentage; clamped to -100..=100.
    pub offset_y: Option<i32>,
    /// Degrees; must be a multiple of 90.
    pub rotation: Option<i32>,
}

impl EntryUpdate {
    fn apply_to(self, entry: &mut Entry) -> Result<()> {
        // Validate before touching anything so a bad rotation changes nothing.
        let rotation = self.rotation.map(Rotation::from_degrees).transpose()?;

        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(size) = self.size {
            entry.size = size;
        }
        if let Some(orientation) = self.orientation {
            entry.orientation = orientation;
        }
        if let Some(scale) = self.scale {
            entry.scale = Scale::new(scale);
        }
        if let Some(x) = self.offset_x {
            entry.offset_x = Offset::new(x);
        }
        if let Some(y) = self.offset_y {
            entry.offset_y = Offset::new(y);
        }
        if let Some(rotation) = rotation {
            entry.rotation = rotation;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryList {
    current: Arc<Vec<Entry>>,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The list as of now. Later mutations do not affect it.
    pub fn snapshot(&self) -> Arc<Vec<Entry>> {
        Arc::clone(&self.current)
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.current.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    /// Append a blank entry.
    pub fn add(&mut self) -> EntryId {
        let entry = Entry::new();
        let id = entry.id;
        self.modify(|entries| entries.push(entry));
        debug!(%id, len = self.len(), "Entry added");
        id
    }

    pub fn update(&mut self, id: EntryId, update: EntryUpdate) -> Result<()> {
        let index = self.index_of(id)?;
        let mut next = self.current.as_ref().clone();
        update.apply_to(&mut next[index])?;
        self.current = Arc::new(next);
        debug!(%id, "Entry updated");
        Ok(())
    }

    /// Remove an entry and hand it back so its rasters can be released.
    pub fn remove(&mut self, id: EntryId) -> Result<Entry> {
        let index = self.index_of(id)?;
        let mut next = self.current.as_ref().clone();
        let removed = next.remove(index);
        self.current = Arc::new(next);
        debug!(%id, len = self.len(), "Entry removed");
        Ok(removed)
    }

    /// Move the entry at `from` so it ends up at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.len();
        if from >= len {
            return Err(ProofsheetError::IndexOutOfRange(from));
        }
        if to >= len {
            return Err(ProofsheetError::IndexOutOfRange(to));
        }
        if from != to {
            self.modify(|entries| {
                let entry = entries.remove(from);
                entries.insert(to, entry);
            });
        }
        Ok(())
    }

    /// Install a finalized image, returning the one it replaces.
    pub(crate) fn set_image(
        &mut self,
        id: EntryId,
        image: RasterHandle,
    ) -> Result<Option<RasterHandle>> {
        let index = self.index_of(id)?;
        let mut next = self.current.as_ref().clone();
        let previous = next[index].image.replace(image);
        self.current = Arc::new(next);
        Ok(previous)
    }

    fn index_of(&self, id: EntryId) -> Result<usize> {
        self.current
            .iter()
            .position(|e| e.id == id)
            .ok_or(ProofsheetError::EntryNotFound(id))
    }

    fn modify(&mut self, f: impl FnOnce(&mut Vec<Entry>)) {
        let mut next = self.current.as_ref().clone();
        f(&mut next);
        self.current = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_are_not_mutated_by_updates() {
        let mut list = EntryList::new();
        let id = list.add();
        let before = list.snapshot();

        list.update(
            id,
            EntryUpdate {
                title: Some(Some("Lobby banner".into())),
                scale: Some(70),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(before[0].title, None);
        assert_eq!(before[0].scale.percent(), 100);
        let after = list.snapshot();
        assert_eq!(after[0].title.as_deref(), Some("Lobby banner"));
        assert_eq!(after[0].scale.percent(), 70);
    }

    #[test]
    fn update_clamps_raw_values() {
        let mut list = EntryList::new();
        let id = list.add();
        list.update(
            id,
            EntryUpdate {
                scale: Some(10),
                offset_x: Some(400),
                offset_y: Some(-400),
                ..Default::default()
            },
        )
        .unwrap();
        let entry = list.get(id).unwrap();
        assert_eq!(entry.scale.percent(), 50);
        assert_eq!(entry.offset_x.percent(), 100);
        assert_eq!(entry.offset_y.percent(), -100);
    }

    #[test]
    fn invalid_rotation_changes_nothing() {
        let mut list = EntryList::new();
        let id = list.add();
        let err = list
            .update(
                id,
                EntryUpdate {
                    title: Some(Some("x".into())),
                    rotation: Some(45),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ProofsheetError::InvalidRotation(45)));
        assert_eq!(list.get(id).unwrap().title, None);
    }

    #[test]
    fn reorder_moves_entries() {
        let mut list = EntryList::new();
        let a = list.add();
        let b = list.add();
        let c = list.add();
        list.reorder(0, 2).unwrap();
        let ids: Vec<EntryId> = list.snapshot().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![b, c, a]);
        assert!(matches!(
            list.reorder(3, 0),
            Err(ProofsheetError::IndexOutOfRange(3))
        ));
    }

    #[test]
    fn remove_unknown_entry_fails() {
        let mut list = EntryList::new();
        let id = list.add();
        list.remove(id).unwrap();
        assert!(list.is_empty());
        assert!(matches!(list.remove(id), Err(ProofsheetError::EntryNotFound(_))));
    }
}

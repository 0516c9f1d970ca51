//! The ordered collection of thumbnails that makes up a contact sheet.
//!
//! Thumbnails keep the order they were added in. Each one gets a
//! [`PhotoId`] that stays valid while it is on the sheet and is never handed
//! out again, so callers can remove a photo without tracking shifting
//! indices.

use crate::types::Thumbnail;
use std::fmt;

/// Stable identifier for a photo on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(u64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ContactSheet {
    entries: Vec<(PhotoId, Thumbnail)>,
    next_id: u64,
}

impl ContactSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a thumbnail at the end of the sheet.
    pub fn push(&mut self, thumbnail: Thumbnail) -> PhotoId {
        let id = PhotoId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, thumbnail));
        id
    }

    /// Remove the thumbnail at `index`, shifting later ones down.
    pub fn remove(&mut self, index: usize) -> Option<Thumbnail> {
        if index >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(index).1)
    }

    /// Remove the thumbnail with the given id.
    pub fn remove_id(&mut self, id: PhotoId) -> Option<Thumbnail> {
        let index = self.position(id)?;
        self.remove(index)
    }

    pub fn get(&self, id: PhotoId) -> Option<&Thumbnail> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, thumb)| thumb)
    }

    /// Current index of `id`, if it is still on the sheet.
    pub fn position(&self, id: PhotoId) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| *entry_id == id)
    }

    /// Thumbnails in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (PhotoId, &Thumbnail)> {
        self.entries.iter().map(|(id, thumb)| (*id, thumb))
    }

    pub fn thumbnails(&self) -> impl Iterator<Item = &Thumbnail> {
        self.entries.iter().map(|(_, thumb)| thumb)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every thumbnail. Ids are still never reused.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

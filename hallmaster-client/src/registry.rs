//! Room registry: color key -> room identity
//!
//! Built once per session from the room directory and read-only afterwards.
//! Lookups of colors the directory did not list are hard failures; the remote
//! service may have added a room since the registry was built.

use hallmaster_common::{Error, Result, RoomDirectoryEntry, RoomInfo};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Canonical form of a color key: trimmed, ASCII-lowercased
pub fn normalize_color_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// Validated mapping from display color to room
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, RoomInfo>,
}

impl RoomRegistry {
    /// Build from directory entries
    ///
    /// # Errors
    /// `Validation` on an empty color key, an empty room name, or two rooms
    /// sharing a color.
    pub fn build<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = RoomDirectoryEntry>,
    {
        let mut rooms: HashMap<String, RoomInfo> = HashMap::new();

        for entry in entries {
            let color_key = normalize_color_key(&entry.color_key);
            if color_key.is_empty() {
                return Err(Error::Validation(format!(
                    "Room {} has no color key",
                    entry.id
                )));
            }

            let name = entry.name.trim();
            if name.is_empty() {
                return Err(Error::Validation(format!(
                    "Room {} ({}) has no name",
                    entry.id, color_key
                )));
            }

            if let Some(existing) = rooms.get(&color_key) {
                return Err(Error::Validation(format!(
                    "Color {} shared by rooms '{}' ({}) and '{}' ({})",
                    color_key,
                    existing.name(),
                    existing.id(),
                    name,
                    entry.id
                )));
            }

            debug!(room_id = entry.id, name = %name, color = %color_key, "Registered room");
            rooms.insert(color_key.clone(), RoomInfo::new(entry.id, name, color_key));
        }

        if rooms.is_empty() {
            warn!("Room directory is empty; every booking lookup will fail");
        }

        Ok(Self { rooms })
    }

    /// Resolve a color key
    ///
    /// # Errors
    /// `NotFound` when the color is not registered.
    pub fn lookup(&self, color_key: &str) -> Result<&RoomInfo> {
        self.rooms
            .get(&normalize_color_key(color_key))
            .ok_or_else(|| Error::NotFound(format!("No room registered for color '{}'", color_key)))
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// All rooms, ordered by room id
    pub fn rooms(&self) -> Vec<&RoomInfo> {
        let mut rooms: Vec<&RoomInfo> = self.rooms.values().collect();
        rooms.sort_by_key(|room| room.id());
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, name: &str, color: &str) -> RoomDirectoryEntry {
        RoomDirectoryEntry {
            id,
            name: name.to_string(),
            color_key: color.to_string(),
        }
    }

    #[test]
    fn test_lookup_resolves_room() {
        let registry =
            RoomRegistry::build(vec![entry(1, "Hall A", "#fff"), entry(2, "Hall B", "#000")])
                .unwrap();

        let room = registry.lookup("#000").unwrap();
        assert_eq!(room.id(), 2);
        assert_eq!(room.name(), "Hall B");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = RoomRegistry::build(vec![entry(1, "Hall A", "#3A87AD")]).unwrap();
        assert_eq!(registry.lookup("#3a87ad").unwrap().name(), "Hall A");
        assert_eq!(registry.lookup(" #3A87ad ").unwrap().color_key(), "#3a87ad");
    }

    #[test]
    fn test_unknown_color_is_not_found() {
        let registry = RoomRegistry::build(vec![entry(1, "Hall A", "#fff")]).unwrap();
        let err = registry.lookup("#123456").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_duplicate_color_rejected() {
        let err = RoomRegistry::build(vec![entry(1, "Hall A", "#fff"), entry(2, "Hall B", "#FFF")])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("Hall A"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = RoomRegistry::build(vec![entry(1, "  ", "#fff")]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_blank_color_rejected() {
        let err = RoomRegistry::build(vec![entry(1, "Hall A", "")]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_rooms_sorted_by_id() {
        let registry = RoomRegistry::build(vec![
            entry(9, "Annexe", "#111"),
            entry(3, "Main Hall", "#222"),
        ])
        .unwrap();
        let ids: Vec<u32> = registry.rooms().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![3, 9]);
    }
}

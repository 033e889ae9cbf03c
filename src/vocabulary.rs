//! Canonical room-type vocabulary.
//!
//! CubiCasa5K annotations label rooms with free-form class tokens
//! (`Bath`, `LivingRoom`, `DraughtLobby`, ...). The [`Vocabulary`] maps the
//! lowercased tokens onto a closed set of [`RoomType`]s. Tokens outside the
//! table pass through unchanged so stable-but-unknown labels still reach the
//! ground truth instead of being dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical room categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Bedroom,
    Bathroom,
    Kitchen,
    LivingRoom,
    DiningRoom,
    Entry,
    Lobby,
    Corridor,
    Outdoor,
    Terrace,
    Balcony,
    Garage,
    Storage,
    Utility,
    Laundry,
    Closet,
    Vestibule,
    Other,
}

impl RoomType {
    /// Every canonical type, in declaration order.
    pub const ALL: [RoomType; 18] = [
        RoomType::Bedroom,
        RoomType::Bathroom,
        RoomType::Kitchen,
        RoomType::LivingRoom,
        RoomType::DiningRoom,
        RoomType::Entry,
        RoomType::Lobby,
        RoomType::Corridor,
        RoomType::Outdoor,
        RoomType::Terrace,
        RoomType::Balcony,
        RoomType::Garage,
        RoomType::Storage,
        RoomType::Utility,
        RoomType::Laundry,
        RoomType::Closet,
        RoomType::Vestibule,
        RoomType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Bedroom => "bedroom",
            RoomType::Bathroom => "bathroom",
            RoomType::Kitchen => "kitchen",
            RoomType::LivingRoom => "living_room",
            RoomType::DiningRoom => "dining_room",
            RoomType::Entry => "entry",
            RoomType::Lobby => "lobby",
            RoomType::Corridor => "corridor",
            RoomType::Outdoor => "outdoor",
            RoomType::Terrace => "terrace",
            RoomType::Balcony => "balcony",
            RoomType::Garage => "garage",
            RoomType::Storage => "storage",
            RoomType::Utility => "utility",
            RoomType::Laundry => "laundry",
            RoomType::Closet => "closet",
            RoomType::Vestibule => "vestibule",
            RoomType::Other => "other",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CubiCasa5K class token -> canonical room type.
pub const CUBICASA_TABLE: &[(&str, RoomType)] = &[
    ("bedroom", RoomType::Bedroom),
    ("bath", RoomType::Bathroom),
    ("kitchen", RoomType::Kitchen),
    ("livingroom", RoomType::LivingRoom),
    ("dining", RoomType::DiningRoom),
    ("entry", RoomType::Entry),
    ("lobby", RoomType::Lobby),
    ("corridor", RoomType::Corridor),
    ("outdoor", RoomType::Outdoor),
    ("terrace", RoomType::Terrace),
    ("balcony", RoomType::Balcony),
    ("garage", RoomType::Garage),
    ("storage", RoomType::Storage),
    ("utility", RoomType::Utility),
    ("laundry", RoomType::Laundry),
    ("closet", RoomType::Closet),
    ("draughtlobby", RoomType::Vestibule),
    ("undefined", RoomType::Other),
];

/// Read-only token lookup table.
///
/// `Copy` and backed by `'static` data, so parsers and scorers can hold their
/// own handle and run on any thread.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    table: &'static [(&'static str, RoomType)],
}

impl Vocabulary {
    pub const fn new(table: &'static [(&'static str, RoomType)]) -> Self {
        Self { table }
    }

    /// The CubiCasa5K table.
    pub const fn cubicasa() -> Self {
        Self::new(CUBICASA_TABLE)
    }

    /// Look up a token, returning `None` when it is not a table key.
    pub fn lookup(&self, token: &str) -> Option<RoomType> {
        self.table
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, room_type)| *room_type)
    }

    /// Whether the token is a key of the table.
    pub fn contains(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    /// Map a lowercase token to its canonical name, or return it unchanged.
    pub fn normalize(&self, token: &str) -> String {
        match self.lookup(token) {
            Some(room_type) => room_type.as_str().to_string(),
            None => token.to_string(),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::cubicasa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tokens_map_to_canonical_names() {
        let vocab = Vocabulary::cubicasa();
        assert_eq!(vocab.normalize("bath"), "bathroom");
        assert_eq!(vocab.normalize("livingroom"), "living_room");
        assert_eq!(vocab.normalize("draughtlobby"), "vestibule");
        assert_eq!(vocab.normalize("undefined"), "other");
        assert_eq!(vocab.normalize("garage"), "garage");
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        let vocab = Vocabulary::cubicasa();
        assert_eq!(vocab.normalize("foo"), "foo");
        assert_eq!(vocab.normalize("sauna"), "sauna");
        assert_eq!(vocab.normalize(""), "");
        assert!(!vocab.contains("space"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        // Callers lowercase before lookup.
        let vocab = Vocabulary::cubicasa();
        assert_eq!(vocab.lookup("Bath"), None);
        assert_eq!(vocab.lookup("bath"), Some(RoomType::Bathroom));
    }

    #[test]
    fn test_table_targets_are_canonical() {
        for (_, room_type) in CUBICASA_TABLE {
            assert!(RoomType::ALL.contains(room_type));
        }
        assert_eq!(RoomType::LivingRoom.to_string(), "living_room");
    }
}

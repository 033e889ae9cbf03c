//! Structured floorplan labels.
//!
//! The same [`FloorplanLabel`] shape carries both ground truth (derived from
//! annotations) and model predictions. Gold labels are always consistent;
//! predictions are accepted as-is and may disagree with their own room list.

use crate::vocabulary::RoomType;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::path::PathBuf;

/// A single room in a floorplan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Room type, e.g. "bedroom", "bathroom", "living_room".
    #[serde(rename = "type")]
    pub room_type: String,

    /// Floor area, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<f64>,
}

impl Room {
    pub fn new(room_type: impl Into<String>) -> Self {
        Self {
            room_type: room_type.into(),
            area_sqft: None,
        }
    }

    pub fn with_area(mut self, area_sqft: f64) -> Self {
        self.area_sqft = Some(area_sqft);
        self
    }

    fn is(&self, room_type: RoomType) -> bool {
        self.room_type == room_type.as_str()
    }
}

/// Room inventory of one floorplan.
///
/// Counts are signed: a prediction may report any integer, including a
/// negative one, and is still scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorplanLabel {
    pub rooms: Vec<Room>,
    #[serde(deserialize_with = "integral")]
    pub total_rooms: i64,
    pub has_garage: bool,
    #[serde(deserialize_with = "integral")]
    pub num_bathrooms: i64,
    #[serde(deserialize_with = "integral")]
    pub num_bedrooms: i64,
}

/// Accept an integer, or a float with no fractional part (`2.0`).
fn integral<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        Number::Float(f) => Err(de::Error::custom(format!("expected an integer, got {f}"))),
    }
}

impl FloorplanLabel {
    /// Build a label whose aggregate fields are derived from `rooms`.
    pub fn from_rooms(rooms: Vec<Room>) -> Self {
        let count = |room_type: RoomType| rooms.iter().filter(|r| r.is(room_type)).count() as i64;

        Self {
            total_rooms: rooms.len() as i64,
            num_bedrooms: count(RoomType::Bedroom),
            num_bathrooms: count(RoomType::Bathroom),
            has_garage: rooms.iter().any(|r| r.is(RoomType::Garage)),
            rooms,
        }
    }

    /// Check the aggregate fields against the room list.
    pub fn is_consistent(&self) -> bool {
        let derived = Self::from_rooms(self.rooms.clone());
        self.total_rooms == derived.total_rooms
            && self.num_bedrooms == derived.num_bedrooms
            && self.num_bathrooms == derived.num_bathrooms
            && self.has_garage == derived.has_garage
    }

    /// Room types in list order.
    pub fn room_types(&self) -> Vec<&str> {
        self.rooms.iter().map(|r| r.room_type.as_str()).collect()
    }
}

/// One floorplan image paired with its ground truth.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Directory the sample was loaded from.
    pub dir: PathBuf,
    pub image_path: PathBuf,
    pub gold_label: FloorplanLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooms(types: &[&str]) -> Vec<Room> {
        types.iter().map(|t| Room::new(*t)).collect()
    }

    #[test]
    fn test_from_rooms_derives_aggregates() {
        let label = FloorplanLabel::from_rooms(rooms(&[
            "bedroom", "bedroom", "bathroom", "garage", "kitchen",
        ]));

        assert_eq!(label.total_rooms, 5);
        assert_eq!(label.num_bedrooms, 2);
        assert_eq!(label.num_bathrooms, 1);
        assert!(label.has_garage);
        assert!(label.is_consistent());
    }

    #[test]
    fn test_empty_label() {
        let label = FloorplanLabel::from_rooms(Vec::new());
        assert_eq!(label.total_rooms, 0);
        assert!(!label.has_garage);
        assert!(label.is_consistent());
    }

    #[test]
    fn test_inconsistent_prediction_is_representable() {
        let label = FloorplanLabel {
            rooms: rooms(&["bedroom"]),
            total_rooms: 4,
            has_garage: true,
            num_bathrooms: 2,
            num_bedrooms: 1,
        };
        assert!(!label.is_consistent());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "rooms": [{"type": "bedroom", "area_sqft": 120.5}, {"type": "kitchen"}],
            "total_rooms": 2,
            "has_garage": false,
            "num_bathrooms": 0,
            "num_bedrooms": 1
        }"#;
        let label: FloorplanLabel = serde_json::from_str(json).unwrap();

        assert_eq!(label.rooms[0], Room::new("bedroom").with_area(120.5));
        assert_eq!(label.rooms[1].area_sqft, None);
        assert_eq!(label.room_types(), vec!["bedroom", "kitchen"]);

        let out = serde_json::to_string(&label.rooms[1]).unwrap();
        assert_eq!(out, r#"{"type":"kitchen"}"#);
    }

    #[test]
    fn test_counts_accept_negative_and_integral_floats() {
        let json = r#"{
            "rooms": [{"type": "bedroom"}],
            "total_rooms": 1.0,
            "has_garage": false,
            "num_bathrooms": -1,
            "num_bedrooms": 1
        }"#;
        let label: FloorplanLabel = serde_json::from_str(json).unwrap();

        assert_eq!(label.total_rooms, 1);
        assert_eq!(label.num_bathrooms, -1);
        assert!(!label.is_consistent());
    }

    #[test]
    fn test_counts_reject_fractions_and_strings() {
        let base = |count: &str| {
            format!(
                r#"{{"rooms": [], "total_rooms": {count}, "has_garage": false, "num_bathrooms": 0, "num_bedrooms": 0}}"#
            )
        };
        assert!(serde_json::from_str::<FloorplanLabel>(&base("0")).is_ok());
        assert!(serde_json::from_str::<FloorplanLabel>(&base("1.5")).is_err());
        assert!(serde_json::from_str::<FloorplanLabel>(&base("\"two\"")).is_err());
    }
}

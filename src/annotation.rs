//! Ground-truth derivation from CubiCasa5K SVG annotations.
//!
//! Rooms are SVG elements whose `class` attribute contains `Space`, followed
//! by an optional category and a type, e.g. `"Space Outdoor Terrace"`:
//!
//! 1. The last token is the type hint (`terrace`).
//! 2. With three or more tokens, the second token is a category hint
//!    (`outdoor`). A category that the vocabulary recognizes wins over the
//!    type hint.
//! 3. An element carrying only a single token is recorded as `other`.
//!
//! The marker check is a plain substring test, so a class such as
//! `"OpenSpaceMarker Bedroom"` is also read as a room. That false positive is a
//! known property of the annotation convention and is kept as-is.

use crate::error::{FloorplanError, Result};
use crate::label::{FloorplanLabel, Room};
use crate::vocabulary::{RoomType, Vocabulary};
use std::path::Path;
use tracing::debug;

/// Substring of a `class` attribute that marks a room element.
pub const SPACE_MARKER: &str = "Space";

/// Parses annotation documents into gold [`FloorplanLabel`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationParser {
    vocabulary: Vocabulary,
}

impl AnnotationParser {
    /// Create a parser over the given vocabulary.
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Parse an annotation file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not well-formed XML.
    pub fn parse_file(&self, path: &Path) -> Result<FloorplanLabel> {
        let content = std::fs::read_to_string(path).map_err(|e| FloorplanError::io(path, e))?;
        self.parse_str(&content)
            .map_err(|e| FloorplanError::annotation(path, e.to_string()))
    }

    /// Parse annotation XML held in memory.
    pub fn parse_str(&self, content: &str) -> std::result::Result<FloorplanLabel, roxmltree::Error> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(content, options)?;

        let rooms = doc
            .descendants()
            .filter(|n| n.is_element())
            .filter_map(|n| n.attribute("class"))
            .filter(|class| class.contains(SPACE_MARKER))
            .map(|class| Room::new(self.resolve_type(class)))
            .collect();

        Ok(FloorplanLabel::from_rooms(rooms))
    }

    /// Resolve the room type of one marked `class` attribute.
    pub fn resolve_type(&self, class: &str) -> String {
        let tokens: Vec<String> = class.split_whitespace().map(str::to_lowercase).collect();

        let Some(type_token) = tokens.last().filter(|_| tokens.len() >= 2) else {
            return RoomType::Other.as_str().to_string();
        };
        let mut room_type = self.vocabulary.normalize(type_token);

        if tokens.len() >= 3 {
            if let Some(category) = self.vocabulary.lookup(&tokens[1]) {
                room_type = category.as_str().to_string();
            }
        }

        debug!(class, room_type = %room_type, "resolved room");
        room_type
    }
}

use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-editable fields of a game, shared by creation and full overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFields {
    /// Title of the game; unique across the catalog.
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    /// Platforms the game was released on.
    pub platforms: Vec<String>,
    /// Screenshot URLs.
    pub screenshots: Vec<String>,
    /// Platforms on which the collection owns a copy (set semantics).
    pub owned_platforms: Vec<String>,
    pub genres: Vec<String>,
}

/// Game document persisted in the local catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Editable payload of the game.
    pub fields: GameFields,
    /// Stamped by the repository when the document is first inserted.
    pub created_at: SystemTime,
    /// Stamped by the repository on every update or platform merge.
    pub modified_at: Option<SystemTime>,
}

impl GameEntity {
    /// Build a brand-new game document with a fresh identifier.
    pub fn new(fields: GameFields, created_at: SystemTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            created_at,
            modified_at: None,
        }
    }

    /// Title of the game.
    pub fn title(&self) -> &str {
        &self.fields.title
    }
}

/// Discriminates the two taxonomy collections sharing the same record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Platform,
    Genre,
}

impl TaxonomyKind {
    /// Name of the store collection backing this kind.
    pub fn collection_name(self) -> &'static str {
        match self {
            TaxonomyKind::Platform => "platforms",
            TaxonomyKind::Genre => "gamegenres",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxonomyKind::Platform => f.write_str("platform"),
            TaxonomyKind::Genre => f.write_str("genre"),
        }
    }
}

/// Platform or genre entry persisted in the local catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntity {
    /// Primary key of the entry.
    pub id: Uuid,
    /// Display name; unique within its collection.
    pub name: String,
    /// Optional short label (e.g. "SNES", "RPG").
    pub abbreviation: Option<String>,
}

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, TaxonomyEntity},
    dto::{format_system_time, validation::validate_not_blank},
};

/// Payload of `POST /games` and `PUT /games/{id}`.
///
/// On update every field is overwritten: omitted lists become empty and omitted
/// optionals are cleared.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct GameInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url)]
    pub cover_url: Option<String>,
    pub platforms: Vec<String>,
    pub screenshots: Vec<String>,
    /// Platforms on which a copy is owned; merged into an existing game with the same title.
    pub owned_platforms: Vec<String>,
    pub genres: Vec<String>,
}

/// Stored game as returned to clients.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub platforms: Vec<String>,
    pub screenshots: Vec<String>,
    pub owned_platforms: Vec<String>,
    pub genres: Vec<String>,
    /// RFC 3339 timestamp of the first insert.
    pub created_date: String,
    /// RFC 3339 timestamp of the last update or merge; absent until then.
    pub modified_date: Option<String>,
}

impl From<GameEntity> for GameSummary {
    fn from(game: GameEntity) -> Self {
        let fields = game.fields;
        Self {
            id: game.id,
            title: fields.title,
            description: fields.description,
            cover_url: fields.cover_url,
            platforms: fields.platforms,
            screenshots: fields.screenshots,
            owned_platforms: fields.owned_platforms,
            genres: fields.genres,
            created_date: format_system_time(game.created_at),
            modified_date: game.modified_at.map(format_system_time),
        }
    }
}

/// What `POST /games` did with the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MergeOutcome {
    /// No game had this title; a new document was inserted.
    Created,
    /// The title existed and new owned platforms were appended.
    Merged,
    /// The title existed and already owned every submitted platform.
    Unchanged,
}

/// Response envelope of `POST /games`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameResponse {
    /// Identifier of the created or merged game.
    pub id: Uuid,
    pub outcome: MergeOutcome,
    /// Owned platforms written by this call.
    pub added_platforms: Vec<String>,
    pub message: String,
}

impl CreateGameResponse {
    pub fn new(id: Uuid, title: &str, outcome: MergeOutcome, added_platforms: Vec<String>) -> Self {
        let message = match outcome {
            MergeOutcome::Created => format!("game `{title}` created"),
            MergeOutcome::Merged => format!(
                "game `{title}` already exists; added owned platforms: {}",
                added_platforms.join(", ")
            ),
            MergeOutcome::Unchanged => {
                format!("game `{title}` already exists; owned platforms unchanged")
            }
        };
        Self {
            id,
            outcome,
            added_platforms,
            message,
        }
    }
}

/// Payload for creating or overwriting a platform or genre.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct TaxonomyInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    /// Short label such as "SNES" or "RPG".
    pub abbreviation: Option<String>,
}

/// Platform or genre as returned to clients.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct TaxonomySummary {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: Option<String>,
}

impl From<TaxonomyEntity> for TaxonomySummary {
    fn from(entry: TaxonomyEntity) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            abbreviation: entry.abbreviation,
        }
    }
}

/// Generic confirmation envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use serde_json::json;

    use super::*;
    use crate::dao::models::GameFields;

    #[test]
    fn game_input_defaults_missing_fields() {
        let input: GameInput =
            serde_json::from_value(json!({ "title": "Chrono Trigger", "ownedPlatforms": ["SNES"] }))
                .unwrap();
        assert_eq!(input.owned_platforms, vec!["SNES"]);
        assert!(input.platforms.is_empty());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn blank_title_and_bad_cover_url_fail_validation() {
        let input = GameInput {
            title: "   ".into(),
            cover_url: Some("not a url".into()),
            ..GameInput::default()
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("cover_url"));
    }

    #[test]
    fn summary_omits_modified_date_until_set() {
        let created = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let game = GameEntity::new(
            GameFields {
                title: "Chrono Trigger".into(),
                ..GameFields::default()
            },
            created,
        );

        let value = serde_json::to_value(GameSummary::from(game)).unwrap();
        assert_eq!(value["createdDate"], "2023-11-14T22:13:20Z");
        assert!(value.get("modifiedDate").is_none());
        assert!(value.get("description").is_none());
        assert_eq!(value["ownedPlatforms"], json!([]));
    }
}

use mongodb::bson::{self, DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{GameEntity, GameFields, TaxonomyEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover_url: Option<String>,
    #[serde(default)]
    platforms: Vec<String>,
    #[serde(default)]
    screenshots: Vec<String>,
    #[serde(default)]
    owned_platforms: Vec<String>,
    #[serde(default)]
    genres: Vec<String>,
    created_date: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified_date: Option<DateTime>,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        let GameFields {
            title,
            description,
            cover_url,
            platforms,
            screenshots,
            owned_platforms,
            genres,
        } = value.fields;
        Self {
            id: bson_uuid(value.id),
            title,
            description,
            cover_url,
            platforms,
            screenshots,
            owned_platforms,
            genres,
            created_date: DateTime::from_system_time(value.created_at),
            modified_date: value.modified_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: Uuid::from_bytes(value.id.bytes()),
            fields: GameFields {
                title: value.title,
                description: value.description,
                cover_url: value.cover_url,
                platforms: value.platforms,
                screenshots: value.screenshots,
                owned_platforms: value.owned_platforms,
                genres: value.genres,
            },
            created_at: value.created_date.to_system_time(),
            modified_at: value.modified_date.map(DateTime::to_system_time),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTaxonomyDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    abbreviation: Option<String>,
}

impl From<TaxonomyEntity> for MongoTaxonomyDocument {
    fn from(value: TaxonomyEntity) -> Self {
        Self {
            id: bson_uuid(value.id),
            name: value.name,
            abbreviation: value.abbreviation,
        }
    }
}

impl From<MongoTaxonomyDocument> for TaxonomyEntity {
    fn from(value: MongoTaxonomyDocument) -> Self {
        Self {
            id: Uuid::from_bytes(value.id.bytes()),
            name: value.name,
            abbreviation: value.abbreviation,
        }
    }
}

/// `$set` payload overwriting every editable game field.
pub fn game_fields_update(fields: GameFields, modified_at: DateTime) -> Document {
    doc! {
        "$set": {
            "title": fields.title,
            "description": fields.description,
            "coverUrl": fields.cover_url,
            "platforms": fields.platforms,
            "screenshots": fields.screenshots,
            "ownedPlatforms": fields.owned_platforms,
            "genres": fields.genres,
            "modifiedDate": modified_at,
        }
    }
}

/// `$addToSet` payload appending platforms without duplicating existing ones.
pub fn owned_platforms_update(platforms: Vec<String>, modified_at: DateTime) -> Document {
    doc! {
        "$addToSet": { "ownedPlatforms": { "$each": platforms } },
        "$set": { "modifiedDate": modified_at },
    }
}

fn bson_uuid(id: Uuid) -> bson::Uuid {
    bson::Uuid::from_bytes(id.into_bytes())
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": bson_uuid(id)}
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    #[test]
    fn game_document_uses_camel_case_fields() {
        let entity = GameEntity::new(
            GameFields {
                title: "Chrono Trigger".into(),
                cover_url: Some("https://example.com/cover.jpg".into()),
                owned_platforms: vec!["SNES".into()],
                ..GameFields::default()
            },
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        );

        let document = bson::serialize_to_document(&MongoGameDocument::from(entity)).unwrap();
        assert!(document.contains_key("_id"));
        assert!(document.contains_key("coverUrl"));
        assert!(document.contains_key("ownedPlatforms"));
        assert!(document.contains_key("createdDate"));
        assert!(!document.contains_key("modifiedDate"));
        assert!(!document.contains_key("description"));
    }

    #[test]
    fn game_document_round_trips_identifier_and_timestamps() {
        let created_at = SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        let mut entity = GameEntity::new(
            GameFields {
                title: "Metroid".into(),
                ..GameFields::default()
            },
            created_at,
        );
        entity.modified_at = Some(created_at + Duration::from_secs(60));

        let restored: GameEntity = MongoGameDocument::from(entity.clone()).into();
        assert_eq!(restored, entity);
    }

    #[test]
    fn owned_platforms_update_adds_each_entry() {
        let update = owned_platforms_update(vec!["DS".into()], DateTime::now());
        let add_to_set = update.get_document("$addToSet").unwrap();
        let each = add_to_set
            .get_document("ownedPlatforms")
            .unwrap()
            .get_array("$each")
            .unwrap();
        assert_eq!(each.len(), 1);
        assert!(update.get_document("$set").unwrap().contains_key("modifiedDate"));
    }
}

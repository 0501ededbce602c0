//! Provider-neutral records returned by every [`MetadataProvider`](super::MetadataProvider).

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

/// One hit of a title search.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSearchResult {
    /// Identifier of the game on the provider side.
    pub id: u64,
    pub title: String,
    /// Full-size cover art.
    pub cover_url: Option<String>,
    /// Small variant of the cover for result lists.
    pub thumbnail_url: Option<String>,
}

/// Full game record as exposed by a provider.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderGame {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub platforms: Vec<ProviderPlatform>,
    /// Screenshot URLs.
    pub screenshots: Vec<String>,
    pub genres: Vec<ProviderGenre>,
}

/// Platform as named by a provider.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPlatform {
    pub id: u64,
    pub name: String,
    pub abbreviation: Option<String>,
    /// First release date on this platform, as reported upstream.
    pub release_date: Option<String>,
}

/// Genre as named by a provider.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderGenre {
    pub id: u64,
    pub name: String,
    /// Genre family (e.g. "Gameplay", "Perspective") when the provider groups them.
    pub category: Option<String>,
}

/// Cover or screenshot image.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    /// Absolute URL of the full-size image.
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub caption: Option<String>,
}

/// Series, collection or thematic group of games.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderGroup {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
}

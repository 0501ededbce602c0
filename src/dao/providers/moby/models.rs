//! Raw MobyGames payloads and their mapping onto the provider-neutral records.

use serde::Deserialize;

use crate::dao::providers::models::{
    GameSearchResult, ImageAsset, ProviderGame, ProviderGenre, ProviderGroup, ProviderPlatform,
};

#[derive(Debug, Deserialize)]
pub struct GamesEnvelope {
    #[serde(default)]
    pub games: Vec<MobyGame>,
}

#[derive(Debug, Deserialize)]
pub struct GenresEnvelope {
    #[serde(default)]
    pub genres: Vec<MobyGenre>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformsEnvelope {
    #[serde(default)]
    pub platforms: Vec<MobyPlatform>,
}

#[derive(Debug, Deserialize)]
pub struct GroupsEnvelope {
    #[serde(default)]
    pub groups: Vec<MobyGroup>,
}

#[derive(Debug, Deserialize)]
pub struct CoverGroupsEnvelope {
    #[serde(default)]
    pub cover_groups: Vec<MobyCoverGroup>,
}

#[derive(Debug, Deserialize)]
pub struct ScreenshotsEnvelope {
    #[serde(default)]
    pub screenshots: Vec<MobyImage>,
}

#[derive(Debug, Deserialize)]
pub struct MobyGame {
    pub game_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sample_cover: Option<MobyImage>,
    #[serde(default)]
    pub platforms: Vec<MobyGamePlatform>,
    #[serde(default)]
    pub sample_screenshots: Vec<MobyImage>,
    #[serde(default)]
    pub genres: Vec<MobyGenre>,
}

/// Cover or screenshot entry; older payloads name the thumbnail `thumbnail_url`, some carry both.
#[derive(Debug, Deserialize)]
pub struct MobyImage {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Which part of the packaging a cover scan shows ("Front Cover", "Media", ...).
    #[serde(default)]
    pub scan_of: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MobyGamePlatform {
    pub platform_id: u64,
    #[serde(default)]
    pub platform_name: String,
    #[serde(default)]
    pub first_release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MobyPlatform {
    pub platform_id: u64,
    #[serde(default)]
    pub platform_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MobyGenre {
    pub genre_id: u64,
    #[serde(default)]
    pub genre_name: String,
    #[serde(default)]
    pub genre_category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MobyGroup {
    pub group_id: u64,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub group_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MobyCoverGroup {
    #[serde(default)]
    pub covers: Vec<MobyImage>,
}

impl MobyImage {
    /// Normalized asset, or `None` when the entry has no image URL.
    pub fn into_asset(self) -> Option<ImageAsset> {
        Some(ImageAsset {
            url: self.image?,
            thumbnail_url: self.thumbnail_image.or(self.thumbnail_url),
            width: self.width,
            height: self.height,
            caption: self.caption.or(self.scan_of),
        })
    }
}

impl From<MobyGame> for GameSearchResult {
    fn from(game: MobyGame) -> Self {
        let (cover_url, thumbnail_url) = match game.sample_cover {
            Some(cover) => (cover.image, cover.thumbnail_image.or(cover.thumbnail_url)),
            None => (None, None),
        };
        Self {
            id: game.game_id,
            title: game.title,
            cover_url,
            thumbnail_url,
        }
    }
}

impl From<MobyGame> for ProviderGame {
    fn from(game: MobyGame) -> Self {
        let (cover_url, thumbnail_url) = match game.sample_cover {
            Some(cover) => (cover.image, cover.thumbnail_image.or(cover.thumbnail_url)),
            None => (None, None),
        };
        Self {
            id: game.game_id,
            title: game.title,
            description: game.description,
            cover_url,
            thumbnail_url,
            platforms: game.platforms.into_iter().map(Into::into).collect(),
            screenshots: game
                .sample_screenshots
                .into_iter()
                .filter_map(|shot| shot.image)
                .collect(),
            genres: game.genres.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<MobyGamePlatform> for ProviderPlatform {
    fn from(platform: MobyGamePlatform) -> Self {
        Self {
            id: platform.platform_id,
            name: platform.platform_name,
            abbreviation: None,
            release_date: platform.first_release_date,
        }
    }
}

impl From<MobyPlatform> for ProviderPlatform {
    fn from(platform: MobyPlatform) -> Self {
        Self {
            id: platform.platform_id,
            name: platform.platform_name,
            abbreviation: None,
            release_date: None,
        }
    }
}

impl From<MobyGenre> for ProviderGenre {
    fn from(genre: MobyGenre) -> Self {
        Self {
            id: genre.genre_id,
            name: genre.genre_name,
            category: genre.genre_category,
        }
    }
}

impl From<MobyGroup> for ProviderGroup {
    fn from(group: MobyGroup) -> Self {
        Self {
            id: group.group_id,
            name: group.group_name,
            description: group.group_description,
        }
    }
}

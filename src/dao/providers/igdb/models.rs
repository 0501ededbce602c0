//! Raw IGDB payloads and their mapping onto the provider-neutral records.

use serde::Deserialize;

use crate::dao::providers::models::{
    GameSearchResult, ImageAsset, ProviderGame, ProviderGenre, ProviderGroup, ProviderPlatform,
};

const COVER_SIZE: &str = "t_cover_big";
const SCREENSHOT_SIZE: &str = "t_screenshot_big";
const THUMB_SIZE: &str = "t_thumb";

/// Reference that IGDB returns as a bare id unless the query expands it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(u64),
    Object(T),
}

impl<T> Expandable<T> {
    /// The expanded record; an unexpanded id carries no usable data.
    pub fn into_object(self) -> Option<T> {
        match self {
            Expandable::Id(_) => None,
            Expandable::Object(object) => Some(object),
        }
    }
}

fn expanded<T>(items: Vec<Expandable<T>>) -> impl Iterator<Item = T> {
    items.into_iter().filter_map(Expandable::into_object)
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgdbGame {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub cover: Option<Expandable<IgdbImage>>,
    #[serde(default)]
    pub platforms: Vec<Expandable<IgdbPlatform>>,
    #[serde(default)]
    pub genres: Vec<Expandable<IgdbGenre>>,
    #[serde(default)]
    pub screenshots: Vec<Expandable<IgdbImage>>,
}

/// Cover or screenshot row.
#[derive(Debug, Clone, Deserialize)]
pub struct IgdbImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgdbPlatform {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgdbGenre {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgdbCollection {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Turn a protocol-relative IGDB image URL into an absolute one at the requested size.
pub fn image_url(raw: &str, size: &str) -> String {
    let absolute = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_owned()
    };
    absolute.replacen(&format!("/{THUMB_SIZE}/"), &format!("/{size}/"), 1)
}

impl IgdbImage {
    fn into_asset(self, size: &str) -> Option<ImageAsset> {
        let raw = self.url?;
        Some(ImageAsset {
            url: image_url(&raw, size),
            thumbnail_url: Some(image_url(&raw, THUMB_SIZE)),
            width: self.width,
            height: self.height,
            caption: None,
        })
    }

    pub fn into_cover(self) -> Option<ImageAsset> {
        self.into_asset(COVER_SIZE)
    }

    pub fn into_screenshot(self) -> Option<ImageAsset> {
        self.into_asset(SCREENSHOT_SIZE)
    }
}

fn cover_urls(cover: Option<Expandable<IgdbImage>>) -> (Option<String>, Option<String>) {
    match cover.and_then(Expandable::into_object).and_then(IgdbImage::into_cover) {
        Some(asset) => (Some(asset.url), asset.thumbnail_url),
        None => (None, None),
    }
}

impl From<IgdbGame> for GameSearchResult {
    fn from(game: IgdbGame) -> Self {
        let (cover_url, thumbnail_url) = cover_urls(game.cover);
        Self {
            id: game.id,
            title: game.name,
            cover_url,
            thumbnail_url,
        }
    }
}

impl From<IgdbGame> for ProviderGame {
    fn from(game: IgdbGame) -> Self {
        let (cover_url, thumbnail_url) = cover_urls(game.cover);
        Self {
            id: game.id,
            title: game.name,
            description: game.summary,
            cover_url,
            thumbnail_url,
            platforms: expanded(game.platforms).map(Into::into).collect(),
            screenshots: expanded(game.screenshots)
                .filter_map(IgdbImage::into_screenshot)
                .map(|asset| asset.url)
                .collect(),
            genres: expanded(game.genres).map(Into::into).collect(),
        }
    }
}

impl From<IgdbPlatform> for ProviderPlatform {
    fn from(platform: IgdbPlatform) -> Self {
        Self {
            id: platform.id,
            name: platform.name,
            abbreviation: platform.abbreviation,
            release_date: None,
        }
    }
}

impl From<IgdbGenre> for ProviderGenre {
    fn from(genre: IgdbGenre) -> Self {
        Self {
            id: genre.id,
            name: genre.name,
            category: None,
        }
    }
}

impl From<IgdbCollection> for ProviderGroup {
    fn from(collection: IgdbCollection) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn image_urls_are_absolute_and_resized() {
        assert_eq!(
            image_url("//images.igdb.com/igdb/image/upload/t_thumb/co1wyy.jpg", COVER_SIZE),
            "https://images.igdb.com/igdb/image/upload/t_cover_big/co1wyy.jpg"
        );
        assert_eq!(
            image_url("https://images.igdb.com/igdb/image/upload/t_thumb/sc1.jpg", THUMB_SIZE),
            "https://images.igdb.com/igdb/image/upload/t_thumb/sc1.jpg"
        );
    }

    #[test]
    fn expanded_game_maps_every_section() {
        let raw = json!({
            "id": 1020,
            "name": "Chrono Trigger",
            "summary": "Time travel RPG.",
            "cover": { "id": 1, "url": "//images.igdb.com/igdb/image/upload/t_thumb/co1.jpg" },
            "platforms": [
                { "id": 19, "name": "Super Nintendo Entertainment System", "abbreviation": "SNES" },
                20
            ],
            "genres": [{ "id": 12, "name": "Role-playing (RPG)" }],
            "screenshots": [
                { "id": 5, "url": "//images.igdb.com/igdb/image/upload/t_thumb/sc5.jpg" },
                { "id": 6 }
            ]
        });

        let game: ProviderGame = serde_json::from_value::<IgdbGame>(raw).unwrap().into();

        assert_eq!(game.title, "Chrono Trigger");
        assert_eq!(
            game.cover_url.as_deref(),
            Some("https://images.igdb.com/igdb/image/upload/t_cover_big/co1.jpg")
        );
        assert_eq!(
            game.thumbnail_url.as_deref(),
            Some("https://images.igdb.com/igdb/image/upload/t_thumb/co1.jpg")
        );
        assert_eq!(game.platforms.len(), 1);
        assert_eq!(game.platforms[0].abbreviation.as_deref(), Some("SNES"));
        assert_eq!(game.genres[0].name, "Role-playing (RPG)");
        assert_eq!(
            game.screenshots,
            vec!["https://images.igdb.com/igdb/image/upload/t_screenshot_big/sc5.jpg"]
        );
    }

    #[test]
    fn unexpanded_cover_is_absent() {
        let raw = json!({ "id": 7, "name": "Secret of Mana", "cover": 42 });
        let result: GameSearchResult = serde_json::from_value::<IgdbGame>(raw).unwrap().into();
        assert_eq!(result.cover_url, None);
        assert_eq!(result.thumbnail_url, None);
    }
}

//! Data models for Arcade Shelf

use serde::{Deserialize, Serialize};

/// UI Tab selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Games,
    Favorites,
    Player,
    Console,
}

/// One playable catalog entry. Read-only for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Address loaded into the playback surface
    #[serde(rename = "iframeUrl", alias = "contentUrl")]
    pub content_url: String,
    #[serde(rename = "thumbnail", alias = "thumbnailUrl", default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub play_count: u64,
    #[serde(rename = "controls", default)]
    pub controls_hints: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "relatedGameIds", default)]
    pub related_ids: Vec<String>,
}

/// Catalog category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub is_top_level: bool,
}

/// Favorite item (persisted to JSON)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FavoriteItem {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(alias = "thumbnail")]
    pub thumbnail_url: String,
    pub category: String,
    pub rating: f32,
    /// RFC 3339 timestamp
    pub added_at: String,
}

impl FavoriteItem {
    pub fn from_descriptor(descriptor: &ContentDescriptor, added_at: String) -> Self {
        Self {
            id: descriptor.id.clone(),
            slug: descriptor.slug.clone(),
            title: descriptor.title.clone(),
            thumbnail_url: descriptor.thumbnail_url.clone(),
            category: descriptor.category.clone(),
            rating: descriptor.rating,
            added_at,
        }
    }
}

/// "1.2M", "12.3K" or the raw count below one thousand
pub fn format_play_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

pub fn format_rating(rating: f32) -> String {
    format!("{:.1}", rating)
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

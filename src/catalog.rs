//! Game catalog loading and lookup
//!
//! The catalog is static for the lifetime of the app. It is read once from the
//! bundled copy, a local file or a URL, and every list it hands out is sorted
//! by priority: hot and new games first, then by play count.

use flate2::read::GzDecoder;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::CatalogError;
use crate::models::{Category, ContentDescriptor};

const BUNDLED_CATALOG: &str = include_str!("../assets/catalog.json");

/// Extensions that mark a path as a document rather than a game slug
const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "xml", "json", "pdf", "doc", "docx", "html", "css", "js"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    games: Vec<ContentDescriptor>,
    #[serde(default)]
    hot_games: Vec<String>,
    #[serde(default)]
    new_games: Vec<String>,
}

/// Where the catalog comes from
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    Bundled,
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    /// URL wins over a local path; neither means the bundled catalog
    pub fn from_config(config: &AppConfig) -> Self {
        if !config.catalog_url.trim().is_empty() {
            CatalogSource::Url(config.catalog_url.trim().to_string())
        } else if !config.catalog_path.trim().is_empty() {
            CatalogSource::File(PathBuf::from(config.catalog_path.trim()))
        } else {
            CatalogSource::Bundled
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CatalogSource::Bundled => "bundled catalog".to_string(),
            CatalogSource::File(path) => path.display().to_string(),
            CatalogSource::Url(url) => url.clone(),
        }
    }

    /// Blocking; run URL sources off the UI thread
    pub fn load(&self, user_agent: &str) -> Result<Catalog, CatalogError> {
        match self {
            CatalogSource::Bundled => Catalog::bundled(),
            CatalogSource::File(path) => Catalog::from_file(path),
            CatalogSource::Url(url) => Catalog::download(url, user_agent),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    games: Vec<ContentDescriptor>,
    hot: HashSet<String>,
    new: HashSet<String>,
}

impl Catalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_bytes(BUNDLED_CATALOG.as_bytes())
    }

    /// Parse catalog JSON, transparently inflating gzip data (1f 8b magic)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CatalogError> {
        let file: CatalogFile = if bytes.starts_with(&[0x1f, 0x8b]) {
            let mut json = Vec::new();
            GzDecoder::new(bytes).read_to_end(&mut json)?;
            serde_json::from_slice(&json)?
        } else {
            serde_json::from_slice(bytes)?
        };

        Ok(Self {
            categories: file.categories,
            games: file.games,
            hot: file.hot_games.into_iter().collect(),
            new: file.new_games.into_iter().collect(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn download(url: &str, user_agent: &str) -> Result<Self, CatalogError> {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(60)))
            .timeout_connect(Some(Duration::from_secs(30)))
            .build()
            .new_agent();

        let mut response = agent
            .get(url)
            .header("User-Agent", user_agent)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => CatalogError::Http(code),
                other => CatalogError::Download(other.to_string()),
            })?;

        if response.status() != 200 {
            return Err(CatalogError::Http(response.status().as_u16()));
        }

        let bytes = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| CatalogError::Download(e.to_string()))?;

        Self::from_bytes(&bytes)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn is_hot(&self, id: &str) -> bool {
        self.hot.contains(id)
    }

    pub fn is_new(&self, id: &str) -> bool {
        self.new.contains(id)
    }

    pub fn all(&self) -> Vec<&ContentDescriptor> {
        self.by_priority(self.games.iter())
    }

    pub fn get_by_id(&self, id: &str) -> Option<&ContentDescriptor> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&ContentDescriptor> {
        self.games.iter().find(|g| g.slug == slug)
    }

    pub fn list_by_category(&self, category_id: &str) -> Vec<&ContentDescriptor> {
        self.by_priority(self.games.iter().filter(|g| g.category == category_id))
    }

    /// Case-insensitive match on title, description and tags
    pub fn search(&self, query: &str) -> Vec<&ContentDescriptor> {
        let term = query.to_lowercase();
        self.by_priority(self.games.iter().filter(|g| {
            g.title.to_lowercase().contains(&term)
                || g.description.to_lowercase().contains(&term)
                || g.tags.iter().any(|t| t.to_lowercase().contains(&term))
        }))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn top_level_categories(&self) -> Vec<&Category> {
        self.categories.iter().filter(|c| c.is_top_level).collect()
    }

    pub fn category_by_id(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Games listed in `id`'s related ids, minus `exclude`
    pub fn related(&self, id: &str, exclude: Option<&str>) -> Vec<&ContentDescriptor> {
        let Some(game) = self.get_by_id(id) else {
            return Vec::new();
        };
        self.by_priority(
            self.games
                .iter()
                .filter(|g| game.related_ids.contains(&g.id) && Some(g.id.as_str()) != exclude),
        )
    }

    /// Related games for the player sidebar, topped up with hot games
    pub fn recommended(&self, id: &str, count: usize) -> Vec<&ContentDescriptor> {
        if self.get_by_id(id).is_none() {
            let mut fallback: Vec<_> = self.games.iter().collect();
            fallback.sort_by(|a, b| a.id.cmp(&b.id));
            fallback.truncate(count);
            return fallback;
        }

        let mut picks = self.related(id, Some(id));
        if picks.len() >= count {
            picks.truncate(count);
            return picks;
        }

        let taken: HashSet<&str> = picks.iter().map(|g| g.id.as_str()).chain(std::iter::once(id)).collect();
        let fill: Vec<_> = self
            .games
            .iter()
            .filter(|g| self.is_hot(&g.id) && !taken.contains(g.id.as_str()))
            .take(count - picks.len())
            .collect();
        picks.extend(fill);
        picks
    }

    fn by_priority<'a>(&self, games: impl Iterator<Item = &'a ContentDescriptor>) -> Vec<&'a ContentDescriptor> {
        let mut games: Vec<_> = games.collect();
        // Stable sort keeps catalog order between equals
        games.sort_by(|a, b| {
            let a_special = self.is_hot(&a.id) || self.is_new(&a.id);
            let b_special = self.is_hot(&b.id) || self.is_new(&b.id);
            b_special.cmp(&a_special).then(b.play_count.cmp(&a.play_count))
        });
        games
    }
}

/// Game slugs are `[a-z0-9-]+` (any case) and never look like a document path
pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() {
        return false;
    }
    if let Some((_, ext)) = slug.rsplit_once('.') {
        if DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            return false;
        }
    }
    slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;

//! Persistent favorites store
//!
//! In-memory state is authoritative. Every mutation is written through to
//! `favorites.json`; a failed write is logged and the app carries on with the
//! in-memory list.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analytics::{Analytics, FavoriteAction};
use crate::error::{ImportError, PersistenceError};
use crate::models::{ContentDescriptor, FavoriteItem};

/// Grouping key for favorites saved without a category
pub const UNCATEGORIZED: &str = "other";

/// Outcome of `import_merge`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub added_count: usize,
    pub total_count: usize,
}

#[derive(Debug)]
pub struct FavoritesStore {
    path: Option<PathBuf>,
    items: Vec<FavoriteItem>,
    analytics: Analytics,
}

impl FavoritesStore {
    /// Load from `path`. A missing file is an empty store; a corrupt one is
    /// removed so it does not fail every later start.
    pub fn open(path: PathBuf, analytics: Analytics) -> Self {
        let items = match read_items(&path) {
            Ok(items) => items,
            Err(e @ PersistenceError::Decode { .. }) => {
                tracing::warn!("{}; starting with no favorites", e);
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!("Could not remove corrupt favorites file: {}", e);
                }
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("{}; starting with no favorites", e);
                Vec::new()
            }
        };
        tracing::info!("Loaded {} favorites from {}", items.len(), path.display());

        Self {
            path: Some(path),
            items,
            analytics,
        }
    }

    /// Store that never touches disk
    pub fn in_memory(analytics: Analytics) -> Self {
        Self {
            path: None,
            items: Vec::new(),
            analytics,
        }
    }

    pub fn items(&self) -> &[FavoriteItem] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.items.iter().any(|f| f.id == id)
    }

    /// Flip membership. Returns whether `descriptor` is a favorite afterwards.
    pub fn toggle(&mut self, descriptor: &ContentDescriptor) -> bool {
        if self.is_favorite(&descriptor.id) {
            self.remove(&descriptor.id);
            false
        } else {
            self.add(descriptor)
        }
    }

    /// Returns false when the id is empty or already present
    pub fn add(&mut self, descriptor: &ContentDescriptor) -> bool {
        if descriptor.id.is_empty() || self.is_favorite(&descriptor.id) {
            return false;
        }
        self.items.push(FavoriteItem::from_descriptor(descriptor, now_iso()));
        self.save();
        self.analytics.notify_favorite(FavoriteAction::Add, &descriptor.title);
        true
    }

    /// Returns false when nothing matched
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(pos) = self.items.iter().position(|f| f.id == id) else {
            return false;
        };
        let removed = self.items.remove(pos);
        self.save();
        self.analytics.notify_favorite(FavoriteAction::Remove, &removed.title);
        true
    }

    pub fn clear_all(&mut self) {
        self.items.clear();
        self.save();
    }

    /// Favorites grouped by category, in insertion order within each group
    pub fn list_by_category(&self) -> BTreeMap<String, Vec<&FavoriteItem>> {
        let mut grouped: BTreeMap<String, Vec<&FavoriteItem>> = BTreeMap::new();
        for item in &self.items {
            let category = if item.category.is_empty() { UNCATEGORIZED } else { item.category.as_str() };
            grouped.entry(category.to_string()).or_default().push(item);
        }
        grouped
    }

    /// Match on title or category. A blank query returns everything.
    pub fn search(&self, query: &str) -> Vec<&FavoriteItem> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|f| f.title.to_lowercase().contains(&term) || f.category.to_lowercase().contains(&term))
            .collect()
    }

    /// Pretty JSON array of every favorite
    pub fn export_all(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(&self.items).map_err(PersistenceError::Encode)
    }

    pub fn export_to(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = self.export_all()?;
        fs::write(path, json).map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Add entries whose id is not present yet. Existing entries are never
    /// overwritten; entries without an id are skipped. Rejected input leaves
    /// the store untouched.
    pub fn import_merge(&mut self, data: &str) -> Result<ImportSummary, ImportError> {
        let value: serde_json::Value = serde_json::from_str(data)?;
        let serde_json::Value::Array(entries) = value else {
            return Err(ImportError::NotAnArray);
        };

        let mut incoming = Vec::new();
        for entry in entries {
            let has_id = entry.get("id").and_then(|id| id.as_str()).is_some_and(|id| !id.is_empty());
            if !has_id {
                continue;
            }
            incoming.push(serde_json::from_value::<FavoriteItem>(entry)?);
        }

        let mut seen: HashSet<String> = self.items.iter().map(|f| f.id.clone()).collect();
        let mut added_count = 0;
        for mut item in incoming {
            if !seen.insert(item.id.clone()) {
                continue;
            }
            if item.added_at.is_empty() {
                item.added_at = now_iso();
            }
            self.items.push(item);
            added_count += 1;
        }

        if added_count > 0 {
            self.save();
        }
        Ok(ImportSummary {
            added_count,
            total_count: self.items.len(),
        })
    }

    pub fn import_from(&mut self, path: &Path) -> Result<ImportSummary, ImportError> {
        let data = fs::read_to_string(path)?;
        self.import_merge(&data)
    }

    fn save(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!("{}; favorites kept in memory only", e);
        }
    }

    fn persist(&self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.items).map_err(PersistenceError::Encode)?;
        fs::write(path, json).map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })
    }
}

fn read_items(path: &Path) -> Result<Vec<FavoriteItem>, PersistenceError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PersistenceError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Suggested name for an export file on `date`
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("favorites-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
#[path = "favorites_tests.rs"]
mod tests;

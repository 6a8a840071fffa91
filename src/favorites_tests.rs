//! Tests for the favorites store

#[cfg(test)]
mod tests {
    use crate::analytics::{Analytics, AnalyticsEvent, AnalyticsSink};
    use crate::error::ImportError;
    use crate::favorites::*;
    use crate::models::ContentDescriptor;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<AnalyticsEvent>>);

    impl AnalyticsSink for Recorder {
        fn record(&self, event: &AnalyticsEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arcade_shelf_fav_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn game(id: &str, title: &str, category: &str) -> ContentDescriptor {
        ContentDescriptor {
            id: id.to_string(),
            slug: id.to_string(),
            title: title.to_string(),
            content_url: format!("https://games.test/{}", id),
            thumbnail_url: format!("https://games.test/{}.webp", id),
            category: category.to_string(),
            rating: 4.2,
            ..Default::default()
        }
    }

    fn store() -> FavoritesStore {
        FavoritesStore::in_memory(Analytics::disabled())
    }

    #[test]
    fn test_toggle_membership() {
        let mut favorites = store();
        let dash = game("dash", "Geometry Dash", "geometry-dash");

        assert!(favorites.toggle(&dash));
        assert!(favorites.is_favorite("dash"));
        assert_eq!(favorites.count(), 1);

        assert!(!favorites.toggle(&dash));
        assert!(!favorites.is_favorite("dash"));
        assert_eq!(favorites.count(), 0);
    }

    #[test]
    fn test_add_copies_descriptor_fields() {
        let mut favorites = store();
        favorites.add(&game("dash", "Geometry Dash", "geometry-dash"));
        let item = &favorites.items()[0];
        assert_eq!(item.slug, "dash");
        assert_eq!(item.thumbnail_url, "https://games.test/dash.webp");
        assert_eq!(item.rating, 4.2);
        assert!(chrono::DateTime::parse_from_rfc3339(&item.added_at).is_ok());
    }

    #[test]
    fn test_add_rejects_duplicates_and_empty_id() {
        let mut favorites = store();
        assert!(favorites.add(&game("dash", "Dash", "")));
        assert!(!favorites.add(&game("dash", "Dash again", "")));
        assert!(!favorites.add(&game("", "No id", "")));
        assert_eq!(favorites.count(), 1);
        assert!(!favorites.remove("missing"));
    }

    #[test]
    fn test_analytics_notified() {
        let recorder = Arc::new(Recorder::default());
        let mut favorites = FavoritesStore::in_memory(Analytics::new(recorder.clone()));
        let dash = game("dash", "Geometry Dash", "");
        favorites.toggle(&dash);
        favorites.toggle(&dash);

        let events = recorder.0.lock().unwrap();
        let names: Vec<_> = events.iter().map(|e| (e.name.as_str(), e.value)).collect();
        assert_eq!(names, vec![("favorite_add", 1), ("favorite_remove", -1)]);
        assert!(events.iter().all(|e| e.label == "Geometry Dash" && e.category == "Engagement"));
    }

    #[test]
    fn test_list_by_category_groups_uncategorized() {
        let mut favorites = store();
        favorites.add(&game("a", "A", "puzzle"));
        favorites.add(&game("b", "B", ""));
        favorites.add(&game("c", "C", "puzzle"));

        let grouped = favorites.list_by_category();
        assert_eq!(grouped.len(), 2);
        let puzzle: Vec<_> = grouped["puzzle"].iter().map(|f| f.id.as_str()).collect();
        assert_eq!(puzzle, vec!["a", "c"]);
        assert_eq!(grouped[UNCATEGORIZED][0].id, "b");
    }

    #[test]
    fn test_search_title_and_category() {
        let mut favorites = store();
        favorites.add(&game("a", "Geometry Dash", "platformer"));
        favorites.add(&game("b", "Block Merge", "puzzle"));

        assert_eq!(favorites.search("  ").len(), 2);
        assert_eq!(favorites.search("DASH")[0].id, "a");
        assert_eq!(favorites.search("puzz")[0].id, "b");
        assert!(favorites.search("zzz").is_empty());
    }

    #[test]
    fn test_clear_all() {
        let mut favorites = store();
        favorites.add(&game("a", "A", ""));
        favorites.clear_all();
        assert_eq!(favorites.count(), 0);
    }

    #[test]
    fn test_import_merge_adds_only_new_ids() {
        let mut favorites = store();
        favorites.add(&game("a", "Original A", "x"));

        let data = r#"[
            { "id": "a", "title": "Imported A" },
            { "id": "b", "title": "B", "addedAt": "2024-01-02T03:04:05.000Z" },
            { "title": "No id" },
            { "id": "", "title": "Empty id" },
            { "id": "c", "title": "C", "thumbnail": "https://t.test/c.png" },
            { "id": "c", "title": "C duplicate" }
        ]"#;
        let summary = favorites.import_merge(data).unwrap();

        assert_eq!(summary, ImportSummary { added_count: 2, total_count: 3 });
        assert_eq!(favorites.items()[0].title, "Original A");
        assert_eq!(favorites.items()[1].added_at, "2024-01-02T03:04:05.000Z");
        assert!(!favorites.items()[2].added_at.is_empty());
        assert_eq!(favorites.items()[2].thumbnail_url, "https://t.test/c.png");
        assert_eq!(favorites.items()[2].title, "C");
    }

    #[test]
    fn test_import_never_shrinks() {
        let mut favorites = store();
        favorites.add(&game("a", "A", ""));
        favorites.add(&game("b", "B", ""));
        let summary = favorites.import_merge("[]").unwrap();
        assert_eq!(summary, ImportSummary { added_count: 0, total_count: 2 });
    }

    #[test]
    fn test_import_rejects_malformed_without_mutation() {
        let mut favorites = store();
        favorites.add(&game("a", "A", ""));

        assert!(matches!(favorites.import_merge("{ broken"), Err(ImportError::Malformed(_))));
        assert!(matches!(favorites.import_merge(r#"{"id": "b"}"#), Err(ImportError::NotAnArray)));
        assert!(matches!(
            favorites.import_merge(r#"[{"id": "b"}, {"id": "c", "rating": "high"}]"#),
            Err(ImportError::Malformed(_))
        ));
        assert_eq!(favorites.count(), 1);
    }

    #[test]
    fn test_export_roundtrips_through_import() {
        let mut source = store();
        source.add(&game("a", "A", "x"));
        source.add(&game("b", "B", "y"));
        let exported = source.export_all().unwrap();

        let mut target = store();
        let summary = target.import_merge(&exported).unwrap();
        assert_eq!(summary.added_count, 2);
        assert_eq!(target.items(), source.items());
    }

    #[test]
    fn test_persists_between_opens() {
        let dir = scratch_dir("persist");
        let path = dir.join("favorites.json");

        let mut first = FavoritesStore::open(path.clone(), Analytics::disabled());
        first.add(&game("a", "A", "x"));
        first.add(&game("b", "B", "y"));
        first.remove("a");

        let second = FavoritesStore::open(path, Analytics::disabled());
        assert_eq!(second.count(), 1);
        assert!(second.is_favorite("b"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_starts_empty_and_is_removed() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("favorites.json");
        std::fs::write(&path, "not json at all").unwrap();

        let favorites = FavoritesStore::open(path.clone(), Analytics::disabled());
        assert_eq!(favorites.count(), 0);
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let dir = scratch_dir("unwritable");
        // A directory where the file should be makes every write fail
        let path = dir.join("favorites.json");
        std::fs::create_dir_all(&path).unwrap();

        let mut favorites = FavoritesStore::open(path, Analytics::disabled());
        assert!(favorites.add(&game("a", "A", "")));
        assert!(favorites.is_favorite("a"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_and_import_files() {
        let dir = scratch_dir("files");
        let file = dir.join(export_file_name(chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()));
        assert!(file.ends_with("favorites-2024-03-09.json"));

        let mut source = store();
        source.add(&game("a", "A", ""));
        source.export_to(&file).unwrap();

        let mut target = store();
        assert_eq!(target.import_from(&file).unwrap().added_count, 1);
        assert!(matches!(target.import_from(&dir.join("missing.json")), Err(ImportError::Read(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}

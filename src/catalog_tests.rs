//! Tests for catalog loading and lookup

#[cfg(test)]
mod tests {
    use crate::catalog::*;
    use crate::config::AppConfig;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"{
        "categories": [
            { "id": "action", "slug": "action", "name": "Action", "isTopLevel": true },
            { "id": "misc", "slug": "misc-games", "name": "Misc", "isTopLevel": false }
        ],
        "games": [
            { "id": "a", "slug": "alpha", "title": "Alpha Run", "description": "Run fast",
              "iframeUrl": "https://x.test/a", "category": "action", "playCount": 10,
              "tags": ["speed"], "relatedGameIds": ["b", "c", "d"] },
            { "id": "b", "slug": "bravo", "title": "Bravo Blocks", "description": "Stack things",
              "iframeUrl": "https://x.test/b", "category": "misc", "playCount": 500 },
            { "id": "c", "slug": "charlie", "title": "Charlie", "description": "A speedy puzzle",
              "iframeUrl": "https://x.test/c", "category": "action", "playCount": 200 },
            { "id": "d", "slug": "delta", "title": "Delta", "description": "Quiet",
              "iframeUrl": "https://x.test/d", "category": "action", "playCount": 5,
              "tags": ["Relaxing"] }
        ],
        "hotGames": ["d"],
        "newGames": []
    }"#;

    fn sample() -> Catalog {
        Catalog::from_bytes(SAMPLE.as_bytes()).unwrap()
    }

    fn ids(games: &[&crate::models::ContentDescriptor]) -> Vec<String> {
        games.iter().map(|g| g.id.clone()).collect()
    }

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.is_empty());
        for game in catalog.all() {
            assert!(is_valid_slug(&game.slug), "bad slug {}", game.slug);
            assert!(!game.content_url.is_empty());
        }
    }

    #[test]
    fn test_camel_case_fields() {
        let catalog = sample();
        let alpha = catalog.get_by_id("a").unwrap();
        assert_eq!(alpha.content_url, "https://x.test/a");
        assert_eq!(alpha.play_count, 10);
        assert_eq!(alpha.related_ids, vec!["b", "c", "d"]);
        assert_eq!(catalog.get_by_slug("bravo").unwrap().id, "b");
        assert!(catalog.get_by_slug("missing").is_none());
    }

    #[test]
    fn test_priority_order() {
        // Hot first, then play count descending
        assert_eq!(ids(&sample().all()), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_list_by_category() {
        assert_eq!(ids(&sample().list_by_category("action")), vec!["d", "c", "a"]);
        assert!(sample().list_by_category("none").is_empty());
    }

    #[test]
    fn test_search_title_description_tags() {
        let catalog = sample();
        assert_eq!(ids(&catalog.search("SPEED")), vec!["c", "a"]);
        assert_eq!(ids(&catalog.search("relax")), vec!["d"]);
        assert_eq!(ids(&catalog.search("blocks")), vec!["b"]);
        assert_eq!(catalog.search("").len(), 4);
    }

    #[test]
    fn test_categories() {
        let catalog = sample();
        assert_eq!(catalog.categories().len(), 2);
        assert_eq!(catalog.top_level_categories().len(), 1);
        assert_eq!(catalog.category_by_slug("misc-games").unwrap().id, "misc");
        assert_eq!(catalog.category_by_id("action").unwrap().name, "Action");
    }

    #[test]
    fn test_related_excludes_and_sorts() {
        let catalog = sample();
        assert_eq!(ids(&catalog.related("a", None)), vec!["d", "b", "c"]);
        assert_eq!(ids(&catalog.related("a", Some("b"))), vec!["d", "c"]);
        assert!(catalog.related("missing", None).is_empty());
    }

    #[test]
    fn test_recommended_tops_up_with_hot() {
        let catalog = sample();
        assert_eq!(ids(&catalog.recommended("c", 3)), vec!["d"]);
        assert_eq!(ids(&catalog.recommended("a", 2)), vec!["d", "b"]);
        assert_eq!(ids(&catalog.recommended("missing", 2)), vec!["a", "b"]);
    }

    #[test]
    fn test_gzip_detected() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let catalog = Catalog::from_bytes(&compressed).unwrap();
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Catalog::from_bytes(b"{ not json").unwrap_err();
        assert!(matches!(err, crate::error::CatalogError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Catalog::from_file(&PathBuf::from("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, crate::error::CatalogError::Io(_)));
    }

    #[test]
    fn test_source_from_config() {
        let mut config = AppConfig::default();
        assert_eq!(CatalogSource::from_config(&config), CatalogSource::Bundled);

        config.catalog_path = "/tmp/games.json".to_string();
        assert_eq!(CatalogSource::from_config(&config), CatalogSource::File(PathBuf::from("/tmp/games.json")));

        config.catalog_url = " https://cdn.test/games.json.gz ".to_string();
        assert_eq!(
            CatalogSource::from_config(&config),
            CatalogSource::Url("https://cdn.test/games.json.gz".to_string())
        );
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("geometry-dash-lite"));
        assert!(is_valid_slug("Level-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("robots.txt"));
        assert!(!is_valid_slug("sitemap.XML"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("under_score"));
    }
}

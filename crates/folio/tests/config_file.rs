use folio::config::ConfigError;
use folio::{FolioConfig, PaginationStrategy};
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "client:\n  base_url: https://diary.test/api\n  max_retries: 1\n  base_delay_ms: 250\nengine:\n  page_size: 10\n  sort_by: title\n  debounce_ms: 80"
    )
    .unwrap();

    let config = FolioConfig::load_from_file(file.path()).unwrap();

    // FOLIO_BASE_URL may be set in the environment running the tests
    if std::env::var("FOLIO_BASE_URL").is_err() {
        assert_eq!(config.client.base_url, "https://diary.test/api");
    }
    assert_eq!(
        config.client.retry_policy().base_delay,
        std::time::Duration::from_millis(250)
    );
    assert_eq!(
        config.engine.page_strategy(Some("datePublished")),
        PaginationStrategy::page(10, Some("title"))
    );
    assert_eq!(
        config.engine.scroll_options().debounce,
        std::time::Duration::from_millis(80)
    );
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = FolioConfig::load_from_file(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_invalid_file_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "engine:\n  page_size: 0").unwrap();

    let err = FolioConfig::load_from_file(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid(_)));
}

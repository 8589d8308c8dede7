use bookkeep_config::{Config, ConfigError, ConfigManager, NegativeDisplay};
use tempfile::tempdir;

#[test]
fn default_config_has_sensible_values() {
    let cfg = Config::default();

    assert_eq!(cfg.currency, "USD");
    assert!(!cfg.locale.is_empty());
    assert_eq!(cfg.negative_style, NegativeDisplay::Sign);
    assert_eq!(cfg.backup_retention, 5);
    assert_eq!(cfg.currency_symbol(), None);
    assert!(cfg.resolve_default_book_root().ends_with("Bookkeep"));
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().join("cfg")).expect("manager");

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded, Config::default());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("settings.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.currency = "EUR".to_string();
    cfg.show_currency_symbol = true;
    cfg.negative_style = NegativeDisplay::Parentheses;
    cfg.last_opened_book = Some("household".into());

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(loaded.currency_symbol(), Some("€"));
    assert!(!dir.path().join("settings.json.tmp").exists());
}

#[test]
fn older_files_without_new_fields_still_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "locale": "en-GB", "currency": "GBP" }"#).expect("write");
    let manager = ConfigManager::new(path, dir.path().join("backups"));

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded.locale, "en-GB");
    assert!(loaded.ui_color_enabled);
    assert_eq!(loaded.backup_retention, 5);
}

#[test]
fn backups_restore_and_prune() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.locale = "fr-FR".into();
    let name = manager.backup(&cfg, Some("Before Trip")).expect("backup");
    assert!(name.starts_with("settings_"));
    assert!(name.ends_with("_before-trip.json"));

    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.locale, "fr-FR");

    assert!(matches!(
        manager.restore("settings_missing.json"),
        Err(ConfigError::BackupNotFound(_))
    ));

    manager.backup(&cfg, Some("second")).expect("backup");
    assert_eq!(manager.list_backups().expect("list").len(), 2);
    assert_eq!(manager.prune_backups(1).expect("prune"), 1);
    assert_eq!(manager.list_backups().expect("list").len(), 1);
}

#[test]
fn locale_picks_number_separators() {
    let mut cfg = Config::default();
    assert_eq!(cfg.number_separators(), (',', '.'));
    cfg.locale = "fr-FR".into();
    assert_eq!(cfg.number_separators(), (' ', ','));
    cfg.locale = "de_DE".into();
    assert_eq!(cfg.number_separators(), ('.', ','));
    cfg.locale = "en-GB".into();
    assert_eq!(cfg.number_separators(), (',', '.'));
}

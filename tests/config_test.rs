//! Integration tests for layered settings loading.
//!
//! Layers: defaults → global file → local file → env vars, each replacing
//! only the fields it sets. Files live in temp directories, so the real
//! global config is never touched.

use std::fs;

use tempfile::TempDir;

use storytree::application::ApplicationError;
use storytree::config::Settings;
use storytree::domain::DomainError;

// ============================================================
// File layering
// ============================================================

#[test]
fn given_no_files_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();
    let missing_global = dir.path().join("storytree.toml");

    let settings = Settings::load_from(Some(&missing_global), None).expect("load settings");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_global_and_local_when_load_then_local_wins_per_field() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("global.toml");
    let local = dir.path().join("local.toml");
    fs::write(
        &global,
        r#"
[layout]
node_size = 2.0
sibling_distance = 0.5

[screen]
cell_width = 10.0
"#,
    )
    .unwrap();
    fs::write(
        &local,
        r#"
[layout]
sibling_distance = 1.0
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_from(Some(&global), Some(&local)).expect("load settings");

    // Assert: global values survive where local is silent
    assert_eq!(settings.layout.node_size, 2.0);
    assert_eq!(settings.layout.sibling_distance, 1.0);
    assert_eq!(settings.layout.tree_distance, 0.0);
    assert_eq!(settings.screen.cell_width, 10.0);
    assert_eq!(settings.screen.cell_height, 30.0);
}

// ============================================================
// Errors
// ============================================================

#[test]
fn given_missing_local_file_when_load_then_io_error() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("absent.toml");

    let result = Settings::load_from(None, Some(&local));

    assert!(
        matches!(result, Err(ApplicationError::Io { .. })),
        "an explicitly requested config file must exist: {result:?}"
    );
}

#[test]
fn given_unknown_section_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("local.toml");
    fs::write(&local, "[layuot]\nnode_size = 2.0\n").unwrap();

    let result = Settings::load_from(None, Some(&local));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_non_positive_node_size_when_load_then_invalid_config() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("local.toml");
    fs::write(&local, "[layout]\nnode_size = 0.0\n").unwrap();

    let result = Settings::load_from(None, Some(&local));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidConfig(_)))
    ));
}

#[test]
fn given_negative_distance_when_load_then_invalid_config() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("local.toml");
    fs::write(&local, "[layout]\ntree_distance = -1.0\n").unwrap();

    let result = Settings::load_from(None, Some(&local));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidConfig(_)))
    ));
}

// ============================================================
// Template
// ============================================================

#[test]
fn given_template_written_to_disk_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("storytree.toml");
    fs::write(&local, Settings::template()).unwrap();

    let settings = Settings::load_from(None, Some(&local)).expect("load template");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_effective_settings_when_dumped_then_reload_identically() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("local.toml");
    fs::write(&local, "[screen]\nflip_y = false\nmargin_x = 0.0\n").unwrap();
    let settings = Settings::load_from(None, Some(&local)).unwrap();

    let dumped = dir.path().join("dumped.toml");
    fs::write(&dumped, settings.to_toml().unwrap()).unwrap();
    let reloaded = Settings::load_from(None, Some(&dumped)).unwrap();

    assert_eq!(reloaded, settings);
    assert!(!reloaded.screen.flip_y);
}

//! Integration tests for the layered configuration

use crate::integration::{with_env_vars, with_xdg_env};
use paper_router::config::{global_config_path, ConfigLoader, PaperConfig};
use paper_router::entity::EntityClass;
use paper_router::error::ConfigError;
use paper_router::types::{ItemSpec, ListRef};
use paper_router::Connection;
use tempfile::TempDir;

fn write_global(test_dir: &TempDir, contents: &str) {
    let dir = test_dir.path().join("paper");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

fn write_workspace(workspace: &TempDir, name: &str, contents: &str) {
    let dir = workspace.path().join("config");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_global_config_path_uses_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        assert_eq!(
            global_config_path().unwrap(),
            test_dir.path().join("paper").join("config.toml")
        );
    });
}

#[test]
fn test_workspace_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_global(
        &test_dir,
        "[router.default_from_list]\ntype = \"latest\"\nid = \"page\"\npage = 1\n\n[logging]\nlevel = \"info\"\n",
    );
    write_workspace(&workspace, "config.toml", "[logging]\nlevel = \"debug\"\n");

    let config = with_xdg_env(&test_dir, || ConfigLoader::load(workspace.path()).unwrap());
    assert_eq!(config.router.default_from_list, ListRef::new("latest", "page", 1));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_workspace(
        &workspace,
        "config.toml",
        "[router.default_from_list]\ntype = \"latest\"\nid = \"page\"\npage = 1\n",
    );

    let config = with_env_vars(
        &test_dir,
        &[("PAPER__ROUTER__DEFAULT_FROM_LIST__ID", "movie")],
        || ConfigLoader::load(workspace.path()).unwrap(),
    );
    assert_eq!(config.router.default_from_list, ListRef::new("latest", "movie", 1));
}

#[test]
fn test_env_specific_workspace_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_workspace(&workspace, "config.toml", "[logging]\nformat = \"text\"\n");
    write_workspace(&workspace, "staging.toml", "[logging]\nformat = \"json\"\n");

    let config = with_env_vars(&test_dir, &[("PAPER_ENV", "staging")], || {
        ConfigLoader::load(workspace.path()).unwrap()
    });
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_invalid_workspace_config_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_workspace(
        &workspace,
        "config.toml",
        "[router.default_from_list]\ntype = \"\"\nid = \"post\"\npage = 1\n",
    );
    let err = with_xdg_env(&test_dir, || ConfigLoader::load(workspace.path()).unwrap_err());
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("Router")));
}

#[test]
fn test_loaded_config_drives_connection() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_workspace(
        &workspace,
        "config.toml",
        "[router.default_from_list]\ntype = \"latest\"\nid = \"movie\"\npage = 1\n\n[entities.type_relations]\nmovie = \"single\"\ngenre = \"taxonomy\"\n",
    );
    let config: PaperConfig =
        with_xdg_env(&test_dir, || ConfigLoader::load(workspace.path()).unwrap());
    assert_eq!(
        config.entities.type_relations.get("genre"),
        Some(&EntityClass::Taxonomy)
    );

    let mut connection = Connection::from_config(&config);
    connection
        .route_change_succeeded(&ItemSpec::single("movie", 3), None, None)
        .unwrap();
    assert_eq!(
        connection.selected_item().unwrap().from_list(),
        Some(&ListRef::new("latest", "movie", 1))
    );
}

//! Environment layer of Settings loading.
//!
//! Kept in its own test binary: it mutates the process environment.

use std::fs;

use tempfile::TempDir;

use bintree::config::{local_config_path, Settings};
use bintree::domain::ParseMode;

#[test]
fn given_env_vars_when_load_then_override_local_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "[parse]\nmode = \"hardened\"\nmax_depth = 10\n",
    )
    .unwrap();

    std::env::set_var("BINTREE_PARSE__MODE", "reference");
    std::env::set_var("BINTREE_GRAPH__FORMAT", "svg");
    std::env::set_var("BINTREE_LOG_FILE", "$HOME/bintree-log.html");

    let settings = Settings::load(Some(dir.path()));

    std::env::remove_var("BINTREE_PARSE__MODE");
    std::env::remove_var("BINTREE_GRAPH__FORMAT");
    std::env::remove_var("BINTREE_LOG_FILE");

    let settings = settings.expect("load settings");
    assert_eq!(settings.parse.mode, ParseMode::Reference);
    assert_eq!(settings.parse.max_depth, 10);
    assert_eq!(settings.graph.format, "svg");

    let home = std::env::var("HOME").expect("HOME should be set");
    assert!(settings.log_file.starts_with(&home));
    assert!(settings.log_file.ends_with("bintree-log.html"));
}

//! Tests for layered configuration loading.

use super::*;
use crate::{DifficultyPolicy, PlanLimits};
use cardsmith_protocol::Plan;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Options that ignore the machine's real system and user config.
fn isolated_options(cwd: &Path) -> LayeredConfigOptions {
    let mut options = LayeredConfigOptions::new(cwd);
    options.system_config_path = None;
    options.user_config_path = None;
    options
}

#[test]
fn parse_minimal_config() {
    let config = CardsmithConfig::load_from_str("{}").expect("config");
    assert_eq!(config.generation.max_cards_per_request, 20);
    assert_eq!(config.generation.difficulty_policy, DifficultyPolicy::Relabel);
    assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.server.user_header, "x-user-id");
    assert_eq!(config.billing.plans.limits(Plan::Free).max_cards_per_request, 10);
}

#[test]
fn parses_json5_with_comments_and_plans() {
    let json5 = r#"{
        // cheaper model for development
        provider: { model: "gpt-4.1-nano", max_retries: 0 },
        generation: { difficulty_policy: "constrain", default_confidence: 0.75 },
        billing: {
            plans: { pro: { max_cards_per_request: 30, price_cents: 500 } },
            subscribers: { "user-7": "pro" },
        },
    }"#;
    let config = CardsmithConfig::load_from_str(json5).expect("config");
    assert_eq!(config.provider.model, "gpt-4.1-nano");
    assert_eq!(config.provider.max_retries, 0);
    assert_eq!(
        config.generation.difficulty_policy,
        DifficultyPolicy::Constrain
    );
    assert_eq!(
        config.billing.plans.pro,
        PlanLimits {
            max_cards_per_request: 30,
            price_cents: 500
        }
    );
    assert_eq!(config.billing.subscribers.get("user-7"), Some(&Plan::Pro));
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = CardsmithConfig::load_from_str("{ unexpected: true }").unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

#[test]
fn rejects_unknown_difficulty_policy() {
    let json5 = r#"{ generation: { difficulty_policy: "shuffle" } }"#;
    let err = CardsmithConfig::load_from_str(json5).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("generation.difficulty_policy"));
}

#[test]
fn rejects_negative_limits() {
    let json5 = r#"{ generation: { max_cards_per_request: -1 } }"#;
    let err = CardsmithConfig::load_from_str(json5).unwrap_err();
    assert!(format!("{err}").contains("generation.max_cards_per_request"));
}

#[test]
fn rejects_out_of_range_confidence() {
    let json5 = r#"{ generation: { default_confidence: 1.5 } }"#;
    let err = CardsmithConfig::load_from_str(json5).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn rejects_unknown_subscriber_plan() {
    let json5 = r#"{ billing: { subscribers: { "u1": "platinum" } } }"#;
    let err = CardsmithConfig::load_from_str(json5).unwrap_err();
    assert!(format!("{err}").contains("billing.subscribers.u1"));
}

#[test]
fn layered_config_prefers_cwd_over_project_and_user() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let project_root = root.join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("notes");
    fs::create_dir_all(&cwd).expect("cwd");

    let user_config = root.join("user.json5");
    write_json5(&user_config, r#"{ provider: { model: "user" } }"#);
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ provider: { model: "project", timeout_ms: 5000 } }"#,
    );
    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ provider: { model: "cwd" } }"#,
    );

    let mut options = isolated_options(&cwd);
    options.user_config_path = Some(user_config);

    let layered = CardsmithConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.provider.model, "cwd");
    assert_eq!(layered.config.provider.timeout_ms, 5000);
    let sources: Vec<_> = layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::User,
            ConfigLayerSource::Project,
            ConfigLayerSource::Cwd
        ]
    );
}

#[test]
fn runtime_override_wins() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let system_config = root.join("system.json5");
    write_json5(&system_config, r#"{ server: { bind: "0.0.0.0:80" } }"#);
    let runtime_config = root.join("runtime.json5");
    write_json5(&runtime_config, r#"{ server: { bind: "127.0.0.1:9000" } }"#);

    let mut options = isolated_options(root).with_runtime_path(&runtime_config);
    options.system_config_path = Some(system_config);

    let layered = CardsmithConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.server.bind, "127.0.0.1:9000");
}

#[test]
fn missing_runtime_layer_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let options = isolated_options(temp.path()).with_runtime_path(temp.path().join("nope.json5"));
    let err = CardsmithConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn same_file_is_loaded_once() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    fs::create_dir_all(root.join(".git")).expect("git");
    write_json5(
        &root.join(DEFAULT_CONFIG_FILE),
        r#"{ store: { provider: "memory" } }"#,
    );

    let layered =
        CardsmithConfig::load_layered_with_options(isolated_options(root)).expect("layered");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.config.store.provider, "memory");
}

#[test]
fn builder_replaces_sections() {
    let config = CardsmithConfig::builder()
        .generation(crate::GenerationConfig {
            max_cards_per_request: 3,
            ..crate::GenerationConfig::default()
        })
        .build();
    assert_eq!(config.generation.max_cards_per_request, 3);
    assert_eq!(config.provider.max_retries, 2);
}

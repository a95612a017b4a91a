//! Schema validation for Cardsmith JSON5 configuration.
//!
//! serde alone would silently ignore misspelled keys, so every block is
//! checked against its allowed keys and value kinds before decoding.

use super::SchemaMode;
use crate::ConfigError;
use serde_json::{Map, Value};

const PLAN_NAMES: &[&str] = &["free", "pro"];

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(
    value: &Value,
    _mode: SchemaMode,
    layer: &str,
) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &[
            "$schema",
            "generation",
            "provider",
            "store",
            "server",
            "billing",
        ],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("generation") {
        validate_generation(value, layer, "generation")?;
    }
    if let Some(value) = map.get("provider") {
        validate_provider(value, layer, "provider")?;
    }
    if let Some(value) = map.get("store") {
        validate_store(value, layer, "store")?;
    }
    if let Some(value) = map.get("server") {
        validate_server(value, layer, "server")?;
    }
    if let Some(value) = map.get("billing") {
        validate_billing(value, layer, "billing")?;
    }
    Ok(())
}

fn validate_generation(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "max_cards_per_request",
            "max_notes_chars",
            "default_confidence",
            "difficulty_policy",
            "excerpt_max_chars",
        ],
        layer,
        path,
    )?;

    for key in ["max_cards_per_request", "max_notes_chars", "excerpt_max_chars"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("default_confidence") {
        expect_f64(value, layer, &join_path(path, "default_confidence"))?;
    }
    if let Some(value) = map.get("difficulty_policy") {
        expect_one_of(
            value,
            &["relabel", "constrain"],
            layer,
            &join_path(path, "difficulty_policy"),
        )?;
    }
    Ok(())
}

fn validate_provider(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "kind",
            "model",
            "api_key_env",
            "timeout_ms",
            "max_retries",
            "backoff_ms",
        ],
        layer,
        path,
    )?;

    for key in ["kind", "model", "api_key_env"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["timeout_ms", "max_retries", "backoff_ms"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

fn validate_store(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["provider", "path"], layer, path)?;

    if let Some(value) = map.get("provider") {
        expect_one_of(value, &["file", "memory"], layer, &join_path(path, "provider"))?;
    }
    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    Ok(())
}

fn validate_server(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["bind", "max_body_bytes", "user_header"], layer, path)?;

    if let Some(value) = map.get("bind") {
        expect_string(value, layer, &join_path(path, "bind"))?;
    }
    if let Some(value) = map.get("max_body_bytes") {
        expect_u64(value, layer, &join_path(path, "max_body_bytes"))?;
    }
    if let Some(value) = map.get("user_header") {
        expect_string(value, layer, &join_path(path, "user_header"))?;
    }
    Ok(())
}

fn validate_billing(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["default_plan", "plans", "subscribers"], layer, path)?;

    if let Some(value) = map.get("default_plan") {
        expect_one_of(value, PLAN_NAMES, layer, &join_path(path, "default_plan"))?;
    }
    if let Some(value) = map.get("plans") {
        let plans_path = join_path(path, "plans");
        let plans = expect_object(value, layer, &plans_path)?;
        ensure_allowed_keys(plans, PLAN_NAMES, layer, &plans_path)?;
        for (name, limits) in plans {
            validate_plan_limits(limits, layer, &join_path(&plans_path, name))?;
        }
    }
    if let Some(value) = map.get("subscribers") {
        let subscribers_path = join_path(path, "subscribers");
        let subscribers = expect_object(value, layer, &subscribers_path)?;
        for (user, plan) in subscribers {
            expect_one_of(plan, PLAN_NAMES, layer, &join_path(&subscribers_path, user))?;
        }
    }
    Ok(())
}

fn validate_plan_limits(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["max_cards_per_request", "price_cents"], layer, path)?;

    let max_path = join_path(path, "max_cards_per_request");
    let Some(max_cards) = map.get("max_cards_per_request") else {
        return Err(invalid_field(layer, &max_path, "missing required field"));
    };
    expect_u64(max_cards, layer, &max_path)?;
    if let Some(value) = map.get("price_cents") {
        expect_u64(value, layer, &join_path(path, "price_cents"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Non-negative integers only; limits and durations cannot be negative.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Expect a string matching one of the allowed values.
fn expect_one_of(
    value: &Value,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match value.as_str() {
        Some(raw) if allowed.contains(&raw) => Ok(()),
        Some(_) => Err(invalid_field(
            layer,
            path,
            &format!("expected one of: {}", allowed.join(", ")),
        )),
        None => Err(invalid_field(layer, path, "expected string")),
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(layer, &join_path(path, key), "unknown key")),
        None => Ok(()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}

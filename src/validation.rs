//! Shape validation for Claude Desktop configuration documents.
//!
//! Works on the raw `serde_json::Value` so that every problem in a submitted
//! document is reported at once, each with a dotted path pointing at the
//! offending field.

use serde_json::{Map, Value};

use crate::types::ValidationIssue;

pub const SERVERS_KEY: &str = "mcpServers";

/// Validates a whole configuration document. An empty result means valid.
pub fn validate_config(value: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(root) = value.as_object() else {
        issues.push(ValidationIssue::new("", format!("expected an object, got {}", kind(value))));
        return issues;
    };

    match root.get(SERVERS_KEY) {
        None => issues.push(ValidationIssue::new(SERVERS_KEY, "is required")),
        Some(Value::Object(servers)) => {
            for (name, server) in servers {
                issues.extend(validate_server(name, server));
            }
        }
        Some(other) => {
            issues.push(ValidationIssue::new(SERVERS_KEY, format!("expected an object, got {}", kind(other))))
        }
    }

    issues
}

/// Validates a single `mcpServers` entry.
pub fn validate_server(name: &str, value: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let base = format!("{}.{}", SERVERS_KEY, name);

    if name.trim().is_empty() {
        issues.push(ValidationIssue::new(base.clone(), "server name must not be empty"));
    } else if name.chars().any(char::is_control) {
        issues.push(ValidationIssue::new(base.clone(), "server name must not contain control characters"));
    }

    let Some(server) = value.as_object() else {
        issues.push(ValidationIssue::new(base, format!("expected an object, got {}", kind(value))));
        return issues;
    };

    check_command(server, &base, &mut issues);
    check_args(server, &base, &mut issues);
    check_env(server, &base, &mut issues);

    if let Some(disabled) = server.get("disabled") {
        if !disabled.is_boolean() {
            issues.push(ValidationIssue::new(
                format!("{}.disabled", base),
                format!("expected a boolean, got {}", kind(disabled)),
            ));
        }
    }

    issues
}

fn check_command(server: &Map<String, Value>, base: &str, issues: &mut Vec<ValidationIssue>) {
    let path = format!("{}.command", base);
    match server.get("command") {
        None => issues.push(ValidationIssue::new(path, "is required")),
        Some(Value::String(cmd)) if cmd.trim().is_empty() => {
            issues.push(ValidationIssue::new(path, "must not be empty"))
        }
        Some(Value::String(_)) => {}
        Some(other) => issues.push(ValidationIssue::new(path, format!("expected a string, got {}", kind(other)))),
    }
}

fn check_args(server: &Map<String, Value>, base: &str, issues: &mut Vec<ValidationIssue>) {
    let path = format!("{}.args", base);
    match server.get("args") {
        None => {}
        Some(Value::Array(args)) => {
            for (i, arg) in args.iter().enumerate() {
                if !arg.is_string() {
                    issues.push(ValidationIssue::new(
                        format!("{}[{}]", path, i),
                        format!("expected a string, got {}", kind(arg)),
                    ));
                }
            }
        }
        Some(other) => issues.push(ValidationIssue::new(path, format!("expected an array, got {}", kind(other)))),
    }
}

fn check_env(server: &Map<String, Value>, base: &str, issues: &mut Vec<ValidationIssue>) {
    let path = format!("{}.env", base);
    match server.get("env") {
        None => {}
        Some(Value::Object(env)) => {
            for (key, val) in env {
                if key.trim().is_empty() {
                    issues.push(ValidationIssue::new(path.clone(), "variable names must not be empty"));
                }
                if !val.is_string() {
                    issues.push(ValidationIssue::new(
                        format!("{}.{}", path, key),
                        format!("expected a string, got {}", kind(val)),
                    ));
                }
            }
        }
        Some(other) => issues.push(ValidationIssue::new(path, format!("expected an object, got {}", kind(other)))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

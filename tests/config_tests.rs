//! Tests for configuration loading.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use agentrun::config::AgentRunConfig;
use agentrun::error::AgentRunError;
use agentrun::tools::RequireApproval;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn env_file_supplies_required_and_optional_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "PROJECT_ENDPOINT=https://file.example/api/projects/demo").unwrap();
    writeln!(file, "MODEL_DEPLOYMENT_NAME=gpt-4o-file").unwrap();
    writeln!(file, "MCP_SERVER_LABEL=github").unwrap();
    writeln!(file, "MCP_REQUIRE_APPROVAL=always").unwrap();
    writeln!(file, "POLL_INTERVAL_MS=250").unwrap();

    let config = AgentRunConfig::from_env_file(file.path()).unwrap();

    assert_eq!(config.endpoint, "https://file.example/api/projects/demo");
    assert_eq!(config.model_deployment, "gpt-4o-file");
    assert_eq!(config.mcp_server_label, "github");
    assert_eq!(config.require_approval, RequireApproval::Always);
    assert_eq!(config.poll_interval, Duration::from_millis(250));
}

#[test]
fn missing_env_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AgentRunConfig::from_env_file(dir.path().join("absent.env")).unwrap_err();
    assert!(matches!(err, AgentRunError::Configuration(_)));
}

#[test]
fn blank_values_count_as_unset() {
    let err = AgentRunConfig::from_lookup(lookup(&[
        ("PROJECT_ENDPOINT", "https://p.example"),
        ("MODEL_DEPLOYMENT_NAME", "   "),
    ]))
    .unwrap_err();
    assert!(err.to_string().contains("MODEL_DEPLOYMENT_NAME"));
}

#[test]
fn zero_unresolved_rounds_disables_the_bound() {
    let config = AgentRunConfig::from_lookup(lookup(&[
        ("PROJECT_ENDPOINT", "https://p.example"),
        ("MODEL_DEPLOYMENT_NAME", "gpt-4o"),
        ("MAX_UNRESOLVED_APPROVAL_ROUNDS", "0"),
        ("DELETE_AGENT_ON_EXIT", "true"),
    ]))
    .unwrap();

    assert_eq!(config.max_unresolved_rounds, None);
    assert!(config.delete_agent_on_exit);
}

#[test]
fn malformed_numbers_are_rejected() {
    let err = AgentRunConfig::from_lookup(lookup(&[
        ("PROJECT_ENDPOINT", "https://p.example"),
        ("MODEL_DEPLOYMENT_NAME", "gpt-4o"),
        ("POLL_INTERVAL_MS", "soon"),
    ]))
    .unwrap_err();
    assert!(matches!(err, AgentRunError::Configuration(ref m) if m.contains("POLL_INTERVAL_MS")));
}

#[test]
fn debug_output_hides_the_token() {
    let config = AgentRunConfig::new("https://p.example", "gpt-4o").with_api_token("secret-value");
    let debug = format!("{config:?}");
    assert!(!debug.contains("secret-value"));
}

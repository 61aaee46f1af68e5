//! End-to-end round-trip tests for package policy translation.
//!
//! ```text
//! ConfigPolicy (ordered)
//!     ↓ (to_remote_request)
//! PackagePolicyRequest: inputs["winlogs-httpjson"].streams["winlog.winlog"]
//!     ↓ (Fleet stores and enriches)
//! RemotePolicy: vars wrapped as {"value": ...}, defaults added
//!     ↓ (to_config_model, prior = ConfigPolicy)
//! ConfigPolicy (same order, same vars_json)
//! ```

use fleet_core::{
    canonicalize, to_config_model, to_remote_request, ConfigInput, ConfigPolicy, ConfigStream,
    CoreError, PackageRef, RemotePolicy, TranslateOptions,
};

/// Load a fixture from `testing/fixtures/policies`
fn fixture(name: &str) -> String {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    std::fs::read_to_string(workspace_root.join("testing/fixtures/policies").join(name)).unwrap()
}

fn winlog_config() -> ConfigPolicy {
    serde_json::from_str(&fixture("winlog_security.json")).unwrap()
}

fn winlog_response() -> RemotePolicy {
    serde_json::from_str(&fixture("winlog_security_response.json")).unwrap()
}

fn httpjson_config() -> ConfigPolicy {
    ConfigPolicy::new("HTTP JSON", PackageRef::new("winlog", "1.10.0"), "agent-1").with_input(
        ConfigInput::new("winlogs", "httpjson")
            .with_vars(r#"{"url":"https://x"}"#)
            .with_stream(ConfigStream::new("winlog").with_vars(r#"{"interval":"10s"}"#)),
    )
}

// =============================================================================
// Round-trip without enrichment
// =============================================================================

#[test]
fn test_httpjson_scenario() {
    let cfg = httpjson_config();
    let opts = TranslateOptions::default();

    let request = to_remote_request(&cfg, &opts).unwrap();
    let input = &request.inputs["winlogs-httpjson"];
    assert!(input.streams.contains_key("winlog.winlog"));

    let remote = RemotePolicy::from_request("pp-1", &request);
    let stored = to_config_model(&remote, Some(&cfg), &opts).unwrap();

    assert_eq!(stored.inputs.len(), 1);
    assert_eq!(stored.inputs[0].vars_json, cfg.inputs[0].vars_json);
    assert_eq!(stored.inputs[0].streams[0].data_stream, "winlog");
    assert_eq!(stored.inputs[0].streams[0].vars_json, cfg.inputs[0].streams[0].vars_json);
}

#[test]
fn test_roundtrip_preserves_enabled_entries() {
    let cfg = winlog_config();
    let opts = TranslateOptions::default();

    let remote = RemotePolicy::from_request("pp-1", &to_remote_request(&cfg, &opts).unwrap());
    let stored = to_config_model(&remote, Some(&cfg), &opts).unwrap();

    assert_eq!(stored.name, cfg.name);
    assert_eq!(stored.description, cfg.description);
    assert_eq!(stored.namespace, "default");
    assert_eq!(stored.agent_policy_id, cfg.agent_policy_id);
    assert_eq!(stored.inputs.len(), cfg.inputs.len());
    for (got, want) in stored.inputs.iter().zip(&cfg.inputs) {
        assert_eq!(got.policy_template, want.policy_template);
        assert_eq!(got.input_type, want.input_type);
        assert_eq!(got.enabled, want.enabled);
        assert_eq!(got.vars_json, canonical_or_empty(&want.vars_json));
        for (got, want) in got.streams.iter().zip(&want.streams) {
            assert_eq!(got.data_stream, want.data_stream);
            assert_eq!(got.enabled, want.enabled);
            assert_eq!(got.vars_json, canonical_or_empty(&want.vars_json));
        }
    }
}

#[test]
fn test_roundtrip_drops_disabled_entries() {
    let cfg = httpjson_config()
        .with_input(
            ConfigInput::new("winlogs", "winlog")
                .enabled(false)
                .with_stream(ConfigStream::new("security")),
        )
        .with_input(
            ConfigInput::new("winlogs", "winlog_forwarded")
                .with_stream(ConfigStream::new("forwarded").enabled(false))
                .with_stream(ConfigStream::new("system")),
        );
    let opts = TranslateOptions::default();

    let remote = RemotePolicy::from_request("pp-1", &to_remote_request(&cfg, &opts).unwrap());
    let stored = to_config_model(&remote, Some(&cfg), &opts).unwrap();

    let inputs: Vec<_> = stored.inputs.iter().map(|i| i.input_type.as_str()).collect();
    assert_eq!(inputs, vec!["httpjson", "winlog_forwarded"]);
    let streams: Vec<_> = stored.inputs[1].streams.iter().map(|s| s.data_stream.as_str()).collect();
    assert_eq!(streams, vec!["system"]);
}

#[test]
fn test_roundtrip_is_stable() {
    let cfg = winlog_config();
    let opts = TranslateOptions::default();

    let remote = RemotePolicy::from_request("pp-1", &to_remote_request(&cfg, &opts).unwrap());
    let first = to_config_model(&remote, Some(&cfg), &opts).unwrap();
    let second = to_config_model(&remote, Some(&first), &opts).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Reconciling an enriched Fleet response
// =============================================================================

#[test]
fn test_enriched_response_matches_config() {
    let cfg = winlog_config();
    let stored = to_config_model(&winlog_response(), Some(&cfg), &TranslateOptions::default()).unwrap();

    // Prior order is kept even though the response map sorts httpjson first,
    // and the disabled winlog_forwarded input is gone.
    let inputs: Vec<_> = stored.inputs.iter().map(|i| i.input_type.as_str()).collect();
    assert_eq!(inputs, vec!["winlog", "httpjson"]);

    for (got, want) in stored.inputs.iter().zip(&cfg.inputs) {
        assert_eq!(got.vars_json, want.vars_json);
        assert_eq!(got.streams.len(), want.streams.len());
        for (got, want) in got.streams.iter().zip(&want.streams) {
            assert_eq!(got.vars_json, want.vars_json);
        }
    }
}

#[test]
fn test_enriched_response_keeps_read_only_fields() {
    let cfg = winlog_config();
    let stored = to_config_model(&winlog_response(), Some(&cfg), &TranslateOptions::default()).unwrap();

    let winlog = &stored.inputs[0].streams[0];
    assert!(winlog.vars.contains("\"providers\""));
    assert!(winlog.vars.contains("\"processors\""));
    assert_eq!(
        winlog.compiled_stream,
        r#"{"event_id":"4624,4625","ignore_older":"72h","name":"Security"}"#
    );
}

#[test]
fn test_enriched_response_without_prior() {
    let stored = to_config_model(&winlog_response(), None, &TranslateOptions::default()).unwrap();

    let inputs: Vec<_> = stored.inputs.iter().map(|i| i.input_type.as_str()).collect();
    assert_eq!(inputs, vec!["httpjson", "winlog"]);
    // Nothing to filter against: every var with a value is kept.
    assert_eq!(
        stored.inputs[0].streams[0].vars_json,
        r#"{"interval":"10s","search":"search sourcetype=\"XmlWinEventLog:ChannelName\"","tags":["forwarded"]}"#
    );
    assert!(stored.inputs[1].streams[0].vars_json.contains("\"providers\":[]"));
}

#[test]
fn test_foreign_dataset_in_response() {
    let mut remote = winlog_response();
    for input in remote.inputs.values_mut() {
        for stream in input.streams.values_mut() {
            stream.data_stream.dataset = Some("system.security".to_string());
        }
    }

    let err = to_config_model(&remote, None, &TranslateOptions::default()).unwrap_err();
    assert!(matches!(err, CoreError::MalformedDataset { .. }));
}

fn canonical_or_empty(json: &str) -> String {
    if json.is_empty() {
        String::new()
    } else {
        canonicalize(json).unwrap()
    }
}

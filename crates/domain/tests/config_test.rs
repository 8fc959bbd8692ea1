use dohtunnel_domain::config::{EnvelopeFormat, LabelEncoding, LogFormat};
use dohtunnel_domain::{CliOverrides, Config, ConfigError};

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.tunnel.own_domain, "relay.test");
    assert_eq!(config.tunnel.data_label, "data");
    assert_eq!(config.tunnel.encoding, LabelEncoding::Hex);
    assert_eq!(config.tunnel.envelope, EnvelopeFormat::Json);
    assert_eq!(config.tunnel.max_chunk_size, 200);
    assert_eq!(config.tunnel.min_label_length, 8);
    assert_eq!(config.tunnel.answer_ttl, 60);
    assert_eq!(config.relay.timeout_secs, 10);
    assert_eq!(config.relay.max_body_bytes, 4 * 1024 * 1024);
    assert_eq!(config.relay.max_redirects, 10);
    assert!(config.relay.user_agent.is_none());
    assert_eq!(config.dns.dummy_address, "1.1.1.1");
    assert_eq!(config.dns.address_ttl, 300);
    assert!(config.dns.passthrough_upstream.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_partial_toml_fills_defaults() {
    let config = Config::from_toml(
        r#"
        [tunnel]
        own_domain = "tunnel.example.org"
        encoding = "base64url"
        envelope = "binary"
        max_chunk_size = 180

        [relay]
        timeout_secs = 15
        "#,
    )
    .unwrap();

    assert_eq!(config.tunnel.own_domain, "tunnel.example.org");
    assert_eq!(config.tunnel.encoding, LabelEncoding::Base64url);
    assert_eq!(config.tunnel.envelope, EnvelopeFormat::Binary);
    assert_eq!(config.tunnel.max_chunk_size, 180);
    assert_eq!(config.tunnel.chunk_size().get(), 180);
    assert_eq!(config.relay.timeout_secs, 15);
    assert_eq!(config.relay.timeout().as_secs(), 15);
    assert_eq!(config.relay.max_body_bytes, 4 * 1024 * 1024);
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_config_rejects_unknown_encoding() {
    let result = Config::from_toml(
        r#"
        [tunnel]
        encoding = "base32"
        "#,
    );
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_validate_rejects_empty_own_domain() {
    let mut config = Config::default();
    config.tunnel.own_domain = " . ".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_validate_rejects_chunk_size_out_of_range() {
    let mut config = Config::default();

    config.tunnel.max_chunk_size = 0;
    assert!(config.validate().is_err());

    config.tunnel.max_chunk_size = 256;
    assert!(config.validate().is_err());

    config.tunnel.max_chunk_size = 255;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_timeout_and_body_cap() {
    let mut config = Config::default();
    config.relay.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.relay.max_body_bytes = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_dummy_address() {
    let mut config = Config::default();
    config.dns.dummy_address = "not-an-ip".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_dotted_data_label() {
    let mut config = Config::default();
    config.tunnel.data_label = "da.ta".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_passthrough_back_to_relay() {
    for upstream in [
        "https://relay.test/dns-query",
        "https://dns.relay.test/resolve",
        "http:relay.test",
        "not a url",
    ] {
        let mut config = Config::default();
        config.dns.passthrough_upstream = Some(upstream.to_string());
        assert!(
            matches!(config.validate(), Err(ConfigError::Validation(_))),
            "{} should be rejected",
            upstream
        );
    }
}

#[test]
fn test_validate_accepts_foreign_passthrough() {
    let mut config = Config::default();
    config.dns.passthrough_upstream = Some("https://dns.google/resolve".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_cli_overrides_win_over_file_values() {
    let dir = std::env::temp_dir().join(format!("dohtunnel-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("dohtunnel.toml");
    std::fs::write(
        &path,
        r#"
        [server]
        port = 9000

        [tunnel]
        own_domain = "file.example"
        "#,
    )
    .unwrap();

    let config = Config::load(
        path.to_str(),
        CliOverrides {
            port: Some(9100),
            own_domain: Some("cli.example".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.server.port, 9100);
    assert_eq!(config.tunnel.own_domain, "cli.example");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_load_missing_file_is_read_error() {
    let result = Config::load(Some("/nonexistent/dohtunnel.toml"), CliOverrides::default());
    assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
}

#[test]
fn test_save_then_load_preserves_values() {
    let dir = std::env::temp_dir().join(format!("dohtunnel-save-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("saved.toml");

    let mut config = Config::default();
    config.tunnel.own_domain = "saved.example".to_string();
    config.dns.passthrough_upstream = Some("https://dns.google/resolve".to_string());
    config.save(path.to_str().unwrap()).unwrap();

    let loaded = Config::load(path.to_str(), CliOverrides::default()).unwrap();
    assert_eq!(loaded.tunnel.own_domain, "saved.example");
    assert_eq!(
        loaded.dns.passthrough_upstream.as_deref(),
        Some("https://dns.google/resolve")
    );

    std::fs::remove_dir_all(&dir).ok();
}

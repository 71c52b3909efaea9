use brisk_core::{BriskConfig, ConfigError, ConfigValue, ServerSettings, DEFAULT_BODY_LIMIT};
use std::fs;

#[test]
fn empty_config_has_no_keys() {
    let config = BriskConfig::empty();
    assert!(matches!(
        config.get::<String>("missing"),
        Err(ConfigError::NotFound(_))
    ));
    assert_eq!(config.get_or("missing", 7i64), 7);
}

#[test]
fn set_and_get_typed() {
    let mut config = BriskConfig::empty();
    config.set("int", ConfigValue::Integer(42));
    config.set("float", ConfigValue::Float(1.5));
    config.set("flag", ConfigValue::String("yes".into()));
    config.set("nothing", ConfigValue::Null);

    assert_eq!(config.get::<i64>("int").unwrap(), 42);
    assert_eq!(config.get::<u16>("int").unwrap(), 42);
    assert_eq!(config.get::<String>("int").unwrap(), "42");
    assert_eq!(config.get::<f64>("float").unwrap(), 1.5);
    assert!(config.get::<bool>("flag").unwrap());
    assert_eq!(config.get::<Option<String>>("nothing").unwrap(), None);
}

#[test]
fn type_mismatch_names_the_key() {
    let mut config = BriskConfig::empty();
    config.set("port", ConfigValue::String("eighty".into()));

    let err = config.get::<u16>("port").unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { ref key, .. } if key == "port"));
    assert!(err.to_string().contains("port"));
    assert!(config.get_optional::<u16>("port").is_err());
    assert_eq!(config.get_optional::<u16>("other").unwrap(), None);
}

#[test]
fn nested_yaml_is_flattened() {
    let yaml = r#"
server:
  addr: 127.0.0.1:8080
  body_limit: 1024
app:
  origins:
    - http://a.test
    - http://b.test
"#;
    let config = BriskConfig::from_yaml_str(yaml, "dev").unwrap();

    assert_eq!(config.profile(), "dev");
    assert_eq!(config.get::<String>("server.addr").unwrap(), "127.0.0.1:8080");
    assert_eq!(
        config.get::<Vec<String>>("app.origins").unwrap(),
        ["http://a.test", "http://b.test"]
    );
    assert!(config.contains_key("server.body_limit"));
}

#[test]
fn invalid_yaml_is_a_load_error() {
    let err = BriskConfig::from_yaml_str("server: [unclosed", "dev").unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn environment_overrides_yaml() {
    let mut config = BriskConfig::from_yaml_str("server:\n  addr: 0.0.0.0:1\n  body_limit: 10\n", "dev").unwrap();
    config.overlay_env([
        ("SERVER_ADDR".to_string(), "0.0.0.0:9000".to_string()),
        ("SERVER_BODY_LIMIT".to_string(), "2048".to_string()),
        ("APP_ORIGINS".to_string(), "http://x.test, http://y.test".to_string()),
    ]);

    assert_eq!(config.get::<String>("server.addr").unwrap(), "0.0.0.0:9000");
    assert_eq!(config.get::<usize>("server.body_limit").unwrap(), 2048);
    assert_eq!(
        config.get::<Vec<String>>("app.origins").unwrap(),
        ["http://x.test", "http://y.test"]
    );
}

#[test]
fn profile_file_overrides_base_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "greeting:\n  prefix: Hello\n  suffix: '!'\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("application-loud.yaml"),
        "greeting:\n  prefix: HEY\n",
    )
    .unwrap();

    let config = BriskConfig::load_from(dir.path(), "loud").unwrap();
    if std::env::var("BRISK_PROFILE").is_err() {
        assert_eq!(config.profile(), "loud");
        assert_eq!(config.get::<String>("greeting.prefix").unwrap(), "HEY");
    }
    assert_eq!(config.get::<String>("greeting.suffix").unwrap(), "!");
}

#[test]
fn missing_files_are_not_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(BriskConfig::load_from(dir.path(), "none").is_ok());
}

// ── Server settings ─────────────────────────────────────────────────────────

#[test]
fn server_settings_defaults() {
    let settings = ServerSettings::from_config(&BriskConfig::empty()).unwrap();
    assert_eq!(settings, ServerSettings::default());
    assert_eq!(settings.addr, "0.0.0.0:3000");
    assert_eq!(settings.body_limit, DEFAULT_BODY_LIMIT);
}

#[test]
fn server_settings_from_yaml() {
    let config =
        BriskConfig::from_yaml_str("server:\n  addr: 127.0.0.1:4000\n  body_limit: 512\n", "dev")
            .unwrap();
    let settings = ServerSettings::from_config(&config).unwrap();
    assert_eq!(settings.addr, "127.0.0.1:4000");
    assert_eq!(settings.body_limit, 512);
}

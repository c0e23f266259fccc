//! Configuration loading tests
//!
//! A missing config file is created with defaults, and the typed accessors
//! read back what is stored.

use std::time::Duration;
use voxform::gateway::FallbackPolicy;
use voxform::state::config::{Config, API_URL_ENV};

#[test]
fn test_config_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voxform.cfg");
    assert!(!path.exists());

    let config = Config::load_from(&path).expect("Failed to load config");
    assert!(path.exists());
    assert_eq!(config.path(), &path);

    // Speech defaults
    assert!(config.speech_enabled());
    assert!(config.auto_speak());
    let voice = config.voice();
    assert_eq!(voice.lang, "en-US");
    assert!((voice.rate - 0.8).abs() < f32::EPSILON);
    assert!((voice.pitch - 1.0).abs() < f32::EPSILON);
    assert!((voice.volume - 1.0).abs() < f32::EPSILON);

    // Backend defaults
    let gateway = config.gateway();
    assert!(!gateway.require_secure_transport);
    assert_eq!(gateway.fallback, FallbackPolicy::Static);
    assert_eq!(gateway.form_id, 1);
    assert_eq!(gateway.timeout, Duration::from_secs(30));
    if std::env::var(API_URL_ENV).is_err() {
        assert_eq!(gateway.base_url, None);
    }

    // Relay defaults
    let relay = config.relay();
    assert_eq!(relay.listen, "127.0.0.1:3000");
    assert_eq!(relay.upstream, "http://127.0.0.1:8000");
}

#[test]
fn test_config_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voxform.cfg");

    let mut config = Config::load_from(&path).unwrap();
    config.set("backend", "fallback", "error");
    config.set("backend", "form_id", "7");
    config.set("backend", "require_secure_transport", "true");
    config.set("speech", "rate", "1.5");
    config.set("speech", "auto_speak", "false");
    config.set("relay", "upstream", "http://backend:8000/");
    config.save().unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.fallback_policy(), FallbackPolicy::Error);
    assert_eq!(config.form_id(), 7);
    assert!(config.require_secure_transport());
    assert!(!config.auto_speak());
    assert!((config.voice().rate - 1.5).abs() < f32::EPSILON);
    assert_eq!(config.relay().upstream, "http://backend:8000");
}

#[test]
fn test_config_bad_values_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voxform.cfg");
    std::fs::write(
        &path,
        "[backend]\nfallback = sometimes\nform_id = -3\ntimeout_secs = zero\n\
         [speech]\nvolume = 4.0\nenabled = maybe\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.fallback_policy(), FallbackPolicy::Static);
    assert_eq!(config.form_id(), 1);
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert!((config.voice().volume - 1.0).abs() < f32::EPSILON);
    assert!(config.speech_enabled());
}

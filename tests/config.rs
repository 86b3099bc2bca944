use folio_fx::config::{FxConfig, LogLevel};
use folio_fx::scroll::Easing;
use folio_fx::FxError;

#[test]
fn empty_object_is_the_default() {
    assert_eq!(FxConfig::from_json("{}").ok(), Some(FxConfig::default()));
}

#[test]
fn partial_overrides_keep_other_defaults() {
    let json = r#"{
        "logLevel": "debug",
        "introEnabled": true,
        "mascot": { "heroScale": 1.2 },
        "scroll": { "scrollEndDelay": 0.2, "easing": "linear" },
        "dom": { "tiltTarget": "card" }
    }"#;
    let cfg = match FxConfig::from_json(json) {
        Ok(cfg) => cfg,
        Err(e) => panic!("config rejected: {e}"),
    };
    let defaults = FxConfig::default();
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert!(cfg.intro_enabled);
    assert_eq!(cfg.mascot.hero_scale, 1.2);
    assert_eq!(cfg.mascot.float_scale, defaults.mascot.float_scale);
    assert_eq!(cfg.scroll.scroll_end_delay, 0.2);
    assert_eq!(cfg.scroll.easing, Easing::Linear);
    assert_eq!(cfg.dom.tilt_target, "card");
    assert_eq!(cfg.dom.mascot, defaults.dom.mascot);
}

#[test]
fn out_of_range_values_are_rejected() {
    let err = FxConfig::from_json(r#"{ "chroma": { "similarity": 2.0 } }"#);
    assert!(matches!(err, Err(FxError::InvalidConfig { .. })));

    let err = FxConfig::from_json(r#"{ "intro": { "spinDuration": 3.0, "totalDuration": 2.0 } }"#);
    assert!(matches!(err, Err(FxError::InvalidConfig { field: "intro.totalDuration", .. })));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = FxConfig::from_json("{ not json");
    assert!(matches!(err, Err(FxError::Config(_))));
    assert!(err.err().map(|e| e.to_string()).unwrap_or_default().starts_with("invalid config json"));
}

#[test]
fn defaults_validate() {
    assert!(FxConfig::default().validate().is_ok());
    assert_eq!(LogLevel::default().to_level(), log::Level::Info);
}

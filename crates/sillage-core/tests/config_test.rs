use sillage_core::config::*;
use sillage_core::errors::{ConfigError, SillageError};
use sillage_core::models::TruncationStrategy;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = SillageConfig::from_toml("").unwrap();

    // Embedding defaults
    assert_eq!(config.embedding.dimension_ladder.dims(), &[256, 512, 1024, 2048]);
    assert_eq!(
        config.embedding.truncation_strategy,
        TruncationStrategy::EndTruncation
    );
    assert!(config.embedding.normalize_embeddings);
    assert!(config.embedding.enable_caching);

    // Cache defaults
    assert_eq!(config.cache.eviction_fraction, 0.2);
    assert!(config.cache.auto_evict);

    // Search defaults
    assert_eq!(config.search.stages.len(), 3);
    assert_eq!(config.search.stages[2].dimension, 2048);
    assert_eq!(config.search.complexity_simple, 0.3);

    // Bandit defaults
    assert_eq!(config.bandit.fallback_algorithm, "hybrid");
    assert_eq!(config.bandit.min_exploration_rate, 0.05);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[embedding]
dimension_ladder = [128, 256]
truncation_strategy = "pca_truncation"
enable_caching = false

[search]
early_termination_confidence = 0.9
stages = [
    { dimension = 128, candidate_count = 50, similarity_threshold = 0.5 },
    { dimension = 256, candidate_count = 5, similarity_threshold = 0.7 },
]

[bandit]
exploration_decay = 0.9
"#;
    let config = SillageConfig::from_toml(toml).unwrap();
    assert_eq!(config.embedding.dimension_ladder.dims(), &[128, 256]);
    assert_eq!(
        config.embedding.truncation_strategy,
        TruncationStrategy::PcaTruncation
    );
    assert!(!config.embedding.enable_caching);
    // Non-overridden fields keep defaults
    assert!(config.embedding.normalize_embeddings);
    assert_eq!(config.search.stages.len(), 2);
    assert_eq!(config.bandit.exploration_decay, 0.9);
    assert_eq!(config.bandit.min_exploration_rate, 0.05);
}

#[test]
fn non_ascending_ladder_is_a_parse_time_config_error() {
    let toml = r#"
[embedding]
dimension_ladder = [1024, 256]
"#;
    let err = SillageConfig::from_toml(toml).unwrap_err();
    match err {
        SillageError::ConfigError(ConfigError::Parse { reason }) => {
            assert!(reason.contains("ascending"), "reason was: {reason}");
        }
        other => panic!("expected config parse error, got {other:?}"),
    }
}

#[test]
fn empty_ladder_is_rejected() {
    let err = SillageConfig::from_toml("[embedding]\ndimension_ladder = []\n").unwrap_err();
    assert!(matches!(err, SillageError::ConfigError(_)));
}

#[test]
fn descending_stages_are_rejected() {
    let toml = r#"
[search]
stages = [
    { dimension = 512, candidate_count = 50, similarity_threshold = 0.5 },
    { dimension = 256, candidate_count = 5, similarity_threshold = 0.7 },
]
"#;
    let err = SillageConfig::from_toml(toml).unwrap_err();
    assert!(matches!(
        err,
        SillageError::ConfigError(ConfigError::InvalidStages { .. })
    ));
}

#[test]
fn out_of_range_confidence_is_rejected() {
    let err = SillageConfig::from_toml("[search]\nearly_termination_confidence = 1.5\n").unwrap_err();
    assert!(matches!(
        err,
        SillageError::ConfigError(ConfigError::OutOfRange { .. })
    ));
}

#[test]
fn config_serde_roundtrip() {
    let config = SillageConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = SillageConfig::from_toml(&toml_str).unwrap();
    assert_eq!(
        roundtripped.embedding.dimension_ladder,
        config.embedding.dimension_ladder
    );
    assert_eq!(roundtripped.search.stages, config.search.stages);
}

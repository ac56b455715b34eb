//! Application configuration.
//!
//! Everything is overridable from the environment with the `FARELINE_`
//! prefix and `__` as the section separator, e.g.
//! `FARELINE_SEARCH__MAX_RESULTS=5` or
//! `FARELINE_NLU__FUZZY_CITY_THRESHOLD=0.8`. Defaults cover a working
//! local setup, so an empty environment is valid.

mod error;

pub use error::ConfigError;

use serde::Deserialize;

use crate::domain::ranking::RankingConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum offers requested from a flight source.
    pub max_results: usize,
    /// Budget for one source call before falling back.
    pub source_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 10, source_timeout_ms: 3000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sliding session TTL in seconds.
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_secs: 1800 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NluConfig {
    /// Minimum similarity for accepting a fuzzy city match.
    pub fuzzy_city_threshold: f64,
    /// Maximum city suggestions offered on a failed resolution.
    pub max_city_suggestions: usize,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self { fuzzy_city_threshold: 0.7, max_city_suggestions: 6 }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub session: SessionConfig,
    pub nlu: NluConfig,
    pub ranking: RankingConfig,
}

impl AppConfig {
    /// Loads configuration from the environment on top of defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("FARELINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let loaded: AppConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Rejects configurations that would misbehave at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_results == 0 {
            return Err(ConfigError::Invalid("search.max_results must be positive".into()));
        }
        if self.search.source_timeout_ms == 0 {
            return Err(ConfigError::Invalid("search.source_timeout_ms must be positive".into()));
        }
        if self.session.ttl_secs == 0 {
            return Err(ConfigError::Invalid("session.ttl_secs must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.nlu.fuzzy_city_threshold) {
            return Err(ConfigError::Invalid(
                "nlu.fuzzy_city_threshold must be within [0, 1]".into(),
            ));
        }
        if self.nlu.max_city_suggestions == 0 {
            return Err(ConfigError::Invalid("nlu.max_city_suggestions must be positive".into()));
        }
        self.ranking
            .validate()
            .map_err(|reason| ConfigError::Invalid(format!("ranking: {}", reason)))
    }
}

//! Tuning knobs for the lookup: interpolation weights, span length, fuzzy
//! reading weight and the default result count.
//!
//! Values come from the embedded `default_settings.toml` unless a caller
//! installs its own file with [`init_custom`] before anything reads
//! [`settings`]. Settings are validated once and then shared for the life
//! of the process.

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Validate and install custom settings. Fails once `settings()` has been
/// read or another file has been installed.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    let parsed = parse_settings_toml(&toml_content)?;
    SETTINGS
        .set(parsed)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Process-wide settings; the embedded defaults unless `init_custom` ran first.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        parse_settings_toml(DEFAULT_SETTINGS_TOML).expect("embedded default settings are valid")
    })
}

pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub lookup: LookupSettings,
    pub matrix: MatrixSettings,
    pub candidates: CandidateSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupSettings {
    pub bigram_lambda: f32,
    pub unigram_lambda: f32,
    pub max_phrase_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatrixSettings {
    pub fuzzy_weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateSettings {
    pub max_results: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_weight {
        ($section:ident . $field:ident) => {
            if !s.$section.$field.is_finite() || s.$section.$field < 0.0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be a non-negative number".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_weight!(lookup.bigram_lambda);
    check_weight!(lookup.unigram_lambda);
    if s.lookup.bigram_lambda + s.lookup.unigram_lambda <= 0.0 {
        return Err(SettingsError::InvalidValue {
            field: "lookup.unigram_lambda".to_string(),
            reason: "bigram_lambda and unigram_lambda must not both be zero".to_string(),
        });
    }
    check_positive_usize!(lookup.max_phrase_length);

    check_weight!(matrix.fuzzy_weight);
    if s.matrix.fuzzy_weight == 0.0 || s.matrix.fuzzy_weight > 1.0 {
        return Err(SettingsError::InvalidValue {
            field: "matrix.fuzzy_weight".to_string(),
            reason: "must be in (0, 1]".to_string(),
        });
    }

    check_positive_usize!(candidates.max_results);

    Ok(())
}

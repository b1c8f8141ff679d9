use std::fs;

use phonolex_core::settings;

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: lookup.bigram_lambda={}, lookup.unigram_lambda={}, lookup.max_phrase_length={}, \
         matrix.fuzzy_weight={}, candidates.max_results={}",
        s.lookup.bigram_lambda,
        s.lookup.unigram_lambda,
        s.lookup.max_phrase_length,
        s.matrix.fuzzy_weight,
        s.candidates.max_results
    );
}

/// Install a custom settings file before anything reads the settings.
pub fn load_settings(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(settings::init_custom(content), "Error in {file}: {}");
}

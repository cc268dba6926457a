//! Environment-variable placeholder expansion for configuration fields.
//!
//! The runner requires fully resolved strings; the expansion pass over
//! `${VAR}` placeholders belongs to the caller layer, before the
//! configuration is handed over. Unknown variables expand to the empty
//! string.

use std::sync::LazyLock;

use dbaudit_core::AnalysisConfig;
use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder pattern")
});

/// Expand `${VAR}` placeholders from the process environment.
pub fn expand(value: &str) -> String {
    PLACEHOLDER
        .replace_all(value, |caps: &Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

/// Expand every free-form string field of the configuration in place.
pub fn expand_config(config: &mut AnalysisConfig) {
    config.connection = expand(&config.connection);
    for object in &mut config.objects {
        object.name = expand(&object.name);
        object.owner = expand(&object.owner);
        object.kind = expand(&object.kind);
    }
    for folder in &mut config.folders {
        folder.path = expand(&folder.path);
        folder.filter = expand(&folder.filter);
    }
    config.report.name = expand(&config.report.name);
    config.report.folder = expand(&config.report.folder);
}

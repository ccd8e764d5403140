//! Named parameter presets.
//!
//! Provides the built-in presets and a lookup that layers user presets from
//! the settings file over them.

use std::collections::BTreeMap;

use retouch_utils::ParameterSet;

/// A named, fixed set of slider values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamPreset {
    /// Human-visible name for UI/CLI selection.
    pub name: &'static str,
    /// Values written when the preset is applied.
    pub params: ParameterSet,
}

impl ParamPreset {
    pub const fn new(name: &'static str, params: ParameterSet) -> Self {
        Self { name, params }
    }
}

static PRESETS: [ParamPreset; 1] = [ParamPreset::new(
    "Passport",
    ParameterSet {
        brightness: 10,
        contrast: 15,
        clarity: 25,
        smooth: 8,
        skin: 35,
        white_balance: 6,
    },
)];

/// Returns the built-in presets.
pub fn standard_presets() -> &'static [ParamPreset] {
    &PRESETS
}

/// Find a built-in preset by name (case-insensitive). Returns `None` if not found.
pub fn preset_by_name(name: &str) -> Option<&'static ParamPreset> {
    let lookup_key = normalize_name(name);
    standard_presets()
        .iter()
        .find(|p| normalize_name(p.name) == lookup_key)
}

/// Resolve `name` against `custom` first, then the built-in table.
pub fn resolve_preset(name: &str, custom: &BTreeMap<String, ParameterSet>) -> Option<ParameterSet> {
    let lookup_key = normalize_name(name);
    if lookup_key.is_empty() {
        return None;
    }
    custom
        .iter()
        .find(|(key, _)| normalize_name(key) == lookup_key)
        .map(|(_, params)| params.sanitized())
        .or_else(|| preset_by_name(name).map(|p| p.params))
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passport_preset_has_expected_values() {
        let passport = preset_by_name("passport").expect("passport preset");
        assert_eq!(
            passport.params,
            ParameterSet {
                brightness: 10,
                contrast: 15,
                clarity: 25,
                smooth: 8,
                skin: 35,
                white_balance: 6,
            }
        );
    }

    #[test]
    fn preset_lookup_ignores_spacing_and_case() {
        assert!(preset_by_name("PASSPORT").is_some());
        assert!(preset_by_name(" pass-port ").is_some());
        assert!(preset_by_name("linkedin").is_none());
    }

    #[test]
    fn custom_presets_shadow_builtins() {
        let mut custom = BTreeMap::new();
        custom.insert(
            "Passport".to_string(),
            ParameterSet {
                brightness: 5,
                ..ParameterSet::default()
            },
        );
        custom.insert(
            "Warm Glow".to_string(),
            ParameterSet {
                white_balance: 90,
                ..ParameterSet::default()
            },
        );
        assert_eq!(resolve_preset("passport", &custom).map(|p| p.brightness), Some(5));
        assert_eq!(
            resolve_preset("warm_glow", &custom).map(|p| p.white_balance),
            Some(50)
        );
        assert!(resolve_preset("", &custom).is_none());
        assert_eq!(
            resolve_preset("passport", &BTreeMap::new()),
            Some(standard_presets()[0].params)
        );
    }
}

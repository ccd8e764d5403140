//! Slider parameters that drive the render pipeline.
//!
//! Every field of [`ParameterSet`] is an integer slider value with a fixed
//! domain. Writes always clamp to that domain instead of failing, so callers
//! can forward raw UI values without validating them first. An all-zero set is
//! the identity transform.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};

/// Identifies one field of a [`ParameterSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKey {
    Brightness,
    Contrast,
    Clarity,
    Smooth,
    Skin,
    WhiteBalance,
}

impl ParamKey {
    /// All keys in slider order.
    pub const ALL: [ParamKey; 6] = [
        ParamKey::Brightness,
        ParamKey::Contrast,
        ParamKey::Clarity,
        ParamKey::Smooth,
        ParamKey::Skin,
        ParamKey::WhiteBalance,
    ];

    /// Declared domain of the parameter.
    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            ParamKey::Brightness | ParamKey::Contrast => -100..=100,
            ParamKey::Clarity | ParamKey::Smooth | ParamKey::Skin => 0..=100,
            ParamKey::WhiteBalance => -50..=50,
        }
    }

    /// Clamp a raw value into [`ParamKey::range`].
    pub fn clamp(self, value: i32) -> i32 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamKey::Brightness => "brightness",
            ParamKey::Contrast => "contrast",
            ParamKey::Clarity => "clarity",
            ParamKey::Smooth => "smooth",
            ParamKey::Skin => "skin",
            ParamKey::WhiteBalance => "white_balance",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "brightness" => Ok(ParamKey::Brightness),
            "contrast" => Ok(ParamKey::Contrast),
            "clarity" => Ok(ParamKey::Clarity),
            "smooth" => Ok(ParamKey::Smooth),
            "skin" => Ok(ParamKey::Skin),
            "wb" | "white_balance" | "whitebalance" => Ok(ParamKey::WhiteBalance),
            other => Err(format!(
                "unknown parameter '{other}', expected brightness/contrast/clarity/smooth/skin/wb"
            )),
        }
    }
}

/// The six user-tunable slider values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Additive brightness offset (-100..=100).
    pub brightness: i32,
    /// Contrast, mapped to a gain of `1 + contrast / 100` (-100..=100).
    pub contrast: i32,
    /// Unsharp-mask strength (0..=100).
    pub clarity: i32,
    /// Bilateral smoothing strength (0..=100).
    pub smooth: i32,
    /// Skin softening strength (0..=100).
    pub skin: i32,
    /// Gray-world white balance strength (-50..=50).
    #[serde(alias = "wb")]
    pub white_balance: i32,
}

impl ParameterSet {
    /// Read a single field.
    pub fn get(&self, key: ParamKey) -> i32 {
        match key {
            ParamKey::Brightness => self.brightness,
            ParamKey::Contrast => self.contrast,
            ParamKey::Clarity => self.clarity,
            ParamKey::Smooth => self.smooth,
            ParamKey::Skin => self.skin,
            ParamKey::WhiteBalance => self.white_balance,
        }
    }

    /// Write a single field, clamping into its range. Returns the stored value.
    pub fn set(&mut self, key: ParamKey, value: i32) -> i32 {
        let value = key.clamp(value);
        let slot = match key {
            ParamKey::Brightness => &mut self.brightness,
            ParamKey::Contrast => &mut self.contrast,
            ParamKey::Clarity => &mut self.clarity,
            ParamKey::Smooth => &mut self.smooth,
            ParamKey::Skin => &mut self.skin,
            ParamKey::WhiteBalance => &mut self.white_balance,
        };
        *slot = value;
        value
    }

    /// Copy of `self` with every field clamped into range.
    pub fn sanitized(mut self) -> Self {
        for key in ParamKey::ALL {
            let value = self.get(key);
            self.set(key, value);
        }
        self
    }

    /// Returns true when every field is zero.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// A partial [`ParameterSet`]: only the fields that should change are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    pub brightness: Option<i32>,
    pub contrast: Option<i32>,
    pub clarity: Option<i32>,
    pub smooth: Option<i32>,
    pub skin: Option<i32>,
    pub white_balance: Option<i32>,
}

impl Adjustments {
    pub fn get(&self, key: ParamKey) -> Option<i32> {
        match key {
            ParamKey::Brightness => self.brightness,
            ParamKey::Contrast => self.contrast,
            ParamKey::Clarity => self.clarity,
            ParamKey::Smooth => self.smooth,
            ParamKey::Skin => self.skin,
            ParamKey::WhiteBalance => self.white_balance,
        }
    }

    /// Present, non-zero proposals in slider order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamKey, i32)> + '_ {
        ParamKey::ALL
            .into_iter()
            .filter_map(move |key| self.get(key).filter(|v| *v != 0).map(|v| (key, v)))
    }

    /// How many fields [`Adjustments::apply_to`] would write.
    pub fn applied_count(&self) -> usize {
        self.iter().count()
    }

    /// Overwrite the non-zero proposals into `params`. Returns the number written.
    pub fn apply_to(&self, params: &mut ParameterSet) -> usize {
        let mut written = 0;
        for (key, value) in self.iter() {
            params.set(key, value);
            written += 1;
        }
        written
    }
}

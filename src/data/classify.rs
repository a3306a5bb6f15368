//! Severity classification of NOx predictions.
//!
//! A prediction is mapped to an [`AirQuality`] band by a fixed
//! [`ThresholdPolicy`]. Two policies exist: the three-tier 40/80 table and
//! the two-tier 200 cut-off. They disagree about what "unsafe" means for the
//! same quantity; configuration picks one, three-tier by default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NoxError;

/// Severity band for a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirQuality {
    Safe,
    Moderate,
    Unsafe,
}

impl AirQuality {
    /// Label as persisted and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            AirQuality::Safe => "SAFE",
            AirQuality::Moderate => "MODERATE",
            AirQuality::Unsafe => "UNSAFE",
        }
    }

    /// Style class the renderer keys its colours on.
    pub fn style_hint(&self) -> StyleHint {
        match self {
            AirQuality::Safe => StyleHint::Safe,
            AirQuality::Moderate => StyleHint::Moderate,
            AirQuality::Unsafe => StyleHint::Unsafe,
        }
    }

    /// Alert banner text, if the band warrants one.
    pub fn alert(&self) -> Option<&'static str> {
        match self {
            AirQuality::Safe => None,
            AirQuality::Moderate => Some("MODERATE POLLUTION"),
            AirQuality::Unsafe => Some("CRITICAL POLLUTION ALERT"),
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AirQuality {
    type Err = NoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SAFE" => Ok(AirQuality::Safe),
            "MODERATE" => Ok(AirQuality::Moderate),
            "UNSAFE" => Ok(AirQuality::Unsafe),
            other => Err(NoxError::CorruptRecord(format!("unknown status '{other}'"))),
        }
    }
}

/// Visual treatment class, mapped 1:1 from [`AirQuality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleHint {
    Safe,
    Moderate,
    Unsafe,
}

impl StyleHint {
    pub fn class_name(&self) -> &'static str {
        match self {
            StyleHint::Safe => "status-safe",
            StyleHint::Moderate => "status-mod",
            StyleHint::Unsafe => "status-unsafe",
        }
    }
}

/// Which threshold table is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    ThreeTier,
    TwoTier,
}

impl FromStr for PolicyKind {
    type Err = NoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "three-tier" => Ok(PolicyKind::ThreeTier),
            "two-tier" => Ok(PolicyKind::TwoTier),
            other => Err(NoxError::Config(format!(
                "unknown threshold policy '{other}' (expected three-tier or two-tier)"
            ))),
        }
    }
}

/// Threshold table for classification.
///
/// Three-tier lower bounds are inclusive on the more severe side: a
/// prediction equal to a threshold falls into the band above it. The
/// two-tier cut-off is exclusive: exactly `unsafe_at` is still SAFE.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdPolicy {
    /// `< moderate` SAFE, `[moderate, unsafe)` MODERATE, `>= unsafe` UNSAFE.
    ThreeTier { moderate: f64, unsafe_at: f64 },
    /// `<= unsafe` SAFE, strictly above it UNSAFE.
    TwoTier { unsafe_at: f64 },
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::three_tier()
    }
}

impl ThresholdPolicy {
    pub const DEFAULT_MODERATE: f64 = 40.0;
    pub const DEFAULT_UNSAFE: f64 = 80.0;
    pub const DEFAULT_TWO_TIER_UNSAFE: f64 = 200.0;

    pub fn three_tier() -> Self {
        ThresholdPolicy::ThreeTier {
            moderate: Self::DEFAULT_MODERATE,
            unsafe_at: Self::DEFAULT_UNSAFE,
        }
    }

    pub fn two_tier() -> Self {
        ThresholdPolicy::TwoTier {
            unsafe_at: Self::DEFAULT_TWO_TIER_UNSAFE,
        }
    }

    /// Build a policy from its kind and optional overrides, validating them.
    pub fn build(
        kind: PolicyKind,
        moderate: Option<f64>,
        unsafe_at: Option<f64>,
    ) -> Result<Self, NoxError> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(v)
            } else {
                Err(NoxError::Config(format!("{name} threshold must be finite")))
            }
        };

        match kind {
            PolicyKind::ThreeTier => {
                let moderate = finite("moderate", moderate.unwrap_or(Self::DEFAULT_MODERATE))?;
                let unsafe_at = finite("unsafe", unsafe_at.unwrap_or(Self::DEFAULT_UNSAFE))?;
                if moderate >= unsafe_at {
                    return Err(NoxError::Config(format!(
                        "moderate threshold ({moderate}) must be below unsafe threshold ({unsafe_at})"
                    )));
                }
                Ok(ThresholdPolicy::ThreeTier {
                    moderate,
                    unsafe_at,
                })
            }
            PolicyKind::TwoTier => {
                if moderate.is_some() {
                    return Err(NoxError::Config(
                        "two-tier policy has no moderate threshold".to_string(),
                    ));
                }
                let unsafe_at =
                    finite("unsafe", unsafe_at.unwrap_or(Self::DEFAULT_TWO_TIER_UNSAFE))?;
                Ok(ThresholdPolicy::TwoTier { unsafe_at })
            }
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            ThresholdPolicy::ThreeTier { .. } => PolicyKind::ThreeTier,
            ThresholdPolicy::TwoTier { .. } => PolicyKind::TwoTier,
        }
    }

    /// Classify a prediction. Total over `f64`: NaN fails every comparison
    /// and lands in [`AirQuality::Unsafe`].
    pub fn classify(&self, prediction: f64) -> (AirQuality, StyleHint) {
        let quality = match *self {
            ThresholdPolicy::ThreeTier {
                moderate,
                unsafe_at,
            } => {
                if prediction < moderate {
                    AirQuality::Safe
                } else if prediction < unsafe_at {
                    AirQuality::Moderate
                } else {
                    AirQuality::Unsafe
                }
            }
            ThresholdPolicy::TwoTier { unsafe_at } => {
                if prediction <= unsafe_at {
                    AirQuality::Safe
                } else {
                    AirQuality::Unsafe
                }
            }
        };
        (quality, quality.style_hint())
    }

    /// Threshold lines to draw on the trend chart, ascending.
    pub fn lines(&self) -> Vec<(AirQuality, f64)> {
        match *self {
            ThresholdPolicy::ThreeTier {
                moderate,
                unsafe_at,
            } => vec![
                (AirQuality::Moderate, moderate),
                (AirQuality::Unsafe, unsafe_at),
            ],
            ThresholdPolicy::TwoTier { unsafe_at } => vec![(AirQuality::Unsafe, unsafe_at)],
        }
    }
}

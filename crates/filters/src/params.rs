use lidsor_core::{LidsorError, Result};
use serde::{Deserialize, Serialize};

fn default_k() -> usize {
    30
}

fn default_std_multiplier() -> f32 {
    2.0
}

/// Parameters for one LIDSOR invocation.
///
/// The three core knobs are `k`, `std_multiplier` (`s`) and `scaling_factor`.
/// The remaining fields are optional refinements; leaving them `None` gives
/// the plain global-threshold filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LidsorParams {
    /// Neighbors per point. Must be >= 1 and smaller than the number of
    /// scored points.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Threshold multiplier `s` in `tau = mean + s * std_dev`.
    #[serde(default = "default_std_multiplier", alias = "s")]
    pub std_multiplier: f32,

    /// Divisor applied to intensity gaps before they join the spatial
    /// distance. `0` means intensity is ignored. Only used for 4-column
    /// clouds.
    #[serde(default)]
    pub scaling_factor: f32,

    /// Points at or beyond this range from the origin skip scoring and are
    /// always kept.
    #[serde(default)]
    pub max_range: Option<f32>,

    /// Scale the threshold per point by `range_multiplier * range`, so the
    /// tolerated neighbor spacing grows with distance from the sensor.
    #[serde(default)]
    pub range_multiplier: Option<f32>,

    /// Keep any point whose absolute intensity reaches this value.
    ///
    /// The comparison is `|intensity| >= intensity_rescue` on the raw
    /// intensity. `scaling_factor` does not enter it, so the rescue level is
    /// stated in the sensor's own intensity units and does not move when the
    /// distance weighting is retuned.
    #[serde(default)]
    pub intensity_rescue: Option<f32>,
}

impl Default for LidsorParams {
    fn default() -> Self {
        Self {
            k: default_k(),
            std_multiplier: default_std_multiplier(),
            scaling_factor: 0.0,
            max_range: None,
            range_multiplier: None,
            intensity_rescue: None,
        }
    }
}

impl LidsorParams {
    pub fn new(k: usize, std_multiplier: f32) -> Self {
        Self {
            k,
            std_multiplier,
            ..Self::default()
        }
    }

    pub fn with_scaling_factor(mut self, scaling_factor: f32) -> Self {
        self.scaling_factor = scaling_factor;
        self
    }

    pub fn with_max_range(mut self, max_range: f32) -> Self {
        self.max_range = Some(max_range);
        self
    }

    pub fn with_range_multiplier(mut self, range_multiplier: f32) -> Self {
        self.range_multiplier = Some(range_multiplier);
        self
    }

    pub fn with_intensity_rescue(mut self, intensity_rescue: f32) -> Self {
        self.intensity_rescue = Some(intensity_rescue);
        self
    }

    /// Check every parameter for range and finiteness.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(LidsorError::invalid("k must be >= 1, got 0"));
        }
        non_negative("s", self.std_multiplier)?;
        non_negative("scaling_factor", self.scaling_factor)?;
        if let Some(r) = self.max_range {
            positive("max_range", r)?;
        }
        if let Some(m) = self.range_multiplier {
            positive("range_multiplier", m)?;
        }
        if let Some(t) = self.intensity_rescue {
            non_negative("intensity_rescue", t)?;
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(LidsorError::invalid(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

fn positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LidsorError::invalid(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

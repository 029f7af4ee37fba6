//! FFB effect types

use crate::constants::INFINITE;
use serde::{Deserialize, Serialize};

/// Types of force feedback effects a host may ask for.
///
/// # Examples
///
/// ```
/// use gcadapter_ffb::EffectType;
///
/// assert!(EffectType::ConstantForce.is_supported());
/// assert!(EffectType::Square.is_supported());
/// assert!(!EffectType::Spring.is_supported());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectType {
    ConstantForce,
    RampForce,
    Square,
    Sine,
    Triangle,
    SawtoothUp,
    SawtoothDown,
    Spring,
    Damper,
    Inertia,
    Friction,
    CustomForce,
}

impl EffectType {
    /// Effect types a rumble motor can render. Everything else is rejected at
    /// download time.
    pub const SUPPORTED: [EffectType; 3] =
        [EffectType::ConstantForce, EffectType::Sine, EffectType::Square];

    /// Effect types advertised in the capabilities.
    pub const ADVERTISED: [EffectType; 2] = [EffectType::ConstantForce, EffectType::Sine];

    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }
}

/// Base parameters for an effect
///
/// Intensity and waveform fields are accepted for API compatibility; the
/// actuator only distinguishes on from off. `duration_us` drives the effect
/// timer.
///
/// # Examples
///
/// ```
/// use gcadapter_ffb::{EffectParams, INFINITE};
///
/// let params = EffectParams::new(250_000).with_gain(5_000);
/// assert!(params.is_finite());
/// assert_eq!(params.gain, 5_000);
///
/// assert!(!EffectParams::new(INFINITE).is_finite());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectParams {
    /// Play time of one iteration in microseconds, or [`INFINITE`].
    pub duration_us: u32,
    /// Gain in `0..=10_000`.
    pub gain: u32,
    pub sample_period_us: u32,
    pub start_delay_us: u32,
    pub trigger_button: Option<u32>,
    /// Direction in hundredths of a degree.
    pub direction: i32,
}

impl EffectParams {
    pub fn new(duration_us: u32) -> Self {
        Self {
            duration_us,
            gain: 10_000,
            sample_period_us: 0,
            start_delay_us: 0,
            trigger_button: None,
            direction: 0,
        }
    }

    pub fn with_gain(mut self, gain: u32) -> Self {
        self.gain = gain.min(10_000);
        self
    }

    pub fn with_direction(mut self, direction: i32) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_trigger_button(mut self, button: u32) -> Self {
        self.trigger_button = Some(button);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.duration_us != INFINITE
    }
}

impl Default for EffectParams {
    fn default() -> Self {
        Self::new(INFINITE)
    }
}

/// Flags accompanying a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DownloadFlags {
    /// Start the effect as soon as it is downloaded.
    pub start: bool,
}

impl DownloadFlags {
    pub const NONE: DownloadFlags = DownloadFlags { start: false };
    pub const START: DownloadFlags = DownloadFlags { start: true };
}

/// How a start request treats other playing effects.
///
/// With a single effect slot both modes behave the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartMode {
    #[default]
    Normal,
    Solo,
    DoNotDownload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_types() {
        let supported: Vec<EffectType> = [
            EffectType::ConstantForce,
            EffectType::RampForce,
            EffectType::Square,
            EffectType::Sine,
            EffectType::Triangle,
            EffectType::Spring,
            EffectType::CustomForce,
        ]
        .into_iter()
        .filter(|t| t.is_supported())
        .collect();
        assert_eq!(
            supported,
            vec![EffectType::ConstantForce, EffectType::Square, EffectType::Sine]
        );
    }

    #[test]
    fn test_advertised_is_subset_of_supported() {
        for t in EffectType::ADVERTISED {
            assert!(t.is_supported());
        }
    }

    #[test]
    fn test_gain_clamped() {
        assert_eq!(EffectParams::new(1).with_gain(20_000).gain, 10_000);
    }

    #[test]
    fn test_default_params_are_infinite() {
        assert!(!EffectParams::default().is_finite());
        assert_eq!(DownloadFlags::default(), DownloadFlags::NONE);
    }
}

//! Device state, effect status, commands and capability records.

use crate::effects::EffectType;
use serde::{Deserialize, Serialize};

/// Device state flags.
///
/// Several flags can be set at once (`PAUSED | ACTUATORS_OFF`); `EMPTY`,
/// `STOPPED` and `PAUSED` are assigned rather than or-ed by the matching
/// commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceState(pub u32);

impl DeviceState {
    pub const EMPTY: u32 = 0x0000_0001;
    pub const STOPPED: u32 = 0x0000_0002;
    pub const PAUSED: u32 = 0x0000_0004;
    pub const ACTUATORS_ON: u32 = 0x0000_0010;
    pub const ACTUATORS_OFF: u32 = 0x0000_0020;

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub fn is_paused(self) -> bool {
        self.contains(Self::PAUSED)
    }

    pub fn actuators_off(self) -> bool {
        self.contains(Self::ACTUATORS_OFF)
    }

    pub(crate) fn insert(&mut self, flag: u32) {
        self.0 |= flag;
    }

    pub(crate) fn remove(&mut self, flag: u32) {
        self.0 &= !flag;
    }
}

/// Play status of the downloaded effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EffectStatus {
    #[default]
    NotPlaying,
    Playing,
}

/// Device-wide commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FfCommand {
    Reset,
    StopAll,
    Pause,
    Continue,
    SetActuatorsOn,
    SetActuatorsOff,
}

/// Result of a device state query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStateReport {
    pub state: DeviceState,
    /// Percentage of effect storage in use.
    pub load: u32,
}

/// Four-part version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumVersion {
    pub major: u8,
    pub minor_and_bug: u8,
    pub stage: u8,
    pub non_release: u8,
}

impl NumVersion {
    pub const fn new(major: u8, minor_and_bug: u8, stage: u8, non_release: u8) -> Self {
        Self {
            major,
            minor_and_bug,
            stage,
            non_release,
        }
    }
}

/// Version of the effect API spoken and of this engine.
pub const API_VERSION: NumVersion = NumVersion::new(1, 0, 0, 0);
pub const ENGINE_VERSION: NumVersion = NumVersion::new(1, 0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceFeedbackVersion {
    pub api: NumVersion,
    pub engine: NumVersion,
}

/// Kind of feedback hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FfSubType {
    Kinesthetic,
    Vibration,
}

/// Axes an effect may be applied along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FfAxis {
    X,
    Y,
}

/// Static capability record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub spec_version: NumVersion,
    pub supported_effects: Vec<EffectType>,
    pub emulated_effects: Vec<EffectType>,
    pub sub_type: FfSubType,
    pub axes: Vec<FfAxis>,
    pub storage_capacity: u32,
    pub playback_capacity: u32,
    pub driver_version: NumVersion,
    pub hardware_version: NumVersion,
    pub firmware_version: NumVersion,
}

impl Capabilities {
    pub fn num_axes(&self) -> usize {
        self.axes.len()
    }
}

//! Fixed values of the effect API.

/// Duration or iteration count meaning "until stopped".
pub const INFINITE: u32 = u32::MAX;

/// The only download id ever handed out.
pub const EFFECT_ID: u32 = 1;

/// Number of effects the hardware can hold at once.
pub const MAX_EFFECTS: u32 = 1;

/// Class name a target must report to be driven by the engine.
pub const TARGET_CLASS: &str = "GCAdapterPort";

/// Load reported per downloaded effect, in percent.
pub const LOAD_PER_EFFECT: u32 = 100;

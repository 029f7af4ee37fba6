//! Effect state machine driving one on/off rumble actuator

use std::time::Instant;

use gcadapter_hid_wup028_protocol::PORT_RUMBLE_REPORT_ID;
use tracing::{debug, trace, warn};

use crate::constants::{EFFECT_ID, INFINITE, LOAD_PER_EFFECT, MAX_EFFECTS, TARGET_CLASS};
use crate::effects::{DownloadFlags, EffectParams, EffectType, StartMode};
use crate::state::{
    API_VERSION, Capabilities, DeviceState, DeviceStateReport, ENGINE_VERSION, EffectStatus,
    FfAxis, FfCommand, FfSubType, ForceFeedbackVersion, NumVersion,
};
use crate::timer::{EffectTimer, TimerTick};
use crate::{FfbError, FfbResult};

/// Output channel to the actuator of one port.
///
/// The engine writes two-byte reports `[PORT_RUMBLE_REPORT_ID, on]`.
pub trait RumbleLink: Send {
    fn write_output(&mut self, report: &[u8]) -> FfbResult<()>;

    /// Called once when the engine lets go of the link.
    fn close(&mut self) {}
}

/// A device the engine can be bound to.
pub trait ForceFeedbackTarget {
    fn class_name(&self) -> &str;

    fn open_rumble_link(&self) -> FfbResult<Box<dyn RumbleLink>>;
}

impl<T: ForceFeedbackTarget + ?Sized> ForceFeedbackTarget for &T {
    fn class_name(&self) -> &str {
        (**self).class_name()
    }

    fn open_rumble_link(&self) -> FfbResult<Box<dyn RumbleLink>> {
        (**self).open_rumble_link()
    }
}

#[derive(Debug, Default)]
struct EffectRecord {
    downloaded: bool,
    status: EffectStatus,
    effect_type: Option<EffectType>,
    params: Option<EffectParams>,
    timer: Option<EffectTimer>,
}

/// Force feedback object for one virtual port.
///
/// Holds a single effect slot. Whatever the effect describes, the actuator
/// ends up either on or off.
pub struct RumbleEffectEngine {
    link: Option<Box<dyn RumbleLink>>,
    state: DeviceState,
    effect: EffectRecord,
    downloaded_count: u32,
    actuator_on: bool,
}

impl Default for RumbleEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RumbleEffectEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RumbleEffectEngine")
            .field("initialized", &self.link.is_some())
            .field("state", &self.state)
            .field("effect", &self.effect)
            .field("downloaded_count", &self.downloaded_count)
            .field("actuator_on", &self.actuator_on)
            .finish()
    }
}

impl RumbleEffectEngine {
    pub fn new() -> Self {
        Self {
            link: None,
            state: DeviceState::default(),
            effect: EffectRecord::default(),
            downloaded_count: 0,
            actuator_on: false,
        }
    }

    /// Checks whether `target` can be driven by this engine.
    pub fn probe(target: &dyn ForceFeedbackTarget) -> FfbResult<()> {
        if target.class_name() == TARGET_CLASS {
            Ok(())
        } else {
            debug!(class = target.class_name(), "probe rejected target");
            Err(FfbError::NoInterface)
        }
    }

    /// Binds the engine to `target`, replacing any previous binding.
    pub fn initialize(&mut self, target: &dyn ForceFeedbackTarget) -> FfbResult<()> {
        if target.class_name() != TARGET_CLASS {
            warn!(
                class = target.class_name(),
                expected = TARGET_CLASS,
                "refusing to bind to target"
            );
            return Err(FfbError::NoInterface);
        }

        let link = target.open_rumble_link()?;
        self.release_link();
        self.link = Some(link);
        debug!("rumble engine initialized");
        Ok(())
    }

    /// Releases the link. The effect slot stays as it is.
    pub fn terminate(&mut self) {
        self.release_link();
        debug!("rumble engine terminated");
    }

    pub fn initialize_terminate(
        &mut self,
        target: &dyn ForceFeedbackTarget,
        begin: bool,
    ) -> FfbResult<()> {
        if begin {
            self.initialize(target)
        } else {
            self.terminate();
            Ok(())
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.link.is_some()
    }

    /// Downloads an effect into the single slot.
    ///
    /// `existing` carries the id of an effect being updated; `None` asks for
    /// a new slot. Returns the download id, which is always 1.
    pub fn download_effect(
        &mut self,
        effect_type: EffectType,
        params: &EffectParams,
        existing: Option<u32>,
        flags: DownloadFlags,
    ) -> FfbResult<u32> {
        debug!(
            ?effect_type,
            ?existing,
            duration_us = params.duration_us,
            gain = params.gain,
            start = flags.start,
            "download effect"
        );

        if !effect_type.is_supported() {
            return Err(FfbError::Unsupported);
        }
        if self.state.is_paused() {
            return Err(FfbError::DevicePaused);
        }
        match existing {
            Some(id) if id != EFFECT_ID => return Err(FfbError::InvalidDownloadId(id)),
            None if self.effect.downloaded => return Err(FfbError::OutOfMemory),
            _ => {}
        }

        let fresh = !self.effect.downloaded;

        self.effect.timer = params
            .is_finite()
            .then(|| EffectTimer::from_micros(params.duration_us));
        self.effect.effect_type = Some(effect_type);
        self.effect.params = Some(*params);

        if flags.start {
            self.write_actuator(true)?;
            self.effect.status = EffectStatus::Playing;
            if let Some(timer) = self.effect.timer.as_mut() {
                timer.arm(1, Instant::now());
            }
        }

        self.effect.downloaded = true;
        if fresh {
            self.downloaded_count += 1;
        }

        Ok(EFFECT_ID)
    }

    pub fn destroy_effect(&mut self, id: u32) -> FfbResult<()> {
        debug!(id, "destroy effect");

        if id != EFFECT_ID || !self.effect.downloaded {
            return Err(FfbError::InvalidParam);
        }

        self.effect.downloaded = false;
        self.effect.timer = None;
        self.downloaded_count = self.downloaded_count.saturating_sub(1);
        Ok(())
    }

    /// Starts the effect unless the device is paused.
    ///
    /// A finite `iterations` arms the effect timer, if the effect has one, so
    /// the effect stops after that many durations.
    pub fn start_effect(&mut self, id: u32, mode: StartMode, iterations: u32) -> FfbResult<()> {
        debug!(id, ?mode, iterations, "start effect");

        if id != EFFECT_ID {
            return Err(FfbError::InvalidDownloadId(id));
        }
        if self.state.is_paused() {
            return Ok(());
        }

        self.write_actuator(true)?;
        self.effect.status = EffectStatus::Playing;
        if iterations != INFINITE {
            if let Some(timer) = self.effect.timer.as_mut() {
                timer.arm(iterations, Instant::now());
            }
        }
        Ok(())
    }

    /// Stops the effect without discarding it.
    pub fn stop_effect(&mut self, id: u32) -> FfbResult<()> {
        debug!(id, "stop effect");

        if id != EFFECT_ID {
            return Err(FfbError::InvalidDownloadId(id));
        }

        self.effect.status = EffectStatus::NotPlaying;
        if let Some(timer) = self.effect.timer.as_mut() {
            timer.disarm();
        }
        self.write_actuator(false)
    }

    /// Applies a device-wide command, then writes the resulting actuator
    /// state.
    pub fn send_command(&mut self, command: FfCommand) -> FfbResult<()> {
        debug!(?command, "send command");

        match command {
            FfCommand::Reset => {
                self.effect = EffectRecord::default();
                self.downloaded_count = 0;
                self.state = DeviceState(DeviceState::EMPTY);
            }
            FfCommand::StopAll => {
                self.state = DeviceState(DeviceState::STOPPED);
                self.effect.status = EffectStatus::NotPlaying;
                if let Some(timer) = self.effect.timer.as_mut() {
                    timer.disarm();
                }
            }
            FfCommand::Pause => {
                self.state = DeviceState(DeviceState::PAUSED);
            }
            FfCommand::Continue => {
                self.state.remove(DeviceState::PAUSED);
            }
            FfCommand::SetActuatorsOn => {
                self.state.remove(DeviceState::ACTUATORS_OFF);
                self.state.insert(DeviceState::ACTUATORS_ON);
            }
            FfCommand::SetActuatorsOff => {
                self.state.remove(DeviceState::ACTUATORS_ON);
                self.state.insert(DeviceState::ACTUATORS_OFF);
            }
        }

        let on = match command {
            FfCommand::SetActuatorsOff => false,
            _ => self.wants_actuator(),
        };
        self.write_actuator(on)
    }

    pub fn get_effect_status(&self, id: u32) -> FfbResult<EffectStatus> {
        if id != EFFECT_ID || !self.effect.downloaded {
            return Err(FfbError::InvalidDownloadId(id));
        }
        Ok(self.effect.status)
    }

    pub fn get_capabilities(&self) -> Capabilities {
        Capabilities {
            spec_version: API_VERSION,
            supported_effects: EffectType::ADVERTISED.to_vec(),
            emulated_effects: Vec::new(),
            sub_type: FfSubType::Vibration,
            axes: vec![FfAxis::X],
            storage_capacity: MAX_EFFECTS,
            playback_capacity: MAX_EFFECTS,
            driver_version: ENGINE_VERSION,
            hardware_version: NumVersion::new(1, 0, 0, 0),
            firmware_version: NumVersion::new(1, 0, 0, 0),
        }
    }

    pub fn get_device_state(&self) -> DeviceStateReport {
        DeviceStateReport {
            state: self.state,
            load: self.downloaded_count * LOAD_PER_EFFECT,
        }
    }

    /// Vendor escapes are not implemented.
    pub fn escape(&mut self, id: u32, _command: u32, _data: &[u8]) -> FfbResult<Vec<u8>> {
        debug!(id, "escape");
        if id > EFFECT_ID {
            return Err(FfbError::InvalidDownloadId(id));
        }
        Err(FfbError::Unsupported)
    }

    pub fn set_property(&mut self, property: u32, _value: &[u8]) -> FfbResult<()> {
        debug!(property, "set property");
        Err(FfbError::Unsupported)
    }

    pub fn version(&self) -> ForceFeedbackVersion {
        ForceFeedbackVersion {
            api: API_VERSION,
            engine: ENGINE_VERSION,
        }
    }

    /// Performs one timer firing. The firing that uses up the last
    /// iteration stops the effect.
    pub fn fire_timer(&mut self) -> FfbResult<TimerTick> {
        self.advance_timer(1)
    }

    /// Fires every interval that has elapsed by `now`. Returns how many
    /// firings happened.
    pub fn poll_timer(&mut self, now: Instant) -> FfbResult<u32> {
        let due = self
            .effect
            .timer
            .as_ref()
            .map_or(0, |timer| timer.due_count(now));
        if due > 0 {
            self.advance_timer(due)?;
        }
        Ok(due)
    }

    fn advance_timer(&mut self, firings: u32) -> FfbResult<TimerTick> {
        let tick = match self.effect.timer.as_mut() {
            Some(timer) => timer.advance(firings),
            None => TimerTick::Idle,
        };
        debug!(firings, ?tick, remaining = ?self.timer_remaining(), "effect timer fired");

        if tick == TimerTick::Expired {
            self.stop_effect(EFFECT_ID)?;
        }
        Ok(tick)
    }

    /// Deadline of the next timer firing, if armed.
    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.effect.timer.as_ref().and_then(EffectTimer::next_due)
    }

    pub fn timer_remaining(&self) -> Option<u32> {
        self.effect.timer.as_ref().and_then(EffectTimer::remaining)
    }

    pub fn has_timer(&self) -> bool {
        self.effect.timer.is_some()
    }

    pub fn is_downloaded(&self) -> bool {
        self.effect.downloaded
    }

    pub fn effect_status(&self) -> EffectStatus {
        self.effect.status
    }

    pub fn downloaded_effect(&self) -> Option<(EffectType, EffectParams)> {
        if !self.effect.downloaded {
            return None;
        }
        self.effect.effect_type.zip(self.effect.params)
    }

    /// Last actuator state successfully written.
    pub fn is_actuator_on(&self) -> bool {
        self.actuator_on
    }

    fn wants_actuator(&self) -> bool {
        self.effect.status == EffectStatus::Playing && !self.state.is_paused()
    }

    fn write_actuator(&mut self, on: bool) -> FfbResult<()> {
        let link = self.link.as_mut().ok_or(FfbError::NoInterface)?;
        link.write_output(&[PORT_RUMBLE_REPORT_ID, u8::from(on)])?;
        trace!(on, "actuator written");
        self.actuator_on = on;
        Ok(())
    }

    fn release_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
        }
    }
}

impl Drop for RumbleEffectEngine {
    fn drop(&mut self) {
        self.release_link();
    }
}

/// In-memory targets and links for tests.
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct LinkLog {
        writes: Vec<Vec<u8>>,
        closed: u32,
        fail_writes: bool,
    }

    /// Link that records every report written through it.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingLink {
        log: Arc<Mutex<LinkLog>>,
    }

    impl RecordingLink {
        pub fn new() -> Self {
            Self::default()
        }

        fn with_log<R>(&self, f: impl FnOnce(&mut LinkLog) -> R) -> R {
            f(&mut self.log.lock())
        }

        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.with_log(|log| log.writes.clone())
        }

        /// Actuator states written so far, in order.
        pub fn actuator_states(&self) -> Vec<bool> {
            self.with_log(|log| {
                log.writes
                    .iter()
                    .filter_map(|w| w.get(1).map(|&b| b != 0))
                    .collect()
            })
        }

        pub fn last_state(&self) -> Option<bool> {
            self.actuator_states().last().copied()
        }

        pub fn clear(&self) {
            self.with_log(|log| log.writes.clear());
        }

        pub fn close_count(&self) -> u32 {
            self.with_log(|log| log.closed)
        }

        pub fn set_fail_writes(&self, fail: bool) {
            self.with_log(|log| log.fail_writes = fail);
        }
    }

    impl RumbleLink for RecordingLink {
        fn write_output(&mut self, report: &[u8]) -> FfbResult<()> {
            self.with_log(|log| {
                if log.fail_writes {
                    return Err(FfbError::Device("mock write failure".to_string()));
                }
                log.writes.push(report.to_vec());
                Ok(())
            })
        }

        fn close(&mut self) {
            self.with_log(|log| log.closed += 1);
        }
    }

    /// Target handing out clones of one [`RecordingLink`].
    #[derive(Debug, Clone)]
    pub struct MockTarget {
        class: String,
        link: RecordingLink,
    }

    impl MockTarget {
        pub fn new() -> Self {
            Self::with_class(TARGET_CLASS)
        }

        pub fn with_class(class: impl Into<String>) -> Self {
            Self {
                class: class.into(),
                link: RecordingLink::new(),
            }
        }

        pub fn link(&self) -> &RecordingLink {
            &self.link
        }
    }

    impl Default for MockTarget {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ForceFeedbackTarget for MockTarget {
        fn class_name(&self) -> &str {
            &self.class
        }

        fn open_rumble_link(&self) -> FfbResult<Box<dyn RumbleLink>> {
            Ok(Box::new(self.link.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTarget;
    use super::*;
    use std::time::Duration;

    const LONG_US: u32 = 3_600_000_000;

    fn engine() -> Result<(RumbleEffectEngine, MockTarget), FfbError> {
        let target = MockTarget::new();
        let mut engine = RumbleEffectEngine::new();
        engine.initialize(&target)?;
        Ok((engine, target))
    }

    #[test]
    fn test_wrong_class_is_rejected() {
        let target = MockTarget::with_class("IOHIDDevice");
        let mut engine = RumbleEffectEngine::new();
        assert_eq!(RumbleEffectEngine::probe(&target), Err(FfbError::NoInterface));
        assert_eq!(engine.initialize(&target), Err(FfbError::NoInterface));
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_download_unsupported_type() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        let result = engine.download_effect(
            EffectType::Spring,
            &EffectParams::default(),
            None,
            DownloadFlags::NONE,
        );
        assert_eq!(result, Err(FfbError::Unsupported));
        assert!(target.link().writes().is_empty());
        Ok(())
    }

    #[test]
    fn test_single_slot() -> Result<(), FfbError> {
        let (mut engine, _target) = engine()?;
        let params = EffectParams::default();

        assert_eq!(
            engine.download_effect(EffectType::Sine, &params, None, DownloadFlags::NONE)?,
            1
        );
        assert_eq!(
            engine.download_effect(EffectType::Sine, &params, None, DownloadFlags::NONE),
            Err(FfbError::OutOfMemory)
        );

        engine.destroy_effect(1)?;
        assert_eq!(
            engine.download_effect(EffectType::Square, &params, None, DownloadFlags::NONE)?,
            1
        );
        Ok(())
    }

    #[test]
    fn test_update_replaces_timer() -> Result<(), FfbError> {
        let (mut engine, _target) = engine()?;
        engine.download_effect(
            EffectType::ConstantForce,
            &EffectParams::new(LONG_US),
            None,
            DownloadFlags::NONE,
        )?;
        assert!(engine.has_timer());

        engine.download_effect(
            EffectType::ConstantForce,
            &EffectParams::default(),
            Some(1),
            DownloadFlags::NONE,
        )?;
        assert!(!engine.has_timer());
        assert_eq!(engine.get_device_state().load, 100);

        assert_eq!(
            engine.download_effect(
                EffectType::ConstantForce,
                &EffectParams::default(),
                Some(2),
                DownloadFlags::NONE,
            ),
            Err(FfbError::InvalidDownloadId(2))
        );
        Ok(())
    }

    #[test]
    fn test_download_with_start_plays_once() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::ConstantForce,
            &EffectParams::new(LONG_US),
            None,
            DownloadFlags::START,
        )?;

        assert_eq!(engine.get_effect_status(1)?, EffectStatus::Playing);
        assert_eq!(engine.timer_remaining(), Some(1));
        assert_eq!(target.link().writes(), vec![vec![0x60, 1]]);

        assert_eq!(engine.fire_timer()?, TimerTick::Expired);
        assert_eq!(engine.get_effect_status(1)?, EffectStatus::NotPlaying);
        assert_eq!(target.link().last_state(), Some(false));
        Ok(())
    }

    #[test]
    fn test_start_iterations_then_expire() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::new(LONG_US),
            None,
            DownloadFlags::NONE,
        )?;
        engine.start_effect(1, StartMode::Normal, 3)?;
        assert!(engine.is_actuator_on());

        assert_eq!(engine.fire_timer()?, TimerTick::Continue { remaining: 2 });
        assert_eq!(engine.fire_timer()?, TimerTick::Continue { remaining: 1 });
        assert!(engine.is_actuator_on());
        assert_eq!(engine.fire_timer()?, TimerTick::Expired);
        assert!(!engine.is_actuator_on());
        assert_eq!(target.link().actuator_states(), vec![true, false]);

        // Downloaded effect and its timer survive the stop.
        assert!(engine.is_downloaded());
        assert!(engine.has_timer());
        engine.start_effect(1, StartMode::Solo, 1)?;
        assert_eq!(engine.timer_remaining(), Some(1));
        Ok(())
    }

    #[test]
    fn test_infinite_iterations_do_not_arm() -> Result<(), FfbError> {
        let (mut engine, _target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::new(LONG_US),
            None,
            DownloadFlags::NONE,
        )?;
        engine.start_effect(1, StartMode::Normal, INFINITE)?;
        assert_eq!(engine.timer_remaining(), None);
        assert_eq!(engine.fire_timer()?, TimerTick::Idle);
        assert!(engine.is_actuator_on());
        Ok(())
    }

    #[test]
    fn test_poll_timer_fires_elapsed_intervals() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::ConstantForce,
            &EffectParams::new(10_000),
            None,
            DownloadFlags::NONE,
        )?;
        engine.start_effect(1, StartMode::Normal, 2)?;

        let deadline = engine.next_timer_deadline().ok_or(FfbError::InvalidParam)?;
        assert_eq!(engine.poll_timer(deadline - Duration::from_millis(5))?, 0);
        assert_eq!(engine.poll_timer(deadline + Duration::from_secs(1))?, 2);
        assert_eq!(engine.effect_status(), EffectStatus::NotPlaying);
        assert_eq!(target.link().last_state(), Some(false));
        Ok(())
    }

    #[test]
    fn test_poll_timer_catches_up_in_one_step() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::ConstantForce,
            &EffectParams::new(0),
            None,
            DownloadFlags::NONE,
        )?;
        engine.start_effect(1, StartMode::Normal, INFINITE - 1)?;

        assert_eq!(engine.poll_timer(Instant::now())?, INFINITE - 1);
        assert_eq!(engine.effect_status(), EffectStatus::NotPlaying);
        assert_eq!(engine.timer_remaining(), None);
        assert_eq!(target.link().actuator_states(), vec![true, false]);
        Ok(())
    }

    #[test]
    fn test_poll_timer_counts_partial_catch_up() -> Result<(), FfbError> {
        let (mut engine, _target) = engine()?;
        engine.download_effect(
            EffectType::ConstantForce,
            &EffectParams::new(10_000),
            None,
            DownloadFlags::NONE,
        )?;
        engine.start_effect(1, StartMode::Normal, 100)?;

        let deadline = engine.next_timer_deadline().ok_or(FfbError::InvalidParam)?;
        assert_eq!(engine.poll_timer(deadline + Duration::from_millis(25))?, 3);
        assert_eq!(engine.timer_remaining(), Some(97));
        assert_eq!(
            engine.next_timer_deadline(),
            Some(deadline + Duration::from_millis(30))
        );
        assert_eq!(engine.effect_status(), EffectStatus::Playing);
        Ok(())
    }

    #[test]
    fn test_paused_device() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::default(),
            None,
            DownloadFlags::NONE,
        )?;
        engine.send_command(FfCommand::Pause)?;
        assert!(engine.get_device_state().state.is_paused());

        engine.start_effect(1, StartMode::Normal, INFINITE)?;
        assert_eq!(engine.effect_status(), EffectStatus::NotPlaying);
        assert_eq!(
            engine.download_effect(
                EffectType::Sine,
                &EffectParams::default(),
                Some(1),
                DownloadFlags::NONE
            ),
            Err(FfbError::DevicePaused)
        );
        assert_eq!(target.link().actuator_states(), vec![false]);
        Ok(())
    }

    #[test]
    fn test_continue_reasserts_playing_effect() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::default(),
            None,
            DownloadFlags::START,
        )?;
        engine.send_command(FfCommand::Pause)?;
        assert!(!engine.is_actuator_on());
        engine.send_command(FfCommand::Continue)?;
        assert!(engine.is_actuator_on());
        assert_eq!(target.link().actuator_states(), vec![true, false, true]);
        Ok(())
    }

    #[test]
    fn test_actuators_off_masks_output() -> Result<(), FfbError> {
        let (mut engine, _target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::default(),
            None,
            DownloadFlags::START,
        )?;
        engine.send_command(FfCommand::SetActuatorsOff)?;
        assert!(!engine.is_actuator_on());
        assert!(engine.get_device_state().state.actuators_off());

        engine.send_command(FfCommand::SetActuatorsOn)?;
        assert!(engine.is_actuator_on());
        assert!(
            engine
                .get_device_state()
                .state
                .contains(DeviceState::ACTUATORS_ON)
        );
        Ok(())
    }

    #[test]
    fn test_continue_after_actuators_off_turns_motor_on() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::default(),
            None,
            DownloadFlags::START,
        )?;
        engine.send_command(FfCommand::SetActuatorsOff)?;
        engine.send_command(FfCommand::Continue)?;

        assert!(engine.get_device_state().state.actuators_off());
        assert!(engine.is_actuator_on());
        assert_eq!(target.link().actuator_states(), vec![true, false, true]);
        Ok(())
    }

    #[test]
    fn test_reset_and_stop_all() -> Result<(), FfbError> {
        let (mut engine, _target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::new(LONG_US),
            None,
            DownloadFlags::START,
        )?;

        engine.send_command(FfCommand::StopAll)?;
        assert_eq!(engine.get_device_state().state, DeviceState(DeviceState::STOPPED));
        assert_eq!(engine.get_effect_status(1)?, EffectStatus::NotPlaying);
        assert!(!engine.is_actuator_on());

        engine.send_command(FfCommand::Reset)?;
        let report = engine.get_device_state();
        assert_eq!(report.state, DeviceState(DeviceState::EMPTY));
        assert_eq!(report.load, 0);
        assert!(!engine.has_timer());
        assert_eq!(engine.get_effect_status(1), Err(FfbError::InvalidDownloadId(1)));
        Ok(())
    }

    #[test]
    fn test_destroy_rules() -> Result<(), FfbError> {
        let (mut engine, _target) = engine()?;
        assert_eq!(engine.destroy_effect(1), Err(FfbError::InvalidParam));

        engine.download_effect(
            EffectType::Sine,
            &EffectParams::new(LONG_US),
            None,
            DownloadFlags::NONE,
        )?;
        assert_eq!(engine.destroy_effect(2), Err(FfbError::InvalidParam));
        engine.destroy_effect(1)?;
        assert!(!engine.has_timer());
        assert_eq!(engine.get_device_state().load, 0);
        assert_eq!(engine.destroy_effect(1), Err(FfbError::InvalidParam));
        Ok(())
    }

    #[test]
    fn test_invalid_ids() -> Result<(), FfbError> {
        let (mut engine, _target) = engine()?;
        assert_eq!(
            engine.start_effect(0, StartMode::Normal, 1),
            Err(FfbError::InvalidDownloadId(0))
        );
        assert_eq!(engine.stop_effect(5), Err(FfbError::InvalidDownloadId(5)));
        assert_eq!(engine.escape(2, 0, &[]), Err(FfbError::InvalidDownloadId(2)));
        assert_eq!(engine.escape(1, 0, &[]), Err(FfbError::Unsupported));
        assert_eq!(engine.set_property(1, &[]), Err(FfbError::Unsupported));
        Ok(())
    }

    #[test]
    fn test_write_without_link() {
        let mut engine = RumbleEffectEngine::new();
        assert_eq!(engine.stop_effect(1), Err(FfbError::NoInterface));
        assert!(!engine.is_actuator_on());
    }

    #[test]
    fn test_write_failure_propagates() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        target.link().set_fail_writes(true);
        assert!(matches!(
            engine.start_effect(1, StartMode::Normal, INFINITE),
            Err(FfbError::Device(_))
        ));
        assert!(!engine.is_actuator_on());
        Ok(())
    }

    #[test]
    fn test_terminate_closes_link() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::default(),
            None,
            DownloadFlags::NONE,
        )?;
        engine.initialize_terminate(&target, false)?;
        assert!(!engine.is_initialized());
        assert_eq!(target.link().close_count(), 1);
        drop(engine);
        assert_eq!(target.link().close_count(), 1);
        Ok(())
    }

    #[test]
    fn test_effect_survives_terminate_and_rebind() -> Result<(), FfbError> {
        let (mut engine, target) = engine()?;
        engine.download_effect(
            EffectType::Sine,
            &EffectParams::new(LONG_US),
            None,
            DownloadFlags::START,
        )?;

        engine.initialize_terminate(&target, false)?;
        assert!(engine.is_downloaded());
        assert!(engine.has_timer());
        assert_eq!(engine.get_effect_status(1)?, EffectStatus::Playing);
        assert_eq!(engine.get_device_state().load, 100);

        engine.initialize_terminate(&target, true)?;
        engine.stop_effect(1)?;
        assert_eq!(target.link().actuator_states(), vec![true, false]);
        assert_eq!(
            engine.download_effect(
                EffectType::Sine,
                &EffectParams::default(),
                None,
                DownloadFlags::NONE
            ),
            Err(FfbError::OutOfMemory)
        );
        Ok(())
    }

    #[test]
    fn test_capabilities_and_version() -> Result<(), FfbError> {
        let (engine, _target) = engine()?;
        let caps = engine.get_capabilities();
        assert_eq!(
            caps.supported_effects,
            vec![EffectType::ConstantForce, EffectType::Sine]
        );
        assert_eq!(caps.axes, vec![FfAxis::X]);
        assert_eq!(caps.storage_capacity, 1);
        assert_eq!(caps.playback_capacity, 1);
        assert_eq!(caps.hardware_version.major, 1);
        assert_eq!(engine.version().api, API_VERSION);
        Ok(())
    }
}

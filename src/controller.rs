//! Device cycling controller.
//!
//! Composition logic run once per hotkey firing: read the enabled-device
//! list, intersect it with the live active set, pick the next device, apply
//! it, persist the new default, and tell the UI. Everything happens
//! synchronously on the dispatcher thread, one event at a time.

use crate::audio::DeviceFlow;
use crate::settings::SettingsStore;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The audio operations the controller needs. The production
/// implementation is [`crate::audio::AudioDeviceService`]; tests substitute
/// an in-memory fake.
pub trait AudioSwitching: Send + Sync {
    /// Names of active devices for a flow, in OS enumeration order.
    fn active_device_names(&self, flow: DeviceFlow) -> Vec<String>;

    /// Name of the current default device for a flow.
    fn default_device_name(&self, flow: DeviceFlow) -> Option<String>;

    /// Request the default switch. True means accepted for dispatch.
    fn set_default_device(&self, flow: DeviceFlow, name: &str) -> bool;
}

#[cfg(windows)]
impl AudioSwitching for crate::audio::AudioDeviceService {
    fn active_device_names(&self, flow: DeviceFlow) -> Vec<String> {
        match self.device_names(flow) {
            Ok(names) => names,
            Err(e) => {
                warn!(?flow, error = %e, "device enumeration failed");
                Vec::new()
            }
        }
    }

    fn default_device_name(&self, flow: DeviceFlow) -> Option<String> {
        match self.default_device(flow) {
            Ok(device) => device.map(|d| d.name),
            Err(e) => {
                warn!(?flow, error = %e, "default device lookup failed");
                None
            }
        }
    }

    fn set_default_device(&self, flow: DeviceFlow, name: &str) -> bool {
        crate::audio::AudioDeviceService::set_default_device(self, flow, name)
    }
}

/// Emitted after a successful switch; drives the notification popup and the
/// settings window's default indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchNotice {
    pub flow: DeviceFlow,
    pub device: String,
}

/// Pick the next device in the cycle set after `current`.
///
/// A current device that is not in the set (removed, renamed, or never
/// enabled) restarts the cycle at index 0 instead of failing, so N
/// consecutive calls always walk the full set with period N.
pub fn next_device<'a>(cycle_set: &'a [String], current: Option<&str>) -> Option<&'a str> {
    if cycle_set.is_empty() {
        return None;
    }
    let next_index = match current.and_then(|name| cycle_set.iter().position(|d| d == name)) {
        Some(current_index) => (current_index + 1) % cycle_set.len(),
        None => 0,
    };
    Some(cycle_set[next_index].as_str())
}

/// Cycles the default device for one flow per invocation.
pub struct CyclingController<A> {
    audio: Arc<A>,
    store: Arc<SettingsStore>,
    notices: Sender<SwitchNotice>,
}

impl<A: AudioSwitching> CyclingController<A> {
    pub fn new(audio: Arc<A>, store: Arc<SettingsStore>, notices: Sender<SwitchNotice>) -> Self {
        Self {
            audio,
            store,
            notices,
        }
    }

    /// Cycle the default device for a flow. Failures abort with no side
    /// effects beyond a log line; nothing escapes to the caller.
    pub fn cycle(&self, flow: DeviceFlow) {
        let (enabled_key, default_key) = match flow {
            DeviceFlow::Playback => ("enabledDevices", "defaultPlayback"),
            DeviceFlow::Capture => ("enabledInputDevices", "defaultInput"),
        };

        // Enabled order is the cycling order; names no longer active drop out.
        let active = self.audio.active_device_names(flow);
        let cycle_set: Vec<String> = self
            .store
            .get_string_list(enabled_key)
            .into_iter()
            .filter(|name| active.contains(name))
            .collect();

        if cycle_set.is_empty() {
            debug!(?flow, "no enabled devices to cycle");
            return;
        }

        let current = self.audio.default_device_name(flow);
        let Some(next) = next_device(&cycle_set, current.as_deref()) else {
            return;
        };

        if !self.audio.set_default_device(flow, next) {
            warn!(?flow, device = %next, "switch request rejected, keeping current default");
            return;
        }

        // Persisted optimistically: the OS call is fire-and-forget and the
        // switch may still be in flight at this point.
        self.store.set_string(default_key, next);
        info!(?flow, device = %next, "switched default device");

        let _ = self.notices.send(SwitchNotice {
            flow,
            device: next.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeAudio {
        active: Mutex<Vec<String>>,
        default: Mutex<Option<String>>,
        reject_switches: bool,
        switch_calls: Mutex<Vec<String>>,
    }

    impl FakeAudio {
        fn with_devices(names: &[&str]) -> Self {
            Self {
                active: Mutex::new(names.iter().map(|s| s.to_string()).collect()),
                ..Self::default()
            }
        }

        fn set_current_default(&self, name: &str) {
            *self.default.lock().unwrap() = Some(name.to_string());
        }

        fn switch_calls(&self) -> Vec<String> {
            self.switch_calls.lock().unwrap().clone()
        }
    }

    impl AudioSwitching for FakeAudio {
        fn active_device_names(&self, _flow: DeviceFlow) -> Vec<String> {
            self.active.lock().unwrap().clone()
        }

        fn default_device_name(&self, _flow: DeviceFlow) -> Option<String> {
            self.default.lock().unwrap().clone()
        }

        fn set_default_device(&self, _flow: DeviceFlow, name: &str) -> bool {
            self.switch_calls.lock().unwrap().push(name.to_string());
            if self.reject_switches {
                return false;
            }
            *self.default.lock().unwrap() = Some(name.to_string());
            true
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        audio: Arc<FakeAudio>,
        store: Arc<SettingsStore>,
        controller: CyclingController<FakeAudio>,
        notices: std::sync::mpsc::Receiver<SwitchNotice>,
    }

    fn fixture(audio: FakeAudio, enabled: &[&str]) -> Fixture {
        let dir = tempdir().unwrap();
        let store = Arc::new(SettingsStore::with_path(dir.path().join("settings.json")));
        let enabled: Vec<String> = enabled.iter().map(|s| s.to_string()).collect();
        store.set_string_list("enabledDevices", &enabled);
        store.set_string_list("enabledInputDevices", &enabled);

        let audio = Arc::new(audio);
        let (tx, rx) = channel();
        let controller = CyclingController::new(audio.clone(), store.clone(), tx);
        Fixture {
            _dir: dir,
            audio,
            store,
            controller,
            notices: rx,
        }
    }

    #[test]
    fn next_device_advances_in_order() {
        let set: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_device(&set, Some("B")), Some("C"));
        assert_eq!(next_device(&set, Some("C")), Some("A"));
    }

    #[test]
    fn next_device_restarts_when_current_missing() {
        let set: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_device(&set, Some("Z")), Some("A"));
        assert_eq!(next_device(&set, None), Some("A"));
    }

    #[test]
    fn next_device_on_empty_set_is_none() {
        assert_eq!(next_device(&[], Some("A")), None);
        assert_eq!(next_device(&[], None), None);
    }

    #[test]
    fn full_cycle_has_period_n() {
        let f = fixture(FakeAudio::with_devices(&["A", "B", "C"]), &["A", "B", "C"]);
        f.audio.set_current_default("A");

        let mut seen = Vec::new();
        for _ in 0..3 {
            f.controller.cycle(DeviceFlow::Playback);
            seen.push(f.audio.default_device_name(DeviceFlow::Playback).unwrap());
        }
        assert_eq!(seen, ["B", "C", "A"]);

        // the next pass repeats the same sequence
        for expected in ["B", "C", "A"] {
            f.controller.cycle(DeviceFlow::Playback);
            assert_eq!(
                f.audio.default_device_name(DeviceFlow::Playback).as_deref(),
                Some(expected)
            );
        }
    }

    #[test]
    fn unknown_current_default_starts_at_first_enabled() {
        let f = fixture(FakeAudio::with_devices(&["A", "B", "C"]), &["A", "B", "C"]);
        f.audio.set_current_default("Z");

        f.controller.cycle(DeviceFlow::Playback);
        assert_eq!(f.audio.switch_calls(), ["A"]);
    }

    #[test]
    fn empty_enabled_set_is_a_no_op() {
        let f = fixture(FakeAudio::with_devices(&["A", "B"]), &[]);
        f.audio.set_current_default("A");

        f.controller.cycle(DeviceFlow::Playback);

        assert!(f.audio.switch_calls().is_empty());
        assert_eq!(f.store.get_string("defaultPlayback"), None);
        assert!(f.notices.try_recv().is_err());
    }

    #[test]
    fn disconnected_devices_drop_out_of_the_cycle() {
        let f = fixture(
            FakeAudio::with_devices(&["A", "C", "X"]),
            &["A", "Gone", "C"],
        );
        f.audio.set_current_default("A");

        f.controller.cycle(DeviceFlow::Playback);
        assert_eq!(f.audio.switch_calls(), ["C"]);
    }

    #[test]
    fn successful_switch_persists_and_notifies() {
        let f = fixture(FakeAudio::with_devices(&["A", "B"]), &["A", "B"]);
        f.audio.set_current_default("A");

        f.controller.cycle(DeviceFlow::Playback);

        assert_eq!(f.store.get_string("defaultPlayback").as_deref(), Some("B"));
        assert_eq!(
            f.notices.try_recv().unwrap(),
            SwitchNotice {
                flow: DeviceFlow::Playback,
                device: "B".to_string()
            }
        );
    }

    #[test]
    fn rejected_switch_leaves_settings_untouched() {
        let audio = FakeAudio {
            reject_switches: true,
            ..FakeAudio::with_devices(&["A", "B"])
        };
        let f = fixture(audio, &["A", "B"]);
        f.audio.set_current_default("A");

        f.controller.cycle(DeviceFlow::Playback);

        assert_eq!(f.audio.switch_calls(), ["B"]);
        assert_eq!(f.store.get_string("defaultPlayback"), None);
        assert!(f.notices.try_recv().is_err());
    }

    #[test]
    fn input_flow_uses_input_keys() {
        let f = fixture(FakeAudio::with_devices(&["Mic A", "Mic B"]), &["Mic A", "Mic B"]);
        f.audio.set_current_default("Mic A");

        f.controller.cycle(DeviceFlow::Capture);

        assert_eq!(f.store.get_string("defaultInput").as_deref(), Some("Mic B"));
        assert_eq!(f.store.get_string("defaultPlayback"), None);
    }
}

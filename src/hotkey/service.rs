//! OS-level hotkey registration and dispatch.
//!
//! `RegisterHotKey` ties registrations to the thread that owns the message
//! queue, so the service runs a dedicated listener thread: registration
//! commands are marshaled onto it over a channel, and fired chords come back
//! out as [`HotkeySlot`] values on the event channel. The UI never blocks on
//! key delivery and the listener never touches UI state.

use super::chord::HotKeyChord;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::{debug, error, warn};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetMessageW, PeekMessageW, PostThreadMessageW, MSG, PM_NOREMOVE, WM_HOTKEY, WM_NULL, WM_USER,
};

/// The two independent chord slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeySlot {
    /// Cycles the default playback device.
    Output,
    /// Cycles the default input device.
    Input,
}

impl HotkeySlot {
    fn id(self) -> i32 {
        match self {
            HotkeySlot::Output => 1,
            HotkeySlot::Input => 2,
        }
    }

    fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(HotkeySlot::Output),
            2 => Some(HotkeySlot::Input),
            _ => None,
        }
    }
}

/// Hotkey service error types.
#[derive(Debug, Error)]
pub enum HotkeyError {
    /// The OS refused the registration, typically because another
    /// application owns the chord.
    #[error("failed to register hotkey '{chord}': {source}")]
    RegistrationFailed {
        chord: String,
        #[source]
        source: windows::core::Error,
    },

    #[error("hotkey listener thread is not running")]
    ListenerGone,
}

enum Command {
    Register {
        slot: HotkeySlot,
        chord: HotKeyChord,
        respond: Sender<Result<(), HotkeyError>>,
    },
    Unregister {
        slot: HotkeySlot,
    },
    Shutdown,
}

/// Global hotkey service. Owns the listener thread for the lifetime of the
/// value; dropping it unregisters both slots and stops the thread.
pub struct HotkeyService {
    commands: Sender<Command>,
    thread_id: u32,
    handle: Option<JoinHandle<()>>,
}

impl HotkeyService {
    /// Start the listener thread. Returns the service handle and the
    /// receiver on which fired slots are delivered.
    pub fn new() -> Result<(Self, Receiver<HotkeySlot>), HotkeyError> {
        let (command_tx, command_rx) = channel::<Command>();
        let (event_tx, event_rx) = channel::<HotkeySlot>();
        let (ready_tx, ready_rx) = channel::<u32>();

        let handle = std::thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || listener_loop(command_rx, event_tx, ready_tx))
            .map_err(|_| HotkeyError::ListenerGone)?;

        let thread_id = ready_rx.recv().map_err(|_| HotkeyError::ListenerGone)?;

        Ok((
            Self {
                commands: command_tx,
                thread_id,
                handle: Some(handle),
            },
            event_rx,
        ))
    }

    /// Register a chord for a slot. An existing registration on the same
    /// slot is replaced first. Errors propagate so the settings UI can
    /// annotate the chord text.
    pub fn register(&self, slot: HotkeySlot, chord: HotKeyChord) -> Result<(), HotkeyError> {
        let (respond_tx, respond_rx) = channel();
        self.send(Command::Register {
            slot,
            chord,
            respond: respond_tx,
        })?;
        respond_rx.recv().map_err(|_| HotkeyError::ListenerGone)?
    }

    /// Unregister a slot. No-op if nothing is registered.
    pub fn unregister(&self, slot: HotkeySlot) -> Result<(), HotkeyError> {
        self.send(Command::Unregister { slot })
    }

    fn send(&self, command: Command) -> Result<(), HotkeyError> {
        self.commands
            .send(command)
            .map_err(|_| HotkeyError::ListenerGone)?;
        self.wake()
    }

    fn wake(&self) -> Result<(), HotkeyError> {
        unsafe {
            PostThreadMessageW(self.thread_id, WM_NULL, WPARAM(0), LPARAM(0))
                .map_err(|_| HotkeyError::ListenerGone)
        }
    }
}

impl Drop for HotkeyService {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        let _ = self.wake();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn listener_loop(
    commands: Receiver<Command>,
    events: Sender<HotkeySlot>,
    ready: Sender<u32>,
) {
    unsafe {
        // Force creation of this thread's message queue before publishing
        // the thread id; wake messages posted earlier would be lost.
        let mut msg = MSG::default();
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
        let _ = ready.send(GetCurrentThreadId());

        // Tracks which slots currently hold an OS registration.
        let mut registered = [false; 2];

        loop {
            let result = GetMessageW(&mut msg, None, 0, 0);
            if result.0 == 0 {
                break;
            }
            if result.0 == -1 {
                error!("hotkey message loop failed, stopping listener");
                break;
            }

            match msg.message {
                WM_HOTKEY => {
                    if let Some(slot) = HotkeySlot::from_id(msg.wParam.0 as i32) {
                        debug!(?slot, "hotkey fired");
                        if events.send(slot).is_err() {
                            break;
                        }
                    }
                }
                WM_NULL => {
                    let mut shutdown = false;
                    while let Ok(command) = commands.try_recv() {
                        match command {
                            Command::Register {
                                slot,
                                chord,
                                respond,
                            } => {
                                let result = register_slot(&mut registered, slot, chord);
                                let _ = respond.send(result);
                            }
                            Command::Unregister { slot } => {
                                unregister_slot(&mut registered, slot);
                            }
                            Command::Shutdown => shutdown = true,
                        }
                    }
                    if shutdown {
                        break;
                    }
                }
                _ => {}
            }
        }

        unregister_slot(&mut registered, HotkeySlot::Output);
        unregister_slot(&mut registered, HotkeySlot::Input);
    }
}

fn register_slot(
    registered: &mut [bool; 2],
    slot: HotkeySlot,
    chord: HotKeyChord,
) -> Result<(), HotkeyError> {
    unregister_slot(registered, slot);

    unsafe {
        RegisterHotKey(
            None,
            slot.id(),
            HOT_KEY_MODIFIERS(chord.modifiers.flags()),
            chord.key.virtual_key(),
        )
        .map_err(|source| HotkeyError::RegistrationFailed {
            chord: chord.to_string(),
            source,
        })?;
    }

    registered[(slot.id() - 1) as usize] = true;
    debug!(?slot, %chord, "registered hotkey");
    Ok(())
}

fn unregister_slot(registered: &mut [bool; 2], slot: HotkeySlot) {
    let index = (slot.id() - 1) as usize;
    if !registered[index] {
        return;
    }
    unsafe {
        if let Err(e) = UnregisterHotKey(None, slot.id()) {
            warn!(?slot, error = %e, "failed to unregister hotkey");
        }
    }
    registered[index] = false;
}

//! Thin safe layer over `alsa-sys`.
//!
//! Only the calls the pause/resume test needs are wrapped. Handles and
//! parameter structures free themselves on drop.

use alsa_sys as sys;

use std::ffi::CStr;
use std::fmt;

mod control;
mod pcm;

pub use control::{cards, Cards, Control};
pub use pcm::{HwParams, Pcm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Playback,
    Capture,
}

impl Stream {
    fn raw(self) -> sys::snd_pcm_stream_t {
        match self {
            Stream::Playback => sys::SND_PCM_STREAM_PLAYBACK,
            Stream::Capture => sys::SND_PCM_STREAM_CAPTURE,
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Playback => write!(f, "playback"),
            Stream::Capture => write!(f, "capture"),
        }
    }
}

/// Sample formats the test knows how to negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    S16LE,
    S32LE,
}

impl Format {
    pub fn sample_bytes(self) -> usize {
        match self {
            Format::S16LE => 2,
            Format::S32LE => 4,
        }
    }

    fn raw(self) -> sys::snd_pcm_format_t {
        match self {
            Format::S16LE => sys::SND_PCM_FORMAT_S16_LE,
            Format::S32LE => sys::SND_PCM_FORMAT_S32_LE,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::S16LE => write!(f, "S16_LE"),
            Format::S32LE => write!(f, "S32_LE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Open,
    Setup,
    Prepared,
    Running,
    Xrun,
    Draining,
    Paused,
    Suspended,
    Disconnected,
    Unknown(u32),
}

impl From<sys::snd_pcm_state_t> for State {
    fn from(raw: sys::snd_pcm_state_t) -> Self {
        match raw {
            sys::SND_PCM_STATE_OPEN => State::Open,
            sys::SND_PCM_STATE_SETUP => State::Setup,
            sys::SND_PCM_STATE_PREPARED => State::Prepared,
            sys::SND_PCM_STATE_RUNNING => State::Running,
            sys::SND_PCM_STATE_XRUN => State::Xrun,
            sys::SND_PCM_STATE_DRAINING => State::Draining,
            sys::SND_PCM_STATE_PAUSED => State::Paused,
            sys::SND_PCM_STATE_SUSPENDED => State::Suspended,
            sys::SND_PCM_STATE_DISCONNECTED => State::Disconnected,
            other => State::Unknown(other as u32),
        }
    }
}

/// The driver's text for a negative error code.
pub fn strerror(code: i32) -> String {
    unsafe {
        let msg = sys::snd_strerror(code);
        if msg.is_null() {
            return format!("error {code}");
        }
        CStr::from_ptr(msg).to_string_lossy().into_owned()
    }
}

/// Stops alsa-lib from printing its own diagnostics to stderr; failures are
/// reported through our errors instead.
pub fn silence_driver_errors() {
    unsafe {
        sys::snd_lib_error_set_handler(None);
    }
}

use thiserror::Error;

use crate::alsa::Stream;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A driver call returned a negative error code.
    #[error("{op} failed: {message}")]
    Alsa {
        op: &'static str,
        code: i32,
        message: String,
    },

    #[error("unsupported format for {stream} device {device}")]
    UnsupportedFormat { device: String, stream: Stream },

    #[error("unsupported number of channels for {stream} device {device}")]
    UnsupportedChannels { device: String, stream: Stream },

    #[error("{device}: {source}")]
    Device {
        device: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{action} {device} failed at iteration {iteration}: {source}")]
    Cycle {
        action: &'static str,
        device: String,
        iteration: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("{device} did not reach the running state within {waited_ms} ms")]
    NotRunning { device: String, waited_ms: u128 },

    #[error("{worker} worker panicked")]
    WorkerPanicked { worker: &'static str },

    #[error("invalid device name: {0}")]
    InvalidName(String),

    #[error("No playback or capture devices found.")]
    NoDevices,
}

impl Error {
    /// Wraps `code` with the driver's description of it.
    pub fn alsa(op: &'static str, code: i32) -> Self {
        Self::Alsa {
            op,
            code,
            message: crate::alsa::strerror(code),
        }
    }

    /// Names the device a driver error came from. Other variants already carry it.
    pub fn on_device(self, device: impl ToString) -> Self {
        match self {
            Self::Alsa { .. } => Self::Device {
                device: device.to_string(),
                source: Box::new(self),
            },
            other => other,
        }
    }

    /// Driver error code, looking through device context.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Alsa { code, .. } => Some(*code),
            Self::Device { source, .. } | Self::Cycle { source, .. } => source.code(),
            _ => None,
        }
    }

    /// Overrun/underrun or a suspended stream; both are handled by `snd_pcm_recover`.
    pub fn is_xrun(&self) -> bool {
        matches!(self.code(), Some(c) if c == -libc::EPIPE || c == -libc::ESTRPIPE)
    }

    /// Non-blocking transfer found no room or no data.
    pub fn is_again(&self) -> bool {
        self.code() == Some(-libc::EAGAIN)
    }
}

/// Converts a driver return value into a `Result`, keeping non-negative values.
pub(crate) fn check(op: &'static str, ret: libc::c_int) -> Result<libc::c_int> {
    if ret < 0 {
        Err(Error::alsa(op, ret))
    } else {
        Ok(ret)
    }
}

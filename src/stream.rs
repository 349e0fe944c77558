use crate::alsa::{Pcm, State};
use crate::error::{Error, Result};

/// The operations the workers and the pause/resume cycle need from a PCM.
///
/// Implemented by [`Pcm`]; tests drive the same code with scripted streams.
pub trait PcmStream: Sync {
    fn name(&self) -> &str;
    fn state(&self) -> State;
    fn pause(&self, enable: bool) -> Result<()>;
    fn wait(&self, timeout_ms: i32) -> Result<bool>;
    fn writei(&self, data: &[u8], frames: usize) -> Result<usize>;
    fn readi(&self, data: &mut [u8], frames: usize) -> Result<usize>;
    fn recover(&self, err: &Error) -> Result<()>;
}

impl PcmStream for Pcm {
    fn name(&self) -> &str {
        Pcm::name(self)
    }

    fn state(&self) -> State {
        Pcm::state(self)
    }

    fn pause(&self, enable: bool) -> Result<()> {
        Pcm::pause(self, enable)
    }

    fn wait(&self, timeout_ms: i32) -> Result<bool> {
        Pcm::wait(self, timeout_ms)
    }

    fn writei(&self, data: &[u8], frames: usize) -> Result<usize> {
        Pcm::writei(self, data, frames)
    }

    fn readi(&self, data: &mut [u8], frames: usize) -> Result<usize> {
        Pcm::readi(self, data, frames)
    }

    fn recover(&self, err: &Error) -> Result<()> {
        Pcm::recover(self, err)
    }
}

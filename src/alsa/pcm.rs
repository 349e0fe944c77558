use alsa_sys as sys;
use libc::{c_int, c_uint};

use std::ffi::CString;
use std::ptr;

use super::{Format, State, Stream};
use crate::error::{check, Error, Result};

const PCM_NONBLOCK: c_int = 0x0001;

/// An open PCM handle.
pub struct Pcm {
    handle: *mut sys::snd_pcm_t,
    name: String,
    stream: Stream,
}

// SAFETY: alsa-lib serialises calls made on one handle from several threads
// (its per-handle lock is on by default), which is what the workers rely on
// while the control thread pauses and resumes.
unsafe impl Send for Pcm {}
unsafe impl Sync for Pcm {}

impl Pcm {
    pub fn open(name: &str, stream: Stream, nonblock: bool) -> Result<Self> {
        let c_name = CString::new(name).map_err(|_| Error::InvalidName(name.to_string()))?;
        let mode = if nonblock { PCM_NONBLOCK } else { 0 };
        let mut handle = ptr::null_mut();
        check("snd_pcm_open", unsafe {
            sys::snd_pcm_open(&mut handle, c_name.as_ptr(), stream.raw(), mode)
        })?;
        Ok(Self {
            handle,
            name: name.to_string(),
            stream,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Full configuration space of the device.
    pub fn hw_params_any(&self) -> Result<HwParams<'_>> {
        let mut params = ptr::null_mut();
        check("snd_pcm_hw_params_malloc", unsafe {
            sys::snd_pcm_hw_params_malloc(&mut params)
        })?;
        let params = HwParams { pcm: self, params };
        check("snd_pcm_hw_params_any", unsafe {
            sys::snd_pcm_hw_params_any(self.handle, params.params)
        })?;
        Ok(params)
    }

    /// Writes the chosen parameters to the device.
    pub fn install(&self, params: &HwParams<'_>) -> Result<()> {
        check("snd_pcm_hw_params", unsafe {
            sys::snd_pcm_hw_params(self.handle, params.params)
        })?;
        Ok(())
    }

    pub fn prepare(&self) -> Result<()> {
        check("snd_pcm_prepare", unsafe { sys::snd_pcm_prepare(self.handle) })?;
        Ok(())
    }

    pub fn state(&self) -> State {
        State::from(unsafe { sys::snd_pcm_state(self.handle) })
    }

    /// Pauses (`true`) or resumes (`false`) the hardware transfer.
    pub fn pause(&self, enable: bool) -> Result<()> {
        check("snd_pcm_pause", unsafe {
            sys::snd_pcm_pause(self.handle, enable as c_int)
        })?;
        Ok(())
    }

    /// Brings the stream back after an xrun or suspend described by `err`.
    pub fn recover(&self, err: &Error) -> Result<()> {
        let code = err.code().unwrap_or(-libc::EIO);
        check("snd_pcm_recover", unsafe {
            sys::snd_pcm_recover(self.handle, code, 1)
        })?;
        Ok(())
    }

    /// Waits until the stream is ready for I/O; `false` on timeout.
    pub fn wait(&self, timeout_ms: i32) -> Result<bool> {
        let ready = check("snd_pcm_wait", unsafe {
            sys::snd_pcm_wait(self.handle, timeout_ms)
        })?;
        Ok(ready > 0)
    }

    /// Writes `frames` interleaved frames from `data`, returning how many were written.
    pub fn writei(&self, data: &[u8], frames: usize) -> Result<usize> {
        let written = unsafe {
            sys::snd_pcm_writei(self.handle, data.as_ptr() as *const _, frames as _)
        };
        if written < 0 {
            return Err(Error::alsa("snd_pcm_writei", written as c_int));
        }
        Ok(written as usize)
    }

    /// Reads up to `frames` interleaved frames into `data`.
    pub fn readi(&self, data: &mut [u8], frames: usize) -> Result<usize> {
        let read = unsafe {
            sys::snd_pcm_readi(self.handle, data.as_mut_ptr() as *mut _, frames as _)
        };
        if read < 0 {
            return Err(Error::alsa("snd_pcm_readi", read as c_int));
        }
        Ok(read as usize)
    }
}

impl Drop for Pcm {
    fn drop(&mut self) {
        unsafe {
            sys::snd_pcm_close(self.handle);
        }
    }
}

/// Hardware parameter space of a [`Pcm`], freed on drop.
pub struct HwParams<'a> {
    pcm: &'a Pcm,
    params: *mut sys::snd_pcm_hw_params_t,
}

impl HwParams<'_> {
    pub fn set_access_rw_interleaved(&self) -> Result<()> {
        check("snd_pcm_hw_params_set_access", unsafe {
            sys::snd_pcm_hw_params_set_access(
                self.pcm.handle,
                self.params,
                sys::SND_PCM_ACCESS_RW_INTERLEAVED,
            )
        })?;
        Ok(())
    }

    pub fn test_format(&self, format: Format) -> bool {
        unsafe {
            sys::snd_pcm_hw_params_test_format(self.pcm.handle, self.params, format.raw()) == 0
        }
    }

    pub fn set_format(&self, format: Format) -> Result<()> {
        check("snd_pcm_hw_params_set_format", unsafe {
            sys::snd_pcm_hw_params_set_format(self.pcm.handle, self.params, format.raw())
        })?;
        Ok(())
    }

    pub fn test_channels(&self, channels: u32) -> bool {
        unsafe {
            sys::snd_pcm_hw_params_test_channels(self.pcm.handle, self.params, channels as c_uint)
                == 0
        }
    }

    pub fn set_channels(&self, channels: u32) -> Result<()> {
        check("snd_pcm_hw_params_set_channels", unsafe {
            sys::snd_pcm_hw_params_set_channels(self.pcm.handle, self.params, channels as c_uint)
        })?;
        Ok(())
    }

    pub fn set_rate(&self, rate: u32) -> Result<()> {
        check("snd_pcm_hw_params_set_rate", unsafe {
            sys::snd_pcm_hw_params_set_rate(self.pcm.handle, self.params, rate as c_uint, 0)
        })?;
        Ok(())
    }

    pub fn set_period_size(&self, frames: usize) -> Result<()> {
        check("snd_pcm_hw_params_set_period_size", unsafe {
            sys::snd_pcm_hw_params_set_period_size(self.pcm.handle, self.params, frames as _, 0)
        })?;
        Ok(())
    }
}

impl Drop for HwParams<'_> {
    fn drop(&mut self) {
        unsafe {
            sys::snd_pcm_hw_params_free(self.params);
        }
    }
}

use alsa_sys as sys;
use libc::{c_int, c_uint};

use std::ffi::{CStr, CString};
use std::ptr;

use super::Stream;
use crate::error::{check, Error, Result};

/// Iterator over the indices of the sound cards present on the system.
pub struct Cards {
    current: c_int,
}

pub fn cards() -> Cards {
    Cards { current: -1 }
}

impl Iterator for Cards {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        let ret = unsafe { sys::snd_card_next(&mut self.current) };
        if ret < 0 {
            return Some(Err(Error::alsa("snd_card_next", ret)));
        }
        if self.current < 0 {
            return None;
        }
        Some(Ok(self.current as u32))
    }
}

/// Control interface of one card, opened as `hw:<card>`.
pub struct Control {
    handle: *mut sys::snd_ctl_t,
}

impl Control {
    pub fn open(name: &str) -> Result<Self> {
        let c_name = CString::new(name).map_err(|_| Error::InvalidName(name.to_string()))?;
        let mut handle = ptr::null_mut();
        check("snd_ctl_open", unsafe {
            sys::snd_ctl_open(&mut handle, c_name.as_ptr(), 0)
        })?;
        Ok(Self { handle })
    }

    /// Short card name as reported by the driver.
    pub fn card_name(&self) -> Result<String> {
        let mut info = ptr::null_mut();
        check("snd_ctl_card_info_malloc", unsafe {
            sys::snd_ctl_card_info_malloc(&mut info)
        })?;
        unsafe {
            let ret = sys::snd_ctl_card_info(self.handle, info);
            let name = if ret < 0 {
                Err(Error::alsa("snd_ctl_card_info", ret))
            } else {
                let raw = sys::snd_ctl_card_info_get_name(info);
                Ok(if raw.is_null() {
                    String::new()
                } else {
                    CStr::from_ptr(raw).to_string_lossy().into_owned()
                })
            };
            sys::snd_ctl_card_info_free(info);
            name
        }
    }

    /// Indices of the PCM devices on this card, in driver order.
    pub fn pcm_devices(&self) -> Result<Vec<u32>> {
        let mut devices = Vec::new();
        let mut device: c_int = -1;
        loop {
            check("snd_ctl_pcm_next_device", unsafe {
                sys::snd_ctl_pcm_next_device(self.handle, &mut device)
            })?;
            if device < 0 {
                break;
            }
            devices.push(device as u32);
        }
        Ok(devices)
    }

    /// Whether subdevice 0 of `device` can be opened in the given direction.
    pub fn has_stream(&self, device: u32, stream: Stream) -> Result<bool> {
        let mut info = ptr::null_mut();
        check("snd_pcm_info_malloc", unsafe { sys::snd_pcm_info_malloc(&mut info) })?;
        let supported = unsafe {
            sys::snd_pcm_info_set_device(info, device as c_uint);
            sys::snd_pcm_info_set_subdevice(info, 0);
            sys::snd_pcm_info_set_stream(info, stream.raw());
            let ret = sys::snd_ctl_pcm_info(self.handle, info);
            sys::snd_pcm_info_free(info);
            ret >= 0
        };
        Ok(supported)
    }
}

impl Drop for Control {
    fn drop(&mut self) {
        unsafe {
            sys::snd_ctl_close(self.handle);
        }
    }
}

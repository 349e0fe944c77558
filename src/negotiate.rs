use crate::alsa::{Format, HwParams, Pcm, Stream};
use crate::consts;
use crate::error::{Error, Result};

/// Answers which hardware parameters a device would accept.
pub trait HwProbe {
    fn supports_format(&self, format: Format) -> bool;
    fn supports_channels(&self, channels: u32) -> bool;
}

impl HwProbe for HwParams<'_> {
    fn supports_format(&self, format: Format) -> bool {
        self.test_format(format)
    }

    fn supports_channels(&self, channels: u32) -> bool {
        self.test_channels(channels)
    }
}

/// Negotiated layout of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub format: Format,
    pub channels: u32,
    pub rate: u32,
}

impl StreamFormat {
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * self.format.sample_bytes()
    }

    /// Frames per period, so that one period fills `BUFFER_SIZE` bytes.
    pub fn period_frames(&self) -> usize {
        consts::BUFFER_SIZE / self.frame_bytes()
    }

    pub fn period_bytes(&self) -> usize {
        self.period_frames() * self.frame_bytes()
    }
}

const FORMATS: &[Format] = &[Format::S16LE, Format::S32LE];

fn channel_preference(stream: Stream) -> &'static [u32] {
    match stream {
        Stream::Playback => &[2],
        Stream::Capture => &[2, 4],
    }
}

/// Picks the first supported format and channel count, in preference order.
pub fn negotiate(probe: &impl HwProbe, stream: Stream, device: &str) -> Result<StreamFormat> {
    let format = FORMATS
        .iter()
        .copied()
        .find(|&f| probe.supports_format(f))
        .ok_or_else(|| Error::UnsupportedFormat {
            device: device.to_string(),
            stream,
        })?;
    let channels = channel_preference(stream)
        .iter()
        .copied()
        .find(|&c| probe.supports_channels(c))
        .ok_or_else(|| Error::UnsupportedChannels {
            device: device.to_string(),
            stream,
        })?;
    Ok(StreamFormat {
        format,
        channels,
        rate: consts::SAMPLE_RATE,
    })
}

/// Negotiates and installs hardware parameters on `pcm`.
pub fn configure(pcm: &Pcm) -> Result<StreamFormat> {
    let params = pcm.hw_params_any()?;
    params.set_access_rw_interleaved()?;

    let chosen = negotiate(&params, pcm.stream(), pcm.name())?;
    params.set_format(chosen.format)?;
    params.set_channels(chosen.channels)?;
    params.set_rate(chosen.rate)?;
    params.set_period_size(chosen.period_frames())?;
    pcm.install(&params)?;

    log::debug!(
        "{} {}: {} {}ch {} Hz, period {} frames",
        pcm.stream(),
        pcm.name(),
        chosen.format,
        chosen.channels,
        chosen.rate,
        chosen.period_frames()
    );
    Ok(chosen)
}

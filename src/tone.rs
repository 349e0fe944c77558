use dasp_ring_buffer::Fixed;
use std::f32::consts::PI;

use crate::alsa::Format;
use crate::consts;
use crate::negotiate::StreamFormat;

/// Produces the playback payload, one period at a time.
///
/// Silent unless built with `tone`, in which case every channel carries a
/// quiet sine so a listener can hear the pauses.
pub struct Tone {
    layout: StreamFormat,
    amplitude: f32,
    pitch: f32,
    enabled: bool,
    /// Frames rendered so far; keeps the phase continuous across periods.
    time: usize,
    samples: Fixed<Vec<f32>>,
}

impl Tone {
    pub fn new(layout: StreamFormat, enabled: bool) -> Self {
        let samples = Fixed::from(vec![
            0.0;
            layout.period_frames() * layout.channels as usize
        ]);
        Self {
            layout,
            amplitude: consts::TONE_AMPLITUDE,
            pitch: consts::TONE_PITCH,
            enabled,
            time: 0,
            samples,
        }
    }

    /// Renders the next period into `out`, encoded in the negotiated format.
    pub fn fill(&mut self, out: &mut [u8]) {
        if !self.enabled {
            out.fill(0);
            return;
        }

        let channels = self.layout.channels as usize;
        let rate = self.layout.rate as f32;
        let (time, pitch, amplitude) = (self.time, self.pitch, self.amplitude);
        for (i, sample) in self.samples.iter_mut().enumerate() {
            let t = (time + i / channels) as f32 / rate;
            *sample = limit(sine(t, pitch) * amplitude, 1.0);
        }
        self.time = (self.time + self.layout.period_frames()) % self.layout.rate as usize;

        let width = self.layout.format.sample_bytes();
        for (bytes, &sample) in out.chunks_exact_mut(width).zip(self.samples.iter()) {
            encode(self.layout.format, sample, bytes);
        }
    }
}

fn sine(time: f32, pitch: f32) -> f32 {
    (time * pitch * 2.0 * PI).sin()
}

fn limit(sample: f32, to: f32) -> f32 {
    sample.min(to).max(-to)
}

fn encode(format: Format, sample: f32, out: &mut [u8]) {
    match format {
        Format::S16LE => {
            let value = (sample * i16::MAX as f32) as i16;
            out.copy_from_slice(&value.to_le_bytes());
        }
        Format::S32LE => {
            let value = (sample as f64 * i32::MAX as f64) as i32;
            out.copy_from_slice(&value.to_le_bytes());
        }
    }
}

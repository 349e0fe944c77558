use std::time::Duration;

/// Bytes moved per transfer; the period size in frames is derived from it.
pub const BUFFER_SIZE: usize = 4096;
pub const SAMPLE_RATE: u32 = 48000;

/// Upper bound on devices kept per direction during discovery.
pub const MAX_PCMS: usize = 10;
pub const DEFAULT_CARD_FILTER: &str = "sof";
/// SOF exposes its deep buffer playback PCM on this index.
pub const DEEP_BUFFER_DEVICE: u32 = 31;

pub const DEFAULT_PAUSE_COUNT: u32 = 20;
pub const PAUSE_HOLD: Duration = Duration::from_millis(10);
pub const RUNNING_POLL: Duration = Duration::from_millis(10);
pub const RUNNING_TIMEOUT: Duration = Duration::from_secs(5);
pub const SETTLE: Duration = Duration::from_secs(3);

/// How long a worker blocks in `snd_pcm_wait` before rechecking the stop flag.
pub const WAIT_TIMEOUT_MS: i32 = 100;

pub const TONE_PITCH: f32 = 440.0;
pub const TONE_AMPLITUDE: f32 = 0.05;

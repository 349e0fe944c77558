use clap::Parser;

use std::time::Duration;

use crate::config::{Selection, TestConfig};
use crate::consts;
use crate::device::{DeviceId, DiscoveryOptions};

/// Pause and resume ALSA playback/capture pairs while audio is streaming.
///
/// With no device indices every playback device is paired with every capture
/// device found on matching cards.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// pause/resume cycles per device pair
    #[arg(
        default_value_t = consts::DEFAULT_PAUSE_COUNT,
        value_parser = parse_pause_count,
        allow_negative_numbers = true
    )]
    pub pause_count: u32,
    /// playback PCM index on `--card`; without a capture index devices are discovered
    pub playback_device: Option<u32>,
    /// capture PCM index on `--card`
    pub capture_device: Option<u32>,

    /// card used with explicit device indices
    #[arg(long, default_value_t = 0)]
    pub card: u32,
    /// only cards whose name contains this are discovered; empty matches all
    #[arg(long, default_value = consts::DEFAULT_CARD_FILTER)]
    pub card_filter: String,
    /// playback device left out of discovery (deep buffer PCM)
    #[arg(long, default_value_t = consts::DEEP_BUFFER_DEVICE)]
    pub skip_playback_device: u32,
    /// keep the deep buffer PCM in the playback list
    #[arg(long)]
    pub no_skip: bool,

    /// milliseconds both streams stay paused per cycle
    #[arg(long, default_value_t = consts::PAUSE_HOLD.as_millis() as u64)]
    pub hold_ms: u64,
    /// milliseconds to wait between two pairs
    #[arg(long, default_value_t = consts::SETTLE.as_millis() as u64)]
    pub settle_ms: u64,
    /// test every pair instead of stopping at the first failure
    #[arg(long)]
    pub keep_going: bool,
    /// play a quiet sine instead of silence
    #[arg(long)]
    pub tone: bool,
    /// print the discovered devices and exit
    #[arg(long)]
    pub list: bool,
}

fn parse_pause_count(s: &str) -> Result<u32, String> {
    match s.parse::<i64>() {
        Ok(n) if n > 0 && n <= u32::MAX as i64 => Ok(n as u32),
        _ => Err(String::from(
            "Invalid pause_count value. It must be a positive integer.",
        )),
    }
}

impl Args {
    pub fn discovery(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            card_filter: self.card_filter.clone(),
            skip_playback_device: (!self.no_skip).then_some(self.skip_playback_device),
            max_devices: consts::MAX_PCMS,
        }
    }

    pub fn selection(&self) -> Selection {
        match (self.playback_device, self.capture_device) {
            (Some(playback), Some(capture)) => Selection::Pair {
                playback: DeviceId::new(self.card, playback),
                capture: DeviceId::new(self.card, capture),
            },
            _ => Selection::Discover(self.discovery()),
        }
    }

    pub fn config(&self) -> TestConfig {
        TestConfig {
            pause_count: self.pause_count,
            hold: Duration::from_millis(self.hold_ms),
            settle: Duration::from_millis(self.settle_ms),
            keep_going: self.keep_going,
            tone: self.tone,
            ..Default::default()
        }
    }
}

use std::time::Duration;

use crate::consts;
use crate::device::{DeviceId, DiscoveryOptions};

/// Which device pairs a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Test exactly one pair.
    Pair { playback: DeviceId, capture: DeviceId },
    /// Discover devices and test every combination.
    Discover(DiscoveryOptions),
}

#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Pause/resume cycles per pair.
    pub pause_count: u32,
    /// How long both streams stay paused in each cycle.
    pub hold: Duration,
    pub running_poll: Duration,
    pub running_timeout: Duration,
    /// Pause between two pairs.
    pub settle: Duration,
    /// Test every pair even after one fails.
    pub keep_going: bool,
    /// Play a sine instead of silence.
    pub tone: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            pause_count: consts::DEFAULT_PAUSE_COUNT,
            hold: consts::PAUSE_HOLD,
            running_poll: consts::RUNNING_POLL,
            running_timeout: consts::RUNNING_TIMEOUT,
            settle: consts::SETTLE,
            keep_going: false,
            tone: false,
        }
    }
}

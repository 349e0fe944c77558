//! Pause/resume stress test for ALSA playback and capture device pairs.
//!
//! Two workers keep a playback and a capture stream busy while the control
//! thread pauses and resumes both, checking that every driver call succeeds.

pub mod alsa;
pub mod cli;
pub mod config;
pub mod consts;
pub mod device;
pub mod error;
pub mod negotiate;
pub mod runner;
pub mod session;
pub mod stream;
pub mod tone;
pub mod worker;

pub use config::{Selection, TestConfig};
pub use device::{DeviceId, DeviceList, DiscoveryOptions};
pub use error::{Error, Result};
pub use runner::RunSummary;
pub use session::PairReport;

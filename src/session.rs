//! One playback/capture pair: open, configure, run both workers, and cycle
//! pause/resume on the control thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use crate::alsa::{Pcm, State, Stream};
use crate::config::TestConfig;
use crate::device::DeviceId;
use crate::error::{Error, Result};
use crate::negotiate::{self, StreamFormat};
use crate::stream::PcmStream;
use crate::tone::Tone;
use crate::worker::{self, WorkerStats};

/// Result of exercising one device pair.
#[derive(Debug)]
pub struct PairReport {
    pub playback: String,
    pub capture: String,
    pub requested: u32,
    pub completed: u32,
    /// First pause/resume failure, if the cycle stopped early.
    pub cycle_error: Option<Error>,
    pub playback_worker: Result<WorkerStats>,
    pub capture_worker: Result<WorkerStats>,
}

impl PairReport {
    pub fn passed(&self) -> bool {
        self.completed == self.requested
            && self.cycle_error.is_none()
            && self.playback_worker.is_ok()
            && self.capture_worker.is_ok()
    }

    /// All the reasons this pair failed, in the order they happened.
    pub fn failures(&self) -> Vec<&Error> {
        [
            self.cycle_error.as_ref(),
            self.playback_worker.as_ref().err(),
            self.capture_worker.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Opens and configures both devices, then runs the pause/resume cycle.
///
/// Errors are setup failures; failures once streaming has started are
/// reported through [`PairReport`].
pub fn run_pair(playback: DeviceId, capture: DeviceId, config: &TestConfig) -> Result<PairReport> {
    let playback_name = playback.to_string();
    let capture_name = capture.to_string();

    let playback_pcm = Pcm::open(&playback_name, Stream::Playback, true)
        .map_err(|e| e.on_device(&playback_name))?;
    log::info!("Playback device {playback_name} opened successfully.");
    let capture_pcm = Pcm::open(&capture_name, Stream::Capture, true)
        .map_err(|e| e.on_device(&capture_name))?;
    log::info!("Capture device {capture_name} opened successfully.");

    let playback_layout =
        negotiate::configure(&playback_pcm).map_err(|e| e.on_device(&playback_name))?;
    let capture_layout =
        negotiate::configure(&capture_pcm).map_err(|e| e.on_device(&capture_name))?;

    playback_pcm
        .prepare()
        .map_err(|e| e.on_device(&playback_name))?;
    capture_pcm
        .prepare()
        .map_err(|e| e.on_device(&capture_name))?;
    log::info!("Playback and capture devices configured successfully.");

    let report = exercise(
        &playback_pcm,
        playback_layout,
        &capture_pcm,
        capture_layout,
        config,
    );

    drop(playback_pcm);
    drop(capture_pcm);
    log::info!("PCM devices closed.");

    Ok(report)
}

/// Runs the workers and the pause/resume cycle on already prepared streams.
pub fn exercise<S: PcmStream>(
    playback: &S,
    playback_layout: StreamFormat,
    capture: &S,
    capture_layout: StreamFormat,
    config: &TestConfig,
) -> PairReport {
    let stop = AtomicBool::new(false);
    let mut tone = Tone::new(playback_layout, config.tone);

    let (completed, cycle_error, playback_worker, capture_worker) = thread::scope(|s| {
        let playback_handle =
            s.spawn(|| worker::playback(playback, playback_layout, &mut tone, &stop));
        let capture_handle = s.spawn(|| worker::capture(capture, capture_layout, &stop));

        let (completed, cycle_error) = match cycle(playback, capture, config) {
            Ok(()) => (config.pause_count, None),
            Err((completed, err)) => (completed, Some(err)),
        };

        stop.store(true, Ordering::Release);
        let playback_worker = playback_handle
            .join()
            .unwrap_or(Err(Error::WorkerPanicked { worker: "playback" }));
        let capture_worker = capture_handle
            .join()
            .unwrap_or(Err(Error::WorkerPanicked { worker: "capture" }));

        (completed, cycle_error, playback_worker, capture_worker)
    });

    if let Ok(stats) = &playback_worker {
        log::debug!("playback {}: {stats:?}", playback.name());
    }
    if let Ok(stats) = &capture_worker {
        log::debug!("capture {}: {stats:?}", capture.name());
    }

    PairReport {
        playback: playback.name().to_string(),
        capture: capture.name().to_string(),
        requested: config.pause_count,
        completed,
        cycle_error,
        playback_worker,
        capture_worker,
    }
}

/// Pauses and resumes both streams `pause_count` times. On failure returns
/// the number of completed iterations with the error.
fn cycle<S: PcmStream>(
    playback: &S,
    capture: &S,
    config: &TestConfig,
) -> std::result::Result<(), (u32, Error)> {
    for iteration in 0..config.pause_count {
        let fail = |action: &'static str, device: &S, err: Error| {
            let err = Error::Cycle {
                action,
                device: device.name().to_string(),
                iteration,
                source: Box::new(err),
            };
            log::error!("{err}");
            (iteration, err)
        };

        wait_running(playback, config).map_err(|e| (iteration, e))?;
        wait_running(capture, config).map_err(|e| (iteration, e))?;

        playback
            .pause(true)
            .map_err(|e| fail("pausing playback device", playback, e))?;
        log::info!("Playback device {} paused at iteration {iteration}.", playback.name());
        capture
            .pause(true)
            .map_err(|e| fail("pausing capture device", capture, e))?;
        log::info!("Capture device {} paused at iteration {iteration}.", capture.name());

        thread::sleep(config.hold);

        playback
            .pause(false)
            .map_err(|e| fail("resuming playback device", playback, e))?;
        log::info!("Playback device {} resumed at iteration {iteration}.", playback.name());
        capture
            .pause(false)
            .map_err(|e| fail("resuming capture device", capture, e))?;
        log::info!("Capture device {} resumed at iteration {iteration}.", capture.name());
    }
    Ok(())
}

fn wait_running<S: PcmStream>(pcm: &S, config: &TestConfig) -> Result<()> {
    let started = Instant::now();
    while pcm.state() != State::Running {
        if started.elapsed() >= config.running_timeout {
            let err = Error::NotRunning {
                device: pcm.name().to_string(),
                waited_ms: started.elapsed().as_millis(),
            };
            log::error!("{err} (state {:?})", pcm.state());
            return Err(err);
        }
        thread::sleep(config.running_poll);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alsa::Format;
    use crate::worker::tests::code;

    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    /// Behaves like a hardware stream: starts on the first transfer, refuses
    /// I/O while paused.
    struct FakePcm {
        name: &'static str,
        started: AtomicBool,
        paused: AtomicBool,
        pauses: AtomicU32,
        /// Fail the n-th pause request (1-based).
        fail_pause: Option<u32>,
        fail_io: Option<i32>,
        never_runs: bool,
    }

    impl FakePcm {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                started: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                pauses: AtomicU32::new(0),
                fail_pause: None,
                fail_io: None,
                never_runs: false,
            }
        }

        fn transfer(&self, op: &'static str, frames: usize) -> Result<usize> {
            if let Some(c) = self.fail_io {
                return Err(code(op, c));
            }
            if self.paused.load(Ordering::SeqCst) {
                return Err(code(op, -libc::EAGAIN));
            }
            self.started.store(true, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(1));
            Ok(frames)
        }
    }

    impl PcmStream for FakePcm {
        fn name(&self) -> &str {
            self.name
        }

        fn state(&self) -> State {
            if self.never_runs {
                State::Prepared
            } else if self.paused.load(Ordering::SeqCst) {
                State::Paused
            } else if self.started.load(Ordering::SeqCst) {
                State::Running
            } else {
                State::Prepared
            }
        }

        fn pause(&self, enable: bool) -> Result<()> {
            if enable {
                let n = self.pauses.fetch_add(1, Ordering::SeqCst) + 1;
                if self.fail_pause == Some(n) {
                    return Err(code("snd_pcm_pause", -libc::EBADFD));
                }
            }
            self.paused.store(enable, Ordering::SeqCst);
            Ok(())
        }

        fn wait(&self, _: i32) -> Result<bool> {
            thread::sleep(Duration::from_millis(1));
            Ok(true)
        }

        fn writei(&self, _: &[u8], frames: usize) -> Result<usize> {
            self.transfer("snd_pcm_writei", frames)
        }

        fn readi(&self, _: &mut [u8], frames: usize) -> Result<usize> {
            self.transfer("snd_pcm_readi", frames)
        }

        fn recover(&self, _: &Error) -> Result<()> {
            Ok(())
        }
    }

    fn layout(channels: u32) -> StreamFormat {
        StreamFormat {
            format: Format::S16LE,
            channels,
            rate: 48000,
        }
    }

    fn config(pause_count: u32) -> TestConfig {
        TestConfig {
            pause_count,
            hold: Duration::from_millis(1),
            running_poll: Duration::from_millis(1),
            running_timeout: Duration::from_secs(2),
            settle: Duration::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn every_cycle_completes() {
        let playback = FakePcm::new("hw:0,0");
        let capture = FakePcm::new("hw:0,1");

        let report = exercise(&playback, layout(2), &capture, layout(4), &config(5));
        assert!(report.passed(), "{:?}", report.failures());
        assert_eq!(report.completed, 5);
        assert_eq!(playback.pauses.load(Ordering::SeqCst), 5);
        assert_eq!(capture.pauses.load(Ordering::SeqCst), 5);
        assert!(report.playback_worker.as_ref().unwrap().periods > 0);
        assert!(report.capture_worker.as_ref().unwrap().periods > 0);
        assert!(!playback.paused.load(Ordering::SeqCst));
    }

    #[test]
    fn pause_failure_stops_the_cycle() {
        let playback = FakePcm {
            fail_pause: Some(3),
            ..FakePcm::new("hw:0,0")
        };
        let capture = FakePcm::new("hw:0,1");

        let report = exercise(&playback, layout(2), &capture, layout(2), &config(5));
        assert!(!report.passed());
        assert_eq!(report.completed, 2);
        let err = report.cycle_error.as_ref().unwrap();
        assert_eq!(err.code(), Some(-libc::EBADFD));
        assert!(err
            .to_string()
            .starts_with("pausing playback device hw:0,0 failed at iteration 2"));
        // workers still shut down cleanly
        assert!(report.playback_worker.is_ok());
        assert!(report.capture_worker.is_ok());
    }

    #[test]
    fn stream_that_never_runs_times_out() {
        let playback = FakePcm {
            never_runs: true,
            ..FakePcm::new("hw:0,0")
        };
        let capture = FakePcm::new("hw:0,1");
        let config = TestConfig {
            running_timeout: Duration::from_millis(20),
            ..config(3)
        };

        let report = exercise(&playback, layout(2), &capture, layout(2), &config);
        assert_eq!(report.completed, 0);
        assert!(matches!(report.cycle_error, Some(Error::NotRunning { .. })));
        assert_eq!(playback.pauses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn worker_failure_fails_the_pair() {
        let playback = FakePcm::new("hw:0,0");
        let capture = FakePcm {
            fail_io: Some(-libc::EIO),
            never_runs: true,
            ..FakePcm::new("hw:0,1")
        };
        let config = TestConfig {
            running_timeout: Duration::from_millis(50),
            ..config(2)
        };

        let report = exercise(&playback, layout(2), &capture, layout(2), &config);
        assert!(!report.passed());
        assert_eq!(report.capture_worker.as_ref().unwrap_err().code(), Some(-libc::EIO));
        assert_eq!(report.failures().len(), 2);
    }
}

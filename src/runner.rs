use std::thread;
use std::time::Duration;

use crate::config::{Selection, TestConfig};
use crate::device::{self, DeviceId};
use crate::error::{Error, Result};
use crate::session::{self, PairReport};

pub struct PairOutcome {
    pub playback: DeviceId,
    pub capture: DeviceId,
    pub result: Result<PairReport>,
}

impl PairOutcome {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(report) if report.passed())
    }
}

#[derive(Default)]
pub struct RunSummary {
    pub outcomes: Vec<PairOutcome>,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(PairOutcome::passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &PairOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn report(&self) {
        let failed = self.failed().count();
        if failed == 0 {
            log::info!(
                "Pause/Resume test completed successfully ({} pair(s)).",
                self.outcomes.len()
            );
            return;
        }
        log::error!("{failed} of {} pair(s) failed:", self.outcomes.len());
        for outcome in self.failed() {
            match &outcome.result {
                Ok(report) => {
                    for err in report.failures() {
                        log::error!("  {} + {}: {err}", outcome.playback, outcome.capture);
                    }
                    if report.failures().is_empty() {
                        log::error!(
                            "  {} + {}: {} of {} cycles completed",
                            outcome.playback,
                            outcome.capture,
                            report.completed,
                            report.requested
                        );
                    }
                }
                Err(err) => log::error!("  {} + {}: {err}", outcome.playback, outcome.capture),
            }
        }
    }
}

/// Resolves the selection to device pairs and tests them.
pub fn run(selection: &Selection, config: &TestConfig) -> Result<RunSummary> {
    let pairs = match selection {
        Selection::Pair { playback, capture } => vec![(*playback, *capture)],
        Selection::Discover(options) => {
            let list = device::discover(options)?;
            list.print();
            if list.has_no_pairs() {
                return Err(Error::NoDevices);
            }
            list.pairs().collect()
        }
    };
    Ok(run_pairs(&pairs, config, session::run_pair, thread::sleep))
}

/// Tests `pairs` in order with `test`, calling `settle` between two pairs.
/// Unless `keep_going` is set the first failing pair ends the run.
pub fn run_pairs<T, W>(
    pairs: &[(DeviceId, DeviceId)],
    config: &TestConfig,
    mut test: T,
    mut settle: W,
) -> RunSummary
where
    T: FnMut(DeviceId, DeviceId, &TestConfig) -> Result<PairReport>,
    W: FnMut(Duration),
{
    let mut summary = RunSummary::default();

    for (i, &(playback, capture)) in pairs.iter().enumerate() {
        if i > 0 {
            log::info!("Waiting before next test...");
            settle(config.settle);
        }
        let pair = format!("playback device: {playback} and capture device: {capture}");
        log::info!("Running pause/resume test for {pair}");

        let outcome = PairOutcome {
            playback,
            capture,
            result: test(playback, capture, config),
        };
        let passed = outcome.passed();
        if passed {
            log::info!("Pause/Resume test completed for {pair}");
        } else {
            if let Err(err) = &outcome.result {
                log::error!("{err}");
            }
            log::error!("Pause/Resume test failed for {pair}");
        }
        summary.outcomes.push(outcome);

        if !passed && !config.keep_going {
            break;
        }
    }

    summary
}

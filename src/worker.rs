use std::sync::atomic::{AtomicBool, Ordering};

use crate::consts;
use crate::error::Result;
use crate::negotiate::StreamFormat;
use crate::stream::PcmStream;
use crate::tone::Tone;

/// What a worker moved before it was stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub periods: u64,
    pub frames: u64,
    pub xruns: u64,
}

enum Direction<'a> {
    Playback(&'a mut Tone),
    Capture,
}

/// Keeps writing periods to `pcm` until `stop` is raised.
pub fn playback<S: PcmStream>(
    pcm: &S,
    layout: StreamFormat,
    tone: &mut Tone,
    stop: &AtomicBool,
) -> Result<WorkerStats> {
    run(pcm, layout, Direction::Playback(tone), stop)
}

/// Keeps reading periods from `pcm` until `stop` is raised.
pub fn capture<S: PcmStream>(
    pcm: &S,
    layout: StreamFormat,
    stop: &AtomicBool,
) -> Result<WorkerStats> {
    run(pcm, layout, Direction::Capture, stop)
}

fn run<S: PcmStream>(
    pcm: &S,
    layout: StreamFormat,
    mut direction: Direction<'_>,
    stop: &AtomicBool,
) -> Result<WorkerStats> {
    let frames = layout.period_frames();
    let mut buffer = vec![0u8; layout.period_bytes()];
    let mut stats = WorkerStats::default();
    // a partially written period is finished before the next one is rendered
    let mut offset = 0;

    while !stop.load(Ordering::Acquire) {
        let transferred = match &mut direction {
            Direction::Playback(tone) => {
                if offset == 0 {
                    tone.fill(&mut buffer);
                }
                let start = offset * layout.frame_bytes();
                pcm.writei(&buffer[start..], frames - offset)
            }
            Direction::Capture => pcm.readi(&mut buffer, frames),
        };

        match transferred {
            Ok(n) => {
                stats.frames += n as u64;
                if let Direction::Playback(_) = direction {
                    offset = (offset + n) % frames;
                    if offset == 0 && n > 0 {
                        stats.periods += 1;
                    }
                } else if n > 0 {
                    stats.periods += 1;
                }
                if n == 0 {
                    wait(pcm, &mut stats)?;
                }
            }
            Err(err) if err.is_again() => wait(pcm, &mut stats)?,
            Err(err) if err.is_xrun() => {
                log::warn!("{}: {err}, recovering", pcm.name());
                stats.xruns += 1;
                pcm.recover(&err)?;
                offset = 0;
            }
            Err(err) => {
                log::error!("{}: {err}", pcm.name());
                return Err(err.on_device(pcm.name()));
            }
        }
    }

    log::debug!("{} worker stopped: {stats:?}", pcm.name());
    Ok(stats)
}

/// Blocks until the stream can move data or the wait times out, so the stop
/// flag is checked at least every `WAIT_TIMEOUT_MS`.
fn wait<S: PcmStream>(pcm: &S, stats: &mut WorkerStats) -> Result<()> {
    match pcm.wait(consts::WAIT_TIMEOUT_MS) {
        Ok(_) => Ok(()),
        Err(err) if err.is_xrun() => {
            log::warn!("{}: {err} while waiting, recovering", pcm.name());
            stats.xruns += 1;
            pcm.recover(&err)
        }
        Err(err) => Err(err.on_device(pcm.name())),
    }
}

//! # Event Loop
//!
//! Drives a [`WatchFace`] from a channel of host events on a single-threaded tokio runtime. The
//! loop owns the one timer the scheduler may arm, waits on whichever comes first (the next host
//! event or the armed deadline), and coalesces every event already queued into at most one
//! redraw.
//!
//! Frame failures are logged and skipped; the next scheduled tick simply tries again.

use crate::face::{HostEvent, WatchFace};
use crate::raster::Raster;
use crate::scheduler::{Outcome, TimerToken};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Receives composed frames; the host's presentation surface.
pub trait FramePresenter {
    fn present(&mut self, frame: &Raster) -> anyhow::Result<()>;
}

/// Counters reported when the loop exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub failed_frames: u64,
}

enum Input {
    Host(Option<HostEvent>),
    Timer(TimerToken),
}

/// Run until the channel closes, the face is destroyed, or `max_frames` frames are presented.
pub async fn run<P>(
    face: &mut WatchFace,
    events: &mut mpsc::Receiver<HostEvent>,
    presenter: &mut P,
    max_frames: Option<u64>,
) -> anyhow::Result<RunStats>
where
    P: FramePresenter + ?Sized,
{
    let mut stats = RunStats::default();
    let mut wakeup: Option<(TimerToken, Instant)> = None;

    loop {
        let input = match wakeup {
            Some((token, deadline)) => tokio::select! {
                event = events.recv() => Input::Host(event),
                _ = sleep_until(deadline) => Input::Timer(token),
            },
            None => Input::Host(events.recv().await),
        };

        let mut redraw = false;
        match input {
            Input::Host(None) => {
                log::info!("Host event channel closed");
                break;
            }
            Input::Host(Some(event)) => {
                apply(face.handle_event(event), &mut wakeup, &mut redraw);
            }
            Input::Timer(token) => {
                wakeup = None;
                apply(face.on_timer(token), &mut wakeup, &mut redraw);
            }
        }
        while let Ok(event) = events.try_recv() {
            apply(face.handle_event(event), &mut wakeup, &mut redraw);
        }

        if face.is_destroyed() {
            break;
        }
        if !redraw {
            continue;
        }

        match face.render() {
            Ok(frame) => {
                presenter.present(frame)?;
                stats.frames += 1;
            }
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                stats.failed_frames += 1;
            }
        }
        if max_frames.is_some_and(|max| stats.frames >= max) {
            break;
        }
    }

    log::info!(
        "Event loop finished after {} frames ({} failed)",
        stats.frames,
        stats.failed_frames
    );
    Ok(stats)
}

fn apply(outcome: Outcome, wakeup: &mut Option<(TimerToken, Instant)>, redraw: &mut bool) {
    if let Some(cancelled) = outcome.cancel {
        if wakeup.map(|(token, _)| token) == Some(cancelled) {
            *wakeup = None;
        }
    }
    if let Some(arm) = outcome.arm {
        *wakeup = Some((arm.token, Instant::now() + Duration::from_millis(arm.delay_ms)));
    }
    *redraw |= outcome.redraw;
}

//! # Redraw Scheduler
//!
//! A two-state machine (`Idle`, `Scheduled`) that decides when frames are drawn. While the face is
//! visible and interactive it keeps exactly one wake-up armed, aligned to the cadence boundary
//! (`period - now % period`). Anything else parks it in `Idle` and relies on on-demand redraws.
//!
//! The scheduler owns no timer. [`RedrawScheduler::handle`] returns an [`Outcome`] telling the
//! caller which wake-up to cancel, which to arm, and whether to redraw now. Every wake-up carries
//! a [`TimerToken`]; a tick whose token is not the armed one is stale and ignored, so a
//! cancellation that races with a firing timer can never produce a second chain of ticks.

/// Interactive cadence: 5 Hz.
pub const DEFAULT_PERIOD_MS: u64 = 200;

/// Identifies one armed wake-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduled { token: TimerToken },
}

/// Inputs to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerEvent {
    BecameVisible,
    BecameHidden,
    AmbientChanged(bool),
    /// An armed wake-up fired
    Tick(TimerToken),
    /// Something visible changed; redraw once without touching the timer
    Invalidate,
    Stop,
}

/// A wake-up the caller must arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wakeup {
    pub token: TimerToken,
    pub delay_ms: u64,
}

/// What the caller must do after an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub redraw: bool,
    pub cancel: Option<TimerToken>,
    pub arm: Option<Wakeup>,
}

impl Outcome {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    /// Fold a later outcome into this one.
    pub fn merge(self, later: Outcome) -> Self {
        Self {
            redraw: self.redraw || later.redraw,
            cancel: later.cancel.or(self.cancel),
            arm: later.arm.or(self.arm),
        }
    }
}

#[derive(Debug)]
pub struct RedrawScheduler {
    period_ms: u64,
    state: SchedulerState,
    visible: bool,
    ambient: bool,
    next_token: u64,
}

impl RedrawScheduler {
    /// A scheduler with the given cadence. A zero period is raised to 1 ms.
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            state: SchedulerState::Idle,
            visible: false,
            ambient: false,
            next_token: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// True while periodic redraws are wanted.
    pub fn should_run(&self) -> bool {
        self.visible && !self.ambient
    }

    /// Delay from `now_ms` to the next cadence boundary, in `1..=period`.
    pub fn delay_until_boundary(&self, now_ms: u64) -> u64 {
        self.period_ms - now_ms % self.period_ms
    }

    /// Advance the state machine. `now_ms` is wall-clock time used for phase alignment.
    pub fn handle(&mut self, event: SchedulerEvent, now_ms: u64) -> Outcome {
        match event {
            SchedulerEvent::BecameVisible => {
                self.visible = true;
                self.update_timer(now_ms).merge(Outcome::redraw())
            }
            SchedulerEvent::BecameHidden => {
                self.visible = false;
                self.update_timer(now_ms).merge(Outcome::redraw())
            }
            SchedulerEvent::AmbientChanged(ambient) => {
                self.ambient = ambient;
                self.update_timer(now_ms).merge(Outcome::redraw())
            }
            SchedulerEvent::Tick(token) => match self.state {
                SchedulerState::Scheduled { token: armed } if armed == token => {
                    if self.should_run() {
                        let arm = self.arm(now_ms);
                        Outcome {
                            redraw: true,
                            cancel: None,
                            arm: Some(arm),
                        }
                    } else {
                        self.state = SchedulerState::Idle;
                        Outcome::default()
                    }
                }
                _ => {
                    log::debug!("Ignoring stale tick {:?}", token);
                    Outcome::default()
                }
            },
            SchedulerEvent::Invalidate => Outcome::redraw(),
            SchedulerEvent::Stop => {
                self.visible = false;
                self.cancel().merge(Outcome::redraw())
            }
        }
    }

    /// Re-arm or cancel depending on visibility and ambient state.
    fn update_timer(&mut self, now_ms: u64) -> Outcome {
        let cancelled = self.cancel();
        if self.should_run() {
            let arm = self.arm(now_ms);
            log::debug!("Redraw armed in {} ms", arm.delay_ms);
            Outcome {
                arm: Some(arm),
                ..cancelled
            }
        } else {
            cancelled
        }
    }

    fn cancel(&mut self) -> Outcome {
        match std::mem::replace(&mut self.state, SchedulerState::Idle) {
            SchedulerState::Scheduled { token } => Outcome {
                cancel: Some(token),
                ..Outcome::default()
            },
            SchedulerState::Idle => Outcome::default(),
        }
    }

    fn arm(&mut self, now_ms: u64) -> Wakeup {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.state = SchedulerState::Scheduled { token };
        Wakeup {
            token,
            delay_ms: self.delay_until_boundary(now_ms),
        }
    }
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD_MS)
    }
}

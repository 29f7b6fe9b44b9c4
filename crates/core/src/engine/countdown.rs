/// Result of delivering one tick to a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Time was deducted; this many seconds remain.
    Running(u32),
    /// This tick consumed the last second. Reported exactly once.
    Expired,
    /// The countdown is stopped or already expired; nothing changed.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    Running,
    #[default]
    Stopped,
    Expired,
}

/// Seconds-based countdown driven by externally delivered ticks.
///
/// Expiry is edge-triggered: the tick that reaches zero reports
/// [`CountdownTick::Expired`], every later tick reports [`CountdownTick::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    remaining: u32,
    state: State,
}

impl Countdown {
    /// Start a running countdown with `budget` seconds.
    #[must_use]
    pub fn start(budget: u32) -> Self {
        Self {
            remaining: budget,
            state: State::Running,
        }
    }

    /// A countdown that was never started and ignores ticks.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Deduct one second.
    pub fn tick(&mut self) -> CountdownTick {
        if self.state != State::Running {
            return CountdownTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = State::Expired;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining)
        }
    }

    /// Stop ticking, keeping the remaining time. No-op unless running.
    pub fn stop(&mut self) {
        if self.state == State::Running {
            self.state = State::Stopped;
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    #[must_use]
    pub fn has_expired(&self) -> bool {
        self.state == State::Expired
    }
}

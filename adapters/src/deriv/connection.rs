//! Connection lifecycle as an explicit state machine.
//!
//! `Disconnected -> Connecting -> Connected -> Disconnected ...`
//!
//! The machine only decides; the client performs the I/O and sleeps. A
//! successful connection resets the retry counter. Once `max_attempts`
//! consecutive reconnects have failed the machine gives up.

use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    #[default]
    Fixed,
    /// Doubles the base delay on each consecutive attempt.
    Exponential,
}

impl FromStr for Backoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "exponential" => Ok(Self::Exponential),
            other => Err(format!("unknown backoff `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(5_000),
            backoff: Backoff::Fixed,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the 1-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Exponential => {
                let factor = 1u32 << attempt.saturating_sub(1).min(16);
                self.base_delay.saturating_mul(factor)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    attempts: u32,
    policy: ReconnectPolicy,
}

impl ConnectionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempts: 0,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive failed reconnects since the last successful connection.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn on_connecting(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    pub fn on_connected(&mut self) {
        self.state = ConnectionState::Connected;
        self.attempts = 0;
    }

    /// Connection closed or could not be established.
    ///
    /// Returns the delay before the next attempt, or `None` when retries are exhausted.
    pub fn on_lost(&mut self) -> Option<Duration> {
        self.state = ConnectionState::Disconnected;
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.policy.delay_for(self.attempts))
    }
}

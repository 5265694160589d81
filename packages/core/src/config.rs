//! Simulation parameters and their validation.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::TicketNumber;

/// Errors raised before any actor is started.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one desk is required")]
    NoDesks,

    #[error("at least one ticket must be issued")]
    NoTickets,

    #[error("invalid {name} range: min {min_ms}ms > max {max_ms}ms")]
    InvalidRange {
        name: &'static str,
        min_ms: u64,
        max_ms: u64,
    },

    #[error("{count} tickets starting at {first} run past the largest ticket number")]
    TicketOverflow { first: TicketNumber, count: u64 },

    #[error("wait timeout must be greater than zero")]
    ZeroWaitTimeout,

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Inclusive range of milliseconds a random duration is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DurationRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields `ms`.
    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Draw a uniformly distributed duration.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_ms >= self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvalidRange {
                name,
                min_ms: self.min_ms,
                max_ms: self.max_ms,
            });
        }
        Ok(())
    }
}

/// Parameters of one simulated office day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of desks serving concurrently.
    pub desk_count: u32,
    /// Total customers issued before the office closes.
    pub ticket_count: u64,
    /// Number printed on the first ticket.
    pub first_ticket: TicketNumber,
    /// Time a desk spends on one customer.
    pub service_time: DurationRange,
    /// Delay between two customers arriving.
    pub arrival_interval: DurationRange,
    /// Bounded wait of an idle desk before it re-checks closure.
    pub wait_timeout_ms: u64,
    /// Base seed for per-actor generators; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            desk_count: 3,
            ticket_count: 25,
            first_ticket: TicketNumber(100),
            service_time: DurationRange::new(2000, 3000),
            arrival_interval: DurationRange::new(20, 50),
            wait_timeout_ms: 1000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject configurations no office can run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.desk_count < 1 {
            return Err(ConfigError::NoDesks);
        }
        if self.ticket_count < 1 {
            return Err(ConfigError::NoTickets);
        }
        if self
            .first_ticket
            .0
            .checked_add_unsigned(self.ticket_count - 1)
            .is_none()
        {
            return Err(ConfigError::TicketOverflow {
                first: self.first_ticket,
                count: self.ticket_count,
            });
        }
        if self.wait_timeout_ms == 0 {
            return Err(ConfigError::ZeroWaitTimeout);
        }
        self.service_time.validate("service time")?;
        self.arrival_interval.validate("arrival interval")?;
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Tickets the office is expected to serve, first to last.
    ///
    /// Stops early at `i64::MAX` for configurations `validate` rejects.
    pub fn expected_tickets(&self) -> impl Iterator<Item = TicketNumber> + use<> {
        let first = self.first_ticket.0;
        (0..self.ticket_count)
            .map_while(move |offset| first.checked_add_unsigned(offset))
            .map(TicketNumber)
    }

    /// Seed for the actor at `slot`, when a base seed is configured.
    pub fn seed_for(&self, slot: u64) -> Option<u64> {
        self.seed.map(|base| base.wrapping_add(slot.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
    }
}

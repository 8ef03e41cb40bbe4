// src/health/status.rs
use hyper::StatusCode;
use std::fmt;

/// Two-state classification of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    Up,
    Down,
}

impl ProbeOutcome {
    /// Only `200 OK` counts as up. Other 2xx codes are down.
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::OK {
            ProbeOutcome::Up
        } else {
            ProbeOutcome::Down
        }
    }

    pub fn is_up(self) -> bool {
        self == ProbeOutcome::Up
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Up => f.write_str("up"),
            ProbeOutcome::Down => f.write_str("down"),
        }
    }
}

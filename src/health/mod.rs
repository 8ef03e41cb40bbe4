// src/health/mod.rs
mod prober;
mod status;

pub use prober::{probe, HttpProber, ProbeError, Prober};
pub use status::ProbeOutcome;

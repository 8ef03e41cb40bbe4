// src/reflector/mod.rs
mod reflector;
mod sink;

pub use reflector::{LoopHandle, StatusReflector};
pub use sink::{Fanout, StatusBoard, StatusSink, StatusSnapshot, WatchSink};

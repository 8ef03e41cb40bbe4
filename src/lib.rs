// src/lib.rs
pub mod config;
pub mod health;
pub mod reflector;
pub mod tray;

//! Background Tasks Module
//!
//! Periodic maintenance running alongside the server.
//!
//! # Tasks
//! - Cache sweep: drops expired entries and restores the capacity bound at
//!   configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;

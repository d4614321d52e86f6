//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Window pruning: drops elapsed rate limit windows at configured intervals

mod prune;

pub use prune::spawn_prune_task;

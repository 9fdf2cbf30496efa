//! # abd-driver
//!
//! The workload runner: a small external collaborator (spec.md §6) that
//! replays a line-oriented command file against an `abd-client` session
//! and records per-operation latency to a CSV log.

pub mod csvlog;
pub mod workload;

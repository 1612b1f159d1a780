//! Membership verification and recruitment administration for the union.

pub mod config;
pub mod error;
pub mod recruitment;
pub mod telemetry;
pub mod unicore;

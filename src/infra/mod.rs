//! Infrastructure adapters: telemetry and Postgres persistence.

pub mod db;
pub mod error;
pub mod telemetry;

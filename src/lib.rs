//! Tavolo: cache-aside core for a three-level menu catalog.
//!
//! The catalog is menus → submenus → dishes backed by Postgres, with a
//! hierarchy-aware cache in front. The service layer in [`application`]
//! is the sole writer to both stores: repository commits come first, cache
//! invalidation cascades follow, and a broken cache only ever costs
//! latency. HTTP routing, schema migrations and spreadsheet parsing live
//! in consumers of this crate.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

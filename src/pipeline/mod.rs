//! Pipeline entry points.
//!
//! - `run_feed_sync`: one full sync against the live site
//! - `run_sync`: the same pass over any fetcher, filter and stores

pub mod run;
pub mod sync;

pub use run::run_feed_sync;
pub use sync::{SyncContext, SyncReport, TopicFailure, run_sync};

//! Service layer
//!
//! The poll cycle engine and the pure steps it is built from:
//! - `filter`: drops items at or below the watermark and computes the next one
//! - `render`: turns new items into a plain-text notification body
//! - `cycle`: runs one read-query-filter-notify-persist cycle

mod cycle;
mod filter;
mod render;

pub use cycle::{CycleConfig, CycleEngine, CycleError, NotifyFailurePolicy};
pub use filter::{FilterOutcome, filter_new_items};
pub use render::render_items;

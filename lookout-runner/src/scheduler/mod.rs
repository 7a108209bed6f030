//! Scheduler layer for the runner
//!
//! Fires poll cycles on a fixed interval until shutdown. Cycles never
//! overlap: the next tick is only awaited once the previous cycle finished.

pub mod poller;

pub use poller::CyclePoller;

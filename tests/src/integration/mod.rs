//! Cross-component scenarios.

pub mod harness;

mod concurrency;
mod lifecycle;
mod reveal;

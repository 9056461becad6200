//! Per-page state of a run
//!
//! Pages are not tracked between runs; an outcome only lives until it is
//! folded into the run report.

mod page_outcome;

pub use page_outcome::PageOutcome;

//! Run report
//!
//! Counters collected while a strategy runs, and a plain-text rendering of
//! them for the CLI.

use crate::state::PageOutcome;
use std::fmt;
use std::time::Duration;

/// Summary of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Name of the strategy that handled the run
    pub strategy: &'static str,

    /// Discovery probe that produced the page inventory, if any
    pub probe: Option<&'static str>,

    /// Pages handed to the writer
    pub written: usize,

    /// Pages converted without writing (dry run)
    pub converted: usize,

    /// Pages left alone because a document already existed
    pub skipped_existing: usize,

    /// Empty, placeholder, and error pages
    pub skipped_empty: usize,

    /// Non-HTML responses
    pub not_html: usize,

    /// Redirects onto pages already seen or outside the admission rules
    pub skipped_redirect: usize,

    /// Pages dropped because the page limit was exhausted
    pub limit_reached: usize,

    /// Pages whose fetch, render, conversion, or write failed
    pub failed: usize,

    /// Pages that went through the renderer
    pub rendered: usize,

    /// Links admitted into the run (inventory entries included)
    pub links_admitted: usize,

    /// Set if cancellation stopped the run early
    pub cancelled: bool,

    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn new(strategy: &'static str) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Folds one page outcome into the counters
    pub fn record(&mut self, outcome: PageOutcome, rendered: bool) {
        match outcome {
            PageOutcome::Written => self.written += 1,
            PageOutcome::Converted => self.converted += 1,
            PageOutcome::SkippedExisting => self.skipped_existing += 1,
            PageOutcome::SkippedEmpty => self.skipped_empty += 1,
            PageOutcome::NotHtml => self.not_html += 1,
            PageOutcome::SkippedRedirect => self.skipped_redirect += 1,
            PageOutcome::LimitReached => self.limit_reached += 1,
            PageOutcome::Failed => self.failed += 1,
            PageOutcome::Cancelled => self.cancelled = true,
        }

        if rendered {
            self.rendered += 1;
        }
    }

    /// Pages that count toward the page limit
    pub fn processed(&self) -> usize {
        self.written + self.converted
    }

    /// Every page that reached a terminal outcome other than cancellation
    pub fn pages_seen(&self) -> usize {
        self.processed()
            + self.skipped_existing
            + self.skipped_empty
            + self.not_html
            + self.skipped_redirect
            + self.limit_reached
            + self.failed
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Extraction Report ===")?;
        writeln!(f)?;
        writeln!(f, "Strategy: {}", self.strategy)?;
        if let Some(probe) = self.probe {
            writeln!(f, "Discovered via: {}", probe)?;
        }
        writeln!(f, "Elapsed: {:.1}s", self.elapsed.as_secs_f64())?;
        writeln!(f)?;

        writeln!(f, "Pages:")?;
        writeln!(f, "  Written: {}", self.written)?;
        if self.converted > 0 {
            writeln!(f, "  Converted (dry run): {}", self.converted)?;
        }
        writeln!(f, "  Skipped (existing): {}", self.skipped_existing)?;
        writeln!(f, "  Skipped (empty/error): {}", self.skipped_empty)?;
        writeln!(f, "  Not HTML: {}", self.not_html)?;
        if self.skipped_redirect > 0 {
            writeln!(f, "  Skipped (redirect): {}", self.skipped_redirect)?;
        }
        if self.limit_reached > 0 {
            writeln!(f, "  Over page limit: {}", self.limit_reached)?;
        }
        writeln!(f, "  Failed: {}", self.failed)?;
        writeln!(f, "  Rendered: {}", self.rendered)?;
        writeln!(f)?;

        write!(f, "Links admitted: {}", self.links_admitted)?;
        if self.cancelled {
            write!(f, "\n\nRun was cancelled before completion")?;
        }
        Ok(())
    }
}

/// Prints a run report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("{}", report);
}

//! Progress tracking for export operations
//!
//! Each job owns one [`ProgressCounter`]; the coordinator reads all of them
//! and renders the slowest table's completion as a single progress bar.

use crate::core::export::summary::TableReport;
use crate::domain::ids::ExportTarget;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Rows done and rows total for one table
///
/// `done` is -1 until the job has fetched its row count. Only the owning
/// worker writes; the coordinator reads.
#[derive(Debug)]
pub struct ProgressCounter {
    done: AtomicI64,
    total: AtomicI64,
}

impl ProgressCounter {
    /// A counter for a job that has not started
    pub fn new() -> Self {
        Self {
            done: AtomicI64::new(-1),
            total: AtomicI64::new(0),
        }
    }

    /// Publish the row count and mark the job as started
    pub fn start(&self, total: u64) {
        let total = i64::try_from(total).unwrap_or(i64::MAX);
        self.total.store(total, Ordering::SeqCst);
        self.done.store(0, Ordering::SeqCst);
    }

    /// Add `rows` to the done counter
    pub fn advance(&self, rows: u64) {
        let rows = i64::try_from(rows).unwrap_or(i64::MAX);
        self.done.fetch_add(rows, Ordering::SeqCst);
    }

    /// Rows done, or -1 if not started
    pub fn done(&self) -> i64 {
        self.done.load(Ordering::SeqCst)
    }

    /// Rows reported by the source
    pub fn total(&self) -> i64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Completion of this table, from 0.0 to 1.0
    pub fn ratio(&self) -> f64 {
        ratio(self.done(), self.total())
    }
}

impl Default for ProgressCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion of a single (done, total) pair
///
/// A job that has not started counts as 0%, an empty table as 100%. Counts
/// can exceed a stale total, so the ratio is capped.
pub fn ratio(done: i64, total: i64) -> f64 {
    if done < 0 {
        0.0
    } else if total <= 0 {
        1.0
    } else {
        (done as f64 / total as f64).min(1.0)
    }
}

/// Aggregate completion: the minimum over every job
///
/// With no jobs the export is complete.
///
/// # Examples
///
/// ```
/// use tabledump::core::export::progress::completion_ratio;
///
/// assert_eq!(completion_ratio([(-1, 10), (5, 10)]), 0.0);
/// assert_eq!(completion_ratio([(5, 10), (0, 0)]), 0.5);
/// assert_eq!(completion_ratio(std::iter::empty::<(i64, i64)>()), 1.0);
/// ```
pub fn completion_ratio<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (i64, i64)>,
{
    pairs
        .into_iter()
        .map(|(done, total)| ratio(done, total))
        .fold(1.0, f64::min)
}

/// The set of counters of one export run
#[derive(Debug, Default)]
pub struct ProgressTracker {
    counters: Vec<(ExportTarget, Arc<ProgressCounter>)>,
}

impl ProgressTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a counter for a table and hand it to the table's worker
    pub fn register(&mut self, target: ExportTarget) -> Arc<ProgressCounter> {
        let counter = Arc::new(ProgressCounter::new());
        self.counters.push((target, Arc::clone(&counter)));
        counter
    }

    /// Aggregate completion over every registered table
    pub fn completion(&self) -> f64 {
        completion_ratio(
            self.counters
                .iter()
                .map(|(_, counter)| (counter.done(), counter.total())),
        )
    }

    /// Rows read across every table
    pub fn rows_done(&self) -> u64 {
        self.counters
            .iter()
            .map(|(_, counter)| counter.done().max(0) as u64)
            .sum()
    }

    /// Current counters of every table
    pub fn reports(&self) -> Vec<TableReport> {
        self.counters
            .iter()
            .map(|(target, counter)| TableReport {
                target: target.clone(),
                rows_done: counter.done(),
                rows_total: counter.total(),
            })
            .collect()
    }
}

/// Batches row-by-row progress into counter updates
///
/// Must be flushed once streaming ends, or the remainder is lost.
#[derive(Debug)]
pub struct ProgressBatcher {
    counter: Arc<ProgressCounter>,
    batch_size: u64,
    pending: u64,
}

impl ProgressBatcher {
    /// Create a batcher publishing every `batch_size` rows
    pub fn new(counter: Arc<ProgressCounter>, batch_size: u64) -> Self {
        Self {
            counter,
            batch_size: batch_size.max(1),
            pending: 0,
        }
    }

    /// Count one row
    pub fn record(&mut self) {
        self.pending += 1;
        if self.pending >= self.batch_size {
            self.flush();
        }
    }

    /// Publish the rows counted since the last update
    pub fn flush(&mut self) {
        if self.pending > 0 {
            self.counter.advance(self.pending);
            self.pending = 0;
        }
    }
}

/// Single-line `[====    ]  NN%` progress bar on stdout
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    /// Create the display; a disabled display draws nothing
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stdout());
            bar.set_style(
                ProgressStyle::with_template("[{bar:40}] {percent:>3}%")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("= "),
            );
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    /// Draw the given completion ratio
    pub fn render(&self, ratio: f64) {
        let percent = (ratio.clamp(0.0, 1.0) * 100.0).floor() as u64;
        self.bar.set_position(percent);
    }

    /// Terminate the progress line, optionally forcing 100% first
    pub fn finish(&self, complete: bool) {
        if complete {
            self.bar.set_position(100);
        }
        self.bar.abandon();
    }

    /// Percentage currently shown
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(-1, 10 => 0.0 ; "not started")]
    #[test_case(-1, 0 => 0.0 ; "not started empty table")]
    #[test_case(0, 0 => 1.0 ; "empty table")]
    #[test_case(5, 10 => 0.5 ; "half way")]
    #[test_case(15, 10 => 1.0 ; "stale total")]
    fn test_ratio(done: i64, total: i64) -> f64 {
        ratio(done, total)
    }

    #[test]
    fn test_completion_is_minimum() {
        assert_eq!(completion_ratio([(10, 10), (1, 4), (0, 0)]), 0.25);
        assert_eq!(completion_ratio([(0, 0), (0, 0)]), 1.0);
    }

    #[test]
    fn test_counter_lifecycle() {
        let counter = ProgressCounter::new();
        assert_eq!(counter.done(), -1);
        assert_eq!(counter.ratio(), 0.0);

        counter.start(40);
        assert_eq!(counter.done(), 0);
        assert_eq!(counter.total(), 40);

        counter.advance(20);
        assert_eq!(counter.ratio(), 0.5);
    }

    #[test]
    fn test_batcher_publishes_in_batches() {
        let counter = Arc::new(ProgressCounter::new());
        counter.start(50);
        let mut batcher = ProgressBatcher::new(Arc::clone(&counter), 20);

        for _ in 0..19 {
            batcher.record();
        }
        assert_eq!(counter.done(), 0);

        batcher.record();
        assert_eq!(counter.done(), 20);

        for _ in 0..5 {
            batcher.record();
        }
        assert_eq!(counter.done(), 20);
        batcher.flush();
        assert_eq!(counter.done(), 25);
    }

    #[test]
    fn test_tracker_aggregates() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.completion(), 1.0);

        let a = tracker.register(ExportTarget::from_names("db", "a").unwrap());
        let b = tracker.register(ExportTarget::from_names("db", "b").unwrap());
        assert_eq!(tracker.completion(), 0.0);
        assert_eq!(tracker.rows_done(), 0);

        a.start(0);
        b.start(10);
        b.advance(3);
        assert!((tracker.completion() - 0.3).abs() < f64::EPSILON);
        assert_eq!(tracker.rows_done(), 3);

        let reports = tracker.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].rows_total, 10);
    }

    #[test]
    fn test_hidden_display_tracks_position() {
        let display = ProgressDisplay::new(false);
        display.render(0.426);
        assert_eq!(display.position(), 42);
        display.finish(true);
        assert_eq!(display.position(), 100);
    }
}

//! Pass scheduling
//!
//! The [`Scheduler`] owns the reconciler and drives it either once or on a
//! fixed period until a shutdown future resolves.
//!
//! ## Timing
//!
//! ```text
//! t=0        pass 1 (immediate)
//! t=P        pass 2
//! t=2P       pass 3 ...
//! ```
//!
//! Passes never overlap: the next tick is awaited only after the current
//! pass has finished every family. A pass that overruns the period gets one
//! catch-up tick, after which ticks realign to multiples of the period
//! (missed ticks are skipped, never queued). Shutdown is only observed
//! between passes; an in-flight call is bounded by its own timeout.

use crate::engine::{PassReport, Reconciler};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::info;

/// Source of scheduling ticks
///
/// Production code uses [`IntervalTicker`]; tests drive passes by hand.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick
    async fn tick(&mut self);
}

/// Fixed-period ticker on the tokio clock
///
/// The first tick fires one period after creation, because the scheduler
/// runs its first pass immediately.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// Must be called from within a tokio runtime
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Owned scheduling loop
pub struct Scheduler {
    reconciler: Reconciler,
    /// `None` runs a single pass
    interval: Option<Duration>,
    ticker: Option<Box<dyn Ticker>>,
}

impl Scheduler {
    /// Create a scheduler
    ///
    /// # Parameters
    ///
    /// - `reconciler`: Reconciler for the configured target
    /// - `interval`: Period between passes; `None` runs once
    pub fn new(reconciler: Reconciler, interval: Option<Duration>) -> Self {
        Self {
            reconciler,
            interval,
            ticker: None,
        }
    }

    /// Replace the clock used in scheduled mode
    pub fn with_ticker(mut self, ticker: Box<dyn Ticker>) -> Self {
        self.ticker = Some(ticker);
        self
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Execute exactly one pass
    pub async fn run_once(&self) -> PassReport {
        self.reconciler.run_pass().await
    }

    /// Run passes until `shutdown` resolves
    ///
    /// Without an interval this runs a single pass and returns without
    /// waiting on `shutdown`. Otherwise it runs one pass immediately and one
    /// per tick after that.
    ///
    /// # Returns
    ///
    /// The number of passes executed.
    pub async fn run_until<F>(&mut self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let Some(period) = self.interval else {
            self.run_once().await;
            return 1;
        };

        let mut ticker = match self.ticker.take() {
            Some(ticker) => ticker,
            None => Box::new(IntervalTicker::new(period)),
        };

        info!(
            "Running every {} seconds. Press Ctrl+C to stop.",
            period.as_secs()
        );

        tokio::pin!(shutdown);

        self.run_once().await;
        let mut passes = 1;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received after {} pass(es)", passes);
                    break;
                }

                _ = ticker.tick() => {
                    info!(
                        "{} - Starting scheduled update...",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                    );
                    self.run_once().await;
                    passes += 1;
                }
            }
        }

        self.ticker = Some(ticker);
        passes
    }
}

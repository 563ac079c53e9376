use std::future::Future;
use std::time::Duration;
use async_trait::async_trait;
use nr_core::{Error, Result};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info};

/// What happens to ticks that fall due while a cycle is still running.
/// Cycles never overlap under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Drop missed ticks and wait for the next one on the fixed grid
    #[default]
    Skip,
    /// Deliver missed ticks back-to-back once the running cycle ends
    Queue,
}

#[async_trait]
pub trait Ticker: Send {
    /// Resolves when the next cycle is due
    async fn tick(&mut self);
}

pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// The first tick completes immediately.
    pub fn new(period: Duration, policy: OverlapPolicy) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::Config("schedule interval must be greater than zero".to_string()));
        }
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(match policy {
            OverlapPolicy::Skip => MissedTickBehavior::Skip,
            OverlapPolicy::Queue => MissedTickBehavior::Burst,
        });
        Ok(Self { interval })
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Run `cycle` on every tick, one at a time, until `max_cycles` cycles have
/// run (forever when `None`). Failed cycles are logged and do not stop the
/// loop. Returns the number of cycles run.
pub async fn run_periodic<T, F, Fut, R>(ticker: &mut T, max_cycles: Option<u64>, mut cycle: F) -> u64
where
    T: Ticker + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let mut completed = 0;
    while max_cycles.map_or(true, |max| completed < max) {
        ticker.tick().await;
        completed += 1;
        info!("⏰ Starting cycle {}", completed);
        if let Err(e) = cycle().await {
            error!("⏰ Cycle {} failed: {}", completed, e);
        }
    }
    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[derive(Default)]
    struct CountingTicker {
        ticks: usize,
    }

    #[async_trait]
    impl Ticker for CountingTicker {
        async fn tick(&mut self) {
            self.ticks += 1;
        }
    }

    #[tokio::test]
    async fn test_runs_requested_number_of_cycles() {
        let mut ticker = CountingTicker::default();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();

        let completed = run_periodic(&mut ticker, Some(3), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(())
            }
        })
        .await;

        assert_eq!(completed, 3);
        assert_eq!(ticker.ticks, 3);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_cycle_does_not_stop_loop() {
        let mut ticker = CountingTicker::default();
        let mut attempt = 0;
        let completed = run_periodic(&mut ticker, Some(2), || {
            attempt += 1;
            let fail = attempt == 1;
            async move {
                if fail {
                    Err(Error::Inference("model offline".to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert_eq!(completed, 2);
        assert_eq!(attempt, 2);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(IntervalTicker::new(Duration::ZERO, OverlapPolicy::Skip).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_policy_drops_missed_ticks() {
        let start = Instant::now();
        let mut ticker = IntervalTicker::new(Duration::from_secs(10), OverlapPolicy::Skip).unwrap();
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        // a cycle that overruns two periods
        tokio::time::sleep(Duration::from_secs(25)).await;
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(25));
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_policy_catches_up() {
        let start = Instant::now();
        let mut ticker = IntervalTicker::new(Duration::from_secs(10), OverlapPolicy::Queue).unwrap();
        ticker.tick().await;

        tokio::time::sleep(Duration::from_secs(25)).await;
        ticker.tick().await;
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(25));
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }
}

use std::time::{Duration, Instant};

use crate::lookup::LookupOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub elapsed: Duration,
}

/// Logs one FOUND / NOT FOUND line per outcome, then the elapsed time since `started_at`.
pub fn report<I>(outcomes: I, started_at: Instant) -> RunSummary
where
    I: IntoIterator<Item = LookupOutcome>,
{
    let mut found = 0usize;
    let mut not_found = 0usize;

    for outcome in outcomes {
        if outcome.is_found() {
            found += 1;
            tracing::info!("FOUND: {}", outcome.title());
        } else {
            not_found += 1;
            tracing::info!("NOT FOUND: {}", outcome.title());
        }
    }

    let elapsed = started_at.elapsed();
    tracing::info!("process finished in: {:.6} seconds", elapsed.as_secs_f64());

    RunSummary {
        total: found + not_found,
        found,
        not_found,
        elapsed,
    }
}

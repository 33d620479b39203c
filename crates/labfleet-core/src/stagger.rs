// ── Bounded-concurrency executor with post-task delay ──
//
// Runs one async task per item with at most `slots` tasks in flight. After
// a task succeeds it optionally sleeps *while still holding its slot*, so
// the delay spaces out when the next waiter may start instead of pausing
// the whole batch.

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use rand::Rng;

/// Sleep applied after each successful task, before its slot is released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostDelay {
    #[default]
    None,
    Fixed(Duration),
    /// Uniformly random in `[0, max]`, drawn per task.
    UpTo(Duration),
}

impl PostDelay {
    /// Jittered delay bounded by `max_secs`; zero disables it.
    pub fn jitter_secs(max_secs: u64) -> Self {
        if max_secs == 0 {
            Self::None
        } else {
            Self::UpTo(Duration::from_secs(max_secs))
        }
    }

    /// Draw the delay for one task.
    pub fn sample(&self) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => d,
            Self::UpTo(max) => {
                let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
                Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
            }
        }
    }
}

/// Run `task` for every item with at most `slots` running at once.
///
/// Results are returned in input order. A failed task releases its slot
/// immediately; only successes pay the post-delay.
pub async fn run_bounded<I, T, F, Fut, R, E>(
    items: I,
    slots: usize,
    post_delay: PostDelay,
    task: F,
) -> Vec<Result<R, E>>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let task = &task;
    let mut results: Vec<(usize, Result<R, E>)> = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| async move {
            let result = task(item).await;
            if result.is_ok() {
                let delay = post_delay.sample();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            (index, result)
        })
        .buffer_unordered(slots.max(1))
        .collect()
        .await;

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

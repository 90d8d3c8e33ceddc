// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::future::Future;
use std::time::Duration;

use tokio::select;
use tokio::spawn;
use tokio::sync::oneshot::channel;
use tokio::sync::oneshot::Sender;
use tokio::task::JoinHandle;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

use tracing::debug;


/// A handle to a periodic task created by [`schedule`].
///
/// Dropping the handle detaches the task: it keeps running for as long
/// as the runtime does. Use [`Schedule::cancel`] to stop it.
#[derive(Debug)]
#[must_use = "a scheduled task can only be cancelled through its handle"]
pub struct Schedule {
  stop: Sender<()>,
  task: JoinHandle<()>,
}

impl Schedule {
  /// Stop the periodic task.
  ///
  /// The callback is not invoked again once this method returns. If an
  /// invocation is in progress it is allowed to run to completion
  /// first.
  pub async fn cancel(self) {
    // The task may have ended already (e.g., because the callback
    // panicked), in which case there is nobody to receive the signal.
    let _ = self.stop.send(());
    if let Err(err) = self.task.await {
      debug!(error = %err, "scheduled task did not finish cleanly");
    }
  }

  /// Check whether the periodic task has ended.
  #[inline]
  pub fn is_finished(&self) -> bool {
    self.task.is_finished()
  }
}


/// Run `callback` every `interval` on a background task.
///
/// The first invocation happens one `interval` after this call.
/// Invocations never overlap: the next tick is only awaited once the
/// future returned by the previous invocation has completed, and ticks
/// missed in the meantime are not made up for.
///
/// Every call creates an independent timer.
///
/// # Panics
/// - if `interval` is zero
/// - if called outside of a tokio runtime
pub fn schedule<F, Fut>(interval: Duration, mut callback: F) -> Schedule
where
  F: FnMut() -> Fut + Send + 'static,
  Fut: Future<Output = ()> + Send + 'static,
{
  let (stop, mut stopped) = channel::<()>();
  let task = spawn(async move {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut detached = false;

    loop {
      select! {
        // A pending stop signal takes precedence over a due tick.
        biased;

        result = &mut stopped, if !detached => match result {
          Ok(()) => break,
          // The handle was dropped without cancelling. Keep ticking.
          Err(..) => detached = true,
        },
        _ = ticker.tick() => callback().await,
      }
    }
  });

  Schedule { stop, task }
}


#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::atomic::AtomicUsize;
  use std::sync::atomic::Ordering;
  use std::sync::Arc;

  use test_log::test;
  use tokio::time::sleep;


  fn counting(count: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send {
    let count = Arc::clone(count);
    move || {
      let _ = count.fetch_add(1, Ordering::SeqCst);
      std::future::ready(())
    }
  }


  /// Check that the callback is invoked periodically and no longer once
  /// the schedule got cancelled.
  #[test(tokio::test)]
  async fn periodic_invocation_and_cancellation() {
    let count = Arc::new(AtomicUsize::new(0));
    let schedule = schedule(Duration::from_millis(10), counting(&count));

    sleep(Duration::from_millis(55)).await;
    schedule.cancel().await;

    let invoked = count.load(Ordering::SeqCst);
    assert!(invoked >= 2, "{invoked}");

    sleep(Duration::from_millis(40)).await;
    assert_eq!(count.load(Ordering::SeqCst), invoked);
  }

  /// Check that the first invocation only happens after one interval.
  #[test(tokio::test)]
  async fn no_immediate_invocation() {
    let count = Arc::new(AtomicUsize::new(0));
    let schedule = schedule(Duration::from_secs(3600), counting(&count));

    sleep(Duration::from_millis(20)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!schedule.is_finished());
    schedule.cancel().await;
  }

  /// Check that dropping the handle does not stop the timer.
  #[test(tokio::test)]
  async fn detached_schedule_keeps_running() {
    let count = Arc::new(AtomicUsize::new(0));
    drop(schedule(Duration::from_millis(10), counting(&count)));

    sleep(Duration::from_millis(55)).await;
    assert!(count.load(Ordering::SeqCst) >= 2);
  }

  /// Check that a cancellation is honored even when a tick is due at
  /// the same time.
  #[test(tokio::test)]
  async fn cancel_preempts_due_tick() {
    let count = Arc::new(AtomicUsize::new(0));
    let schedule = schedule(Duration::from_millis(10), counting(&count));

    // Let the task start its timer, then block the runtime's only
    // thread until a tick is overdue.
    tokio::task::yield_now().await;
    std::thread::sleep(Duration::from_millis(30));
    schedule.cancel().await;

    assert_eq!(count.load(Ordering::SeqCst), 0);
  }

  /// Check that independent schedules do not interfere.
  #[test(tokio::test)]
  async fn independent_schedules() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let schedule1 = schedule(Duration::from_millis(10), counting(&first));
    let schedule2 = schedule(Duration::from_millis(10), counting(&second));

    sleep(Duration::from_millis(35)).await;
    schedule1.cancel().await;
    let stopped = first.load(Ordering::SeqCst);

    sleep(Duration::from_millis(35)).await;
    assert_eq!(first.load(Ordering::SeqCst), stopped);
    assert!(second.load(Ordering::SeqCst) > stopped);
    schedule2.cancel().await;
  }
}

// ── Two-priority command queue ──
//
// FIFO within a priority; the user queue is always drained first. Pushes
// never block. Only the dispatcher pops, so the lock is held for a
// handful of instructions and never across an await.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use super::{Command, Priority};

/// A command already encoded for the wire.
#[derive(Debug, Clone)]
pub(crate) struct QueuedCommand {
    pub command: Command,
    pub priority: Priority,
    pub lines: Vec<String>,
}

#[derive(Default)]
struct Lanes {
    user: VecDeque<QueuedCommand>,
    periodic: VecDeque<QueuedCommand>,
}

#[derive(Default)]
pub(crate) struct CommandQueue {
    lanes: Mutex<Lanes>,
    /// Commands popped but not yet finished (sent or given up).
    in_flight: AtomicUsize,
    /// Woken whenever the queue may have become idle.
    drained: Notify,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, queued: QueuedCommand) {
        let mut lanes = self.lock();
        match queued.priority {
            Priority::User => lanes.user.push_back(queued),
            Priority::Periodic => lanes.periodic.push_back(queued),
        }
    }

    /// Take the next command, user lane first.
    ///
    /// The caller must report completion through [`finish`](Self::finish).
    pub(crate) fn pop(&self) -> Option<QueuedCommand> {
        let mut lanes = self.lock();
        let next = lanes.user.pop_front().or_else(|| lanes.periodic.pop_front());
        if next.is_some() {
            self.in_flight.fetch_add(1, Ordering::AcqRel);
        }
        next
    }

    pub(crate) fn finish(&self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        if self.is_idle() {
            self.drained.notify_waiters();
        }
    }

    pub(crate) fn has_queued(&self) -> bool {
        let lanes = self.lock();
        !lanes.user.is_empty() || !lanes.periodic.is_empty()
    }

    /// Nothing queued and nothing being sent.
    pub(crate) fn is_idle(&self) -> bool {
        !self.has_queued() && self.in_flight.load(Ordering::Acquire) == 0
    }

    /// Drop everything still waiting. Returns how many commands were dropped.
    pub(crate) fn clear(&self) -> usize {
        let mut lanes = self.lock();
        let dropped = lanes.user.len() + lanes.periodic.len();
        lanes.user.clear();
        lanes.periodic.clear();
        drop(lanes);
        self.drained.notify_waiters();
        dropped
    }

    /// Wait until nothing is queued or in flight.
    pub(crate) async fn wait_idle(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register before checking so a wakeup in between is not lost.
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Lanes> {
        self.lanes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn queued(verb: &str, priority: Priority) -> QueuedCommand {
        let command = Command::query(verb);
        let lines = command.encode(None);
        QueuedCommand {
            command,
            priority,
            lines,
        }
    }

    fn verb(q: &QueuedCommand) -> String {
        q.command.to_string()
    }

    #[test]
    fn user_lane_is_drained_first() {
        let queue = CommandQueue::new();
        queue.push(queued("sop", Priority::Periodic));
        queue.push(queued("skd", Priority::Periodic));
        queue.push(queued("u1", Priority::User));
        queue.push(queued("u2", Priority::User));

        let order: Vec<String> = std::iter::from_fn(|| {
            let next = queue.pop()?;
            queue.finish();
            Some(verb(&next))
        })
        .collect();

        assert_eq!(
            order,
            vec!["query u1", "query u2", "query sop", "query skd"]
        );
    }

    #[test]
    fn in_flight_command_keeps_queue_busy() {
        let queue = CommandQueue::new();
        assert!(queue.is_idle());

        queue.push(queued("sop", Priority::User));
        assert!(!queue.is_idle());

        let _cmd = queue.pop().unwrap();
        assert!(!queue.has_queued());
        assert!(!queue.is_idle());

        queue.finish();
        assert!(queue.is_idle());
    }

    #[tokio::test]
    async fn wait_idle_returns_after_last_finish() {
        let queue = std::sync::Arc::new(CommandQueue::new());
        queue.push(queued("sop", Priority::User));
        let _cmd = queue.pop().unwrap();

        let waiter = {
            let queue = std::sync::Arc::clone(&queue);
            tokio::spawn(async move { queue.wait_idle().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        queue.finish();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn clear_reports_dropped_commands() {
        let queue = CommandQueue::new();
        queue.push(queued("sop", Priority::User));
        queue.push(queued("skd", Priority::Periodic));
        assert_eq!(queue.clear(), 2);
        assert!(queue.pop().is_none());
    }
}

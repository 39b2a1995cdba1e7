//! Tick scheduler
//!
//! A tick is one poll of the request's execution future. While that poll
//! runs, resolvers register keys with loaders; when it returns `Pending`
//! without having woken itself, no synchronous work is left and the tick has
//! drained. At that point the scheduler closes every open batch window so
//! the loaders dispatch, then polls again. Window closing depends only on
//! tick draining, never on elapsed time.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use futures_util::task::{waker, ArcWake};

use crate::sync::lock;

/// Per-request scheduler handle
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone, Default)]
pub struct Scheduler {
    gates: Arc<Mutex<Vec<Arc<Gate>>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `future` with tick-drain window closing
    pub fn run<F: Future>(&self, future: F) -> Tick<F> {
        Tick {
            future: Box::pin(future),
            scheduler: self.clone(),
            signal: Arc::new(TickSignal::default()),
        }
    }

    /// Open a gate that is released at the end of the current tick
    pub(crate) fn open_gate(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        lock(&self.gates).push(gate.clone());
        gate
    }

    /// Number of gates waiting for the tick to drain
    pub fn pending_windows(&self) -> usize {
        lock(&self.gates).len()
    }

    /// Release every open gate; returns how many were released
    fn drain(&self) -> usize {
        let gates = std::mem::take(&mut *lock(&self.gates));
        for gate in &gates {
            gate.release();
        }
        gates.len()
    }
}

/// Barrier a batch waits on before dispatching
#[derive(Default)]
pub(crate) struct Gate {
    state: Mutex<GateState>,
}

#[derive(Default)]
struct GateState {
    released: bool,
    wakers: Vec<Waker>,
}

impl Gate {
    fn release(&self) {
        let wakers = {
            let mut state = lock(&self.state);
            state.released = true;
            std::mem::take(&mut state.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }

    /// Wait until the gate is released
    pub(crate) fn wait(self: Arc<Self>) -> GateWait {
        GateWait { gate: self }
    }
}

/// Future resolving once its gate is released
pub(crate) struct GateWait {
    gate: Arc<Gate>,
}

impl Future for GateWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = lock(&self.gate.state);
        if state.released {
            return Poll::Ready(());
        }
        if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

/// Records whether the driven future was woken, forwarding to the task
#[derive(Default)]
struct TickSignal {
    woken: AtomicBool,
    task: Mutex<Option<Waker>>,
}

impl ArcWake for TickSignal {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::SeqCst);
        if let Some(task) = lock(&arc_self.task).as_ref() {
            task.wake_by_ref();
        }
    }
}

/// Future returned by [`Scheduler::run`]
pub struct Tick<F: Future> {
    future: Pin<Box<F>>,
    scheduler: Scheduler,
    signal: Arc<TickSignal>,
}

impl<F: Future> Future for Tick<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
        let this = self.get_mut();
        *lock(&this.signal.task) = Some(cx.waker().clone());
        let inner_waker = waker(this.signal.clone());
        let mut inner_cx = Context::from_waker(&inner_waker);

        loop {
            this.signal.woken.store(false, Ordering::SeqCst);
            if let Poll::Ready(output) = this.future.as_mut().poll(&mut inner_cx) {
                return Poll::Ready(output);
            }

            // Woken during its own poll: work is still queued and the task
            // has already been rescheduled, so the tick has not drained.
            if this.signal.woken.load(Ordering::SeqCst) {
                return Poll::Pending;
            }

            if this.scheduler.drain() == 0 {
                return Poll::Pending;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields once, waking itself during the poll
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                return Poll::Ready(());
            }
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    #[tokio::test]
    async fn test_gate_released_when_tick_drains() {
        let scheduler = Scheduler::new();
        let gate = scheduler.open_gate();
        assert_eq!(scheduler.pending_windows(), 1);

        scheduler.run(gate.wait()).await;
        assert_eq!(scheduler.pending_windows(), 0);
    }

    #[tokio::test]
    async fn test_gate_waits_for_yielding_work() {
        let scheduler = Scheduler::new();
        let gate = scheduler.open_gate();
        let order = Arc::new(Mutex::new(Vec::new()));

        let waiter = {
            let order = order.clone();
            async move {
                gate.wait().await;
                lock(&order).push("dispatch");
            }
        };
        let worker = {
            let order = order.clone();
            async move {
                for _ in 0..3 {
                    YieldOnce(false).await;
                }
                lock(&order).push("work");
            }
        };

        scheduler
            .run(async { futures_util::future::join(waiter, worker).await })
            .await;

        assert_eq!(*lock(&order), vec!["work", "dispatch"]);
    }

    #[tokio::test]
    async fn test_run_without_windows_passes_through() {
        let scheduler = Scheduler::new();
        let value = scheduler.run(async { 7 }).await;
        assert_eq!(value, 7);
    }
}

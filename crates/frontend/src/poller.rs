//! Fetch-render loop driven by the simulation service.
//!
//! One cycle fetches a snapshot, hands it to the caller and then waits for the
//! pacer before the next cycle starts, so at most one request is ever in
//! flight. A failed fetch is logged and the previous frame stays on screen.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use trafficflow_shared::models::Snapshot;

use crate::api::ApiError;

/// Anything that can produce the current snapshot.
#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot, ApiError>;
}

/// Delay between the end of one cycle and the start of the next.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    async fn pace(&self);
}

/// Waits the fixed interval, then for the next animation frame.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    interval: Duration,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Pacer for FramePacer {
    async fn pace(&self) {
        let millis = u32::try_from(self.interval.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::future::TimeoutFuture::new(millis).await;
        next_animation_frame().await;
    }
}

/// Resolves on the next `requestAnimationFrame` callback, or immediately when
/// there is no window to ask.
async fn next_animation_frame() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let promise = js_sys::Promise::new(&mut |resolve: js_sys::Function, _reject: js_sys::Function| {
        if window.request_animation_frame(&resolve).is_err() {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Rc<Cell<bool>>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Delivered { tick: u64 },
    Failed,
    /// The token was stopped while the request was in flight; the result was dropped.
    Cancelled,
}

pub struct Poller<S, P> {
    source: S,
    pacer: P,
    stop: StopToken,
    state: Cell<PollState>,
    cycles: Cell<u64>,
    consecutive_failures: Cell<u32>,
}

impl<S: SnapshotSource, P: Pacer> Poller<S, P> {
    pub fn new(source: S, pacer: P, stop: StopToken) -> Self {
        Self {
            source,
            pacer,
            stop,
            state: Cell::new(PollState::Idle),
            cycles: Cell::new(0),
            consecutive_failures: Cell::new(0),
        }
    }

    /// Run until the stop token is set. The token is checked at the top of
    /// every cycle; the outcome of a cycle never ends the loop.
    pub async fn run(&self, mut on_snapshot: impl FnMut(Snapshot)) {
        tracing::info!("snapshot polling started");
        while !self.stop.is_stopped() {
            self.cycle(&mut on_snapshot).await;
            self.pacer.pace().await;
        }
        tracing::info!(cycles = self.cycles.get(), "snapshot polling stopped");
    }

    /// One fetch plus delivery. Returns once delivery (or the failure log) is done.
    pub async fn cycle(&self, on_snapshot: &mut impl FnMut(Snapshot)) -> CycleOutcome {
        let cycle = self.cycles.get() + 1;
        self.cycles.set(cycle);

        self.state.set(PollState::AwaitingResponse);
        let result = self.source.fetch_snapshot().await;
        self.state.set(PollState::Idle);

        if self.stop.is_stopped() {
            return CycleOutcome::Cancelled;
        }

        match result {
            Ok(snapshot) => {
                if self.consecutive_failures.get() > 0 {
                    tracing::info!(
                        cycle,
                        failures = self.consecutive_failures.get(),
                        "snapshot feed recovered"
                    );
                }
                self.consecutive_failures.set(0);
                let tick = snapshot.tick;
                tracing::debug!(cycle, tick, "snapshot received");
                on_snapshot(snapshot);
                CycleOutcome::Delivered { tick }
            }
            Err(e) => {
                self.consecutive_failures.set(self.consecutive_failures.get() + 1);
                tracing::warn!(cycle, error = %e, "snapshot fetch failed");
                CycleOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use crate::render::tests::sample_snapshot;

    /// Replays a fixed list of outcomes, then keeps failing.
    struct ScriptedSource {
        outcomes: RefCell<VecDeque<Result<Snapshot, ApiError>>>,
        calls: Cell<u32>,
        stop_after: Option<(u32, StopToken)>,
    }

    impl ScriptedSource {
        fn new(outcomes: Vec<Result<Snapshot, ApiError>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                calls: Cell::new(0),
                stop_after: None,
            }
        }
    }

    impl SnapshotSource for ScriptedSource {
        async fn fetch_snapshot(&self) -> Result<Snapshot, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if let Some((n, token)) = &self.stop_after {
                if self.calls.get() >= *n {
                    token.stop();
                }
            }
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(ApiError::Transport("script exhausted".to_string())))
        }
    }

    /// No delay; stops the loop after a fixed number of paces.
    struct CountingPacer {
        paces: Cell<u32>,
        stop_at: u32,
        token: StopToken,
    }

    impl Pacer for CountingPacer {
        async fn pace(&self) {
            self.paces.set(self.paces.get() + 1);
            if self.paces.get() >= self.stop_at {
                self.token.stop();
            }
        }
    }

    fn pacer(stop_at: u32, token: &StopToken) -> CountingPacer {
        CountingPacer {
            paces: Cell::new(0),
            stop_at,
            token: token.clone(),
        }
    }

    #[test]
    fn test_two_failures_then_success_delivers_once() {
        let token = StopToken::new();
        let source = ScriptedSource::new(vec![
            Err(ApiError::Transport("connection refused".to_string())),
            Err(ApiError::Status(503)),
            Ok(sample_snapshot(3)),
        ]);
        let poller = Poller::new(source, pacer(3, &token), token.clone());

        let mut delivered: Vec<u64> = Vec::new();
        pollster::block_on(poller.run(|snap| delivered.push(snap.tick)));

        assert_eq!(poller.source.calls.get(), 3);
        assert_eq!(delivered, vec![3]);
        assert_eq!(poller.consecutive_failures.get(), 0);
        assert_eq!(poller.state.get(), PollState::Idle);
    }

    #[test]
    fn test_failures_do_not_deliver() {
        let token = StopToken::new();
        let source = ScriptedSource::new(vec![
            Err(ApiError::Status(500)),
            Err(ApiError::Transport("timeout".to_string())),
        ]);
        let poller = Poller::new(source, pacer(u32::MAX, &token), token);
        let mut delivered = 0;
        let mut deliver = |_snap: Snapshot| delivered += 1;

        assert_eq!(pollster::block_on(poller.cycle(&mut deliver)), CycleOutcome::Failed);
        assert_eq!(pollster::block_on(poller.cycle(&mut deliver)), CycleOutcome::Failed);
        assert_eq!(poller.consecutive_failures.get(), 2);
        assert_eq!(poller.cycles.get(), 2);
        assert_eq!(delivered, 0);
    }

    #[test]
    fn test_stopped_token_prevents_any_request() {
        let token = StopToken::new();
        token.stop();
        let source = ScriptedSource::new(vec![Ok(sample_snapshot(1))]);
        let poller = Poller::new(source, pacer(u32::MAX, &token), token);
        let mut delivered = 0;
        pollster::block_on(poller.run(|_| delivered += 1));
        assert_eq!(poller.source.calls.get(), 0);
        assert_eq!(delivered, 0);
    }

    #[test]
    fn test_stop_during_fetch_drops_result() {
        let token = StopToken::new();
        let mut source = ScriptedSource::new(vec![Ok(sample_snapshot(1)), Ok(sample_snapshot(2))]);
        source.stop_after = Some((2, token.clone()));
        let poller = Poller::new(source, pacer(u32::MAX, &token), token.clone());

        let mut delivered: Vec<u64> = Vec::new();
        pollster::block_on(poller.run(|snap| delivered.push(snap.tick)));

        assert_eq!(delivered, vec![1]);
        assert_eq!(poller.source.calls.get(), 2);
        assert!(token.is_stopped());
    }

    #[test]
    fn test_cycles_run_strictly_one_after_another() {
        let token = StopToken::new();
        let source = ScriptedSource::new(vec![
            Ok(sample_snapshot(1)),
            Err(ApiError::Status(502)),
            Ok(sample_snapshot(3)),
            Ok(sample_snapshot(4)),
        ]);
        let poller = Poller::new(source, pacer(4, &token), token);

        let log = RefCell::new(Vec::new());
        pollster::block_on(poller.run(|snap| {
            // delivery happens after the response, never while awaiting one
            log.borrow_mut().push(snap.tick);
        }));

        assert_eq!(*log.borrow(), vec![1, 3, 4]);
        assert_eq!(poller.cycles.get(), 4);
        assert_eq!(poller.pacer.paces.get(), 4);
    }

    #[test]
    fn test_stop_token_clones_share_state() {
        let token = StopToken::new();
        let handle = token.clone();
        assert!(!token.is_stopped());
        handle.stop();
        assert!(token.is_stopped());
    }
}

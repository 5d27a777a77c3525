//! The stepping protocol: [`Machine`], [`Stepper`], [`Clock`], [`Session`].
//!
//! A [`Machine`] exposes one unit of observable work per
//! [`advance`](Machine::advance). A [`Stepper`] drives it to completion,
//! handing every post-advance snapshot to the renderer and pausing for the
//! configured delay between steps. Pacing is either host-driven
//! ([`Stepper::poll`]) or blocking against an injected [`Clock`]
//! ([`Stepper::run`]); both produce the same snapshot sequence for any delay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::StepError;

// ---------------------------------------------------------------------------
// Context (cancellation token)
// ---------------------------------------------------------------------------

/// A cooperative-cancellation token backed by an [`AtomicBool`].
///
/// Clones share the same flag, so the host keeps one clone as the handle of
/// a run and the stepper checks another.
#[derive(Clone, Debug)]
pub struct Context {
    done: Arc<AtomicBool>,
}

impl Context {
    /// Create a new, non-cancelled context.
    pub fn new() -> Self {
        Self {
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.done.store(true, Ordering::Relaxed);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Result of a single [`Machine::advance`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// One observable unit of work happened; more remain.
    Progress,
    /// The machine reached a terminal state with this result.
    Done(T),
    /// An invariant broke; the run must be aborted.
    Failed(StepError),
}

/// An algorithm expressed as a deterministic transition over owned state.
pub trait Machine {
    /// Immutable, render-ready view of the state at a step boundary.
    type Snapshot;
    /// Result produced by the terminal step.
    type Output;

    /// Perform exactly one unit of observable work. Never a no-op.
    fn advance(&mut self) -> Step<Self::Output>;

    /// Capture the current state for the renderer.
    fn snapshot(&self) -> Self::Snapshot;
}

impl<M: Machine + ?Sized> Machine for Box<M> {
    type Snapshot = M::Snapshot;
    type Output = M::Output;

    fn advance(&mut self) -> Step<M::Output> {
        (**self).advance()
    }

    fn snapshot(&self) -> M::Snapshot {
        (**self).snapshot()
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Time source and suspension primitive used by [`Stepper::run`].
pub trait Clock {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Suspend for `d`.
    fn sleep(&mut self, d: Duration);
}

/// Wall-clock time; [`sleep`](Clock::sleep) blocks the current thread.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

/// Virtual time that only moves when slept on. Never blocks.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Duration,
    sleeps: usize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward without counting a sleep.
    pub fn advance(&mut self, d: Duration) {
        self.now += d;
    }

    /// Number of suspensions requested so far.
    pub fn sleeps(&self) -> usize {
        self.sleeps
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, d: Duration) {
        self.sleeps += 1;
        self.now += d;
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Produced once per completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport<T> {
    pub output: T,
    /// Number of `advance` calls, the terminal one included.
    pub steps: usize,
    /// Time between the first `advance` and the terminal one.
    pub elapsed: Duration,
}

/// How a [`Stepper::run`] ended, short of an invariant failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<T> {
    Completed(RunReport<T>),
    Cancelled { steps: usize },
}

impl<T> RunOutcome<T> {
    /// The report, if the run was not cancelled.
    pub fn completed(self) -> Option<RunReport<T>> {
        match self {
            Self::Completed(r) => Some(r),
            Self::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result of a single [`Stepper::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum Tick<S, T> {
    Snapshot(S),
    Finished { snapshot: S, report: RunReport<T> },
    Cancelled,
    Failed(StepError),
}

// ---------------------------------------------------------------------------
// Stepper
// ---------------------------------------------------------------------------

/// Drives a [`Machine`] one step at a time.
///
/// The stepper is single-threaded: it owns its machine exclusively, so no
/// two `advance` calls for the same machine can overlap. Suspension happens
/// only between steps.
pub struct Stepper<M: Machine> {
    machine: M,
    delay: Duration,
    ctx: Context,
    steps: usize,
    started: Option<Duration>,
    due: Duration,
    finished: bool,
    cancelled: bool,
}

impl<M: Machine> Stepper<M> {
    /// Create a stepper with its own cancellation context.
    pub fn new(machine: M, delay: Duration) -> Self {
        Self::with_context(machine, delay, Context::new())
    }

    /// Create a stepper bound to an existing context, e.g. one handed out by
    /// [`Session::begin`].
    pub fn with_context(machine: M, delay: Duration, ctx: Context) -> Self {
        Self {
            machine,
            delay,
            ctx,
            steps: 0,
            started: None,
            due: Duration::ZERO,
            finished: false,
            cancelled: false,
        }
    }

    /// A handle that cancels this run when [`Context::cancel`] is called.
    pub fn context(&self) -> Context {
        self.ctx.clone()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of `advance` calls made so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Whether a terminal tick (finished, cancelled or failed) was produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Earliest time at which [`poll`](Stepper::poll) will step again.
    pub fn due(&self) -> Duration {
        self.due
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn into_machine(self) -> M {
        self.machine
    }

    /// Advance the machine once, without any pacing.
    ///
    /// `now` is the caller's clock reading; it stamps the run's elapsed time
    /// and schedules the next due time. Once cancelled, every later tick
    /// reports [`Tick::Cancelled`] again.
    pub fn tick(&mut self, now: Duration) -> Tick<M::Snapshot, M::Output> {
        if self.cancelled {
            return Tick::Cancelled;
        }
        if self.finished {
            return Tick::Failed(StepError::Finished);
        }
        if self.ctx.is_done() {
            return self.stop_cancelled();
        }
        let started = *self.started.get_or_insert(now);

        let step = self.machine.advance();
        self.steps += 1;
        log::trace!("step {} advanced", self.steps);

        match step {
            Step::Progress => {
                // Cancellation may land while advancing; nothing more reaches
                // the renderer after that.
                if self.ctx.is_done() {
                    return self.stop_cancelled();
                }
                self.due = now + self.delay;
                Tick::Snapshot(self.machine.snapshot())
            }
            Step::Done(output) => {
                if self.ctx.is_done() {
                    return self.stop_cancelled();
                }
                self.finished = true;
                let report = RunReport {
                    output,
                    steps: self.steps,
                    elapsed: now.saturating_sub(started),
                };
                log::debug!("run finished after {} steps in {:?}", report.steps, report.elapsed);
                Tick::Finished {
                    snapshot: self.machine.snapshot(),
                    report,
                }
            }
            Step::Failed(err) => {
                self.finished = true;
                log::warn!("run aborted at step {}: {err}", self.steps);
                Tick::Failed(err)
            }
        }
    }

    /// Host-driven pacing: step only once `now` has reached the due time.
    ///
    /// Returns `None` while waiting or after the run has ended.
    pub fn poll(&mut self, now: Duration) -> Option<Tick<M::Snapshot, M::Output>> {
        if self.finished || now < self.due {
            return None;
        }
        Some(self.tick(now))
    }

    /// Drive the machine to completion.
    ///
    /// `on_snapshot` is called synchronously after every progress step and
    /// after the terminal step; the clock sleeps for the delay between steps
    /// (never after the last one, never with a zero delay).
    pub fn run<C, F>(
        &mut self,
        clock: &mut C,
        mut on_snapshot: F,
    ) -> Result<RunOutcome<M::Output>, StepError>
    where
        C: Clock,
        F: FnMut(M::Snapshot),
    {
        log::debug!("run started with {:?} between steps", self.delay);
        loop {
            match self.tick(clock.now()) {
                Tick::Snapshot(s) => {
                    on_snapshot(s);
                    if !self.delay.is_zero() {
                        clock.sleep(self.delay);
                    }
                }
                Tick::Finished { snapshot, report } => {
                    on_snapshot(snapshot);
                    return Ok(RunOutcome::Completed(report));
                }
                Tick::Cancelled => {
                    return Ok(RunOutcome::Cancelled { steps: self.steps });
                }
                Tick::Failed(err) => return Err(err),
            }
        }
    }

    fn stop_cancelled(&mut self) -> Tick<M::Snapshot, M::Output> {
        self.finished = true;
        self.cancelled = true;
        log::debug!("run cancelled after {} steps", self.steps);
        Tick::Cancelled
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Tracks the active run of one visualizer instance.
///
/// Beginning a new run cancels the previous one, so two machines never
/// interleave over the same visual state.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<Context>,
    runs: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede the current run (if any) and hand out a fresh context.
    pub fn begin(&mut self) -> Context {
        if let Some(prev) = self.current.take() {
            if !prev.is_done() {
                log::debug!("superseding run #{}", self.runs);
                prev.cancel();
            }
        }
        let ctx = Context::new();
        self.current = Some(ctx.clone());
        self.runs += 1;
        ctx
    }

    /// Cancel the current run without starting another.
    pub fn cancel(&mut self) {
        if let Some(ctx) = self.current.take() {
            ctx.cancel();
        }
    }

    /// Whether a run was begun and has not been cancelled.
    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|c| !c.is_done())
    }

    /// Number of runs begun so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

// ---------------------------------------------------------------------------
// Background runs
// ---------------------------------------------------------------------------

/// Message streamed from a background run.
#[derive(Debug)]
pub enum Event<S, T> {
    Snapshot(S),
    Finished(RunReport<T>),
    Cancelled,
    Failed(StepError),
}

/// Handle on a run spawned with [`spawn`].
///
/// Dropping the handle drops the receiver; the run notices on its next
/// snapshot and stops.
pub struct RunHandle<S, T> {
    ctx: Context,
    events: Receiver<Event<S, T>>,
    join: JoinHandle<()>,
}

impl<S, T> RunHandle<S, T> {
    pub fn cancel(&self) {
        self.ctx.cancel();
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Block until the next event; `None` once the run has ended.
    pub fn recv(&self) -> Option<Event<S, T>> {
        self.events.recv().ok()
    }

    /// Non-blocking variant of [`recv`](RunHandle::recv).
    pub fn try_recv(&self) -> Option<Event<S, T>> {
        self.events.try_recv().ok()
    }

    /// Wait for the worker thread to exit.
    pub fn join(self) {
        if self.join.join().is_err() {
            log::warn!("background run panicked");
        }
    }
}

/// Run `machine` on a background thread with a [`SystemClock`].
///
/// Every snapshot, then one terminal event, is sent through the handle's
/// channel.
pub fn spawn<M>(machine: M, delay: Duration, ctx: Context) -> RunHandle<M::Snapshot, M::Output>
where
    M: Machine + Send + 'static,
    M::Snapshot: Send + 'static,
    M::Output: Send + 'static,
{
    let (tx, rx): (Sender<Event<_, _>>, Receiver<Event<_, _>>) = mpsc::channel();
    let run_ctx = ctx.clone();

    let join = thread::spawn(move || {
        let watch = run_ctx.clone();
        let mut stepper = Stepper::with_context(machine, delay, run_ctx);
        let mut clock = SystemClock::new();
        let snap_tx = tx.clone();
        let result = stepper.run(&mut clock, |s| {
            if snap_tx.send(Event::Snapshot(s)).is_err() {
                watch.cancel();
            }
        });
        let last = match result {
            Ok(RunOutcome::Completed(report)) => Event::Finished(report),
            Ok(RunOutcome::Cancelled { .. }) => Event::Cancelled,
            Err(err) => Event::Failed(err),
        };
        tx.send(last).ok();
    });

    RunHandle {
        ctx,
        events: rx,
        join,
    }
}

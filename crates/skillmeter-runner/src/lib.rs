//! skillmeter-runner: Drives one practice session in real time.
//!
//! The clock and the answer source are the only two stimulus sources. Both
//! are awaited in a single loop, so every tick or answer is applied to the
//! session in full before the next one is looked at.

pub mod clock;

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use skillmeter_core::report::RunOutcome;
use skillmeter_core::session::{AssessmentSession, SessionSnapshot, SubmitOutcome};

pub use clock::{ClockHandle, SessionClock, DEFAULT_TICK_PERIOD};

/// Where answers come from: a terminal, a UI, a script.
///
/// `next_answer` races the clock and is dropped whenever a tick arrives
/// first, so implementations must be cancel-safe: a dropped call must not
/// lose an answer that was already read.
#[async_trait]
pub trait AnswerSource: Send {
    /// Wait for the next selected option index. `Ok(None)` means the source
    /// has gone away and the session should be abandoned.
    async fn next_answer(&mut self, snapshot: &SessionSnapshot) -> Result<Option<usize>>;
}

/// Session event callbacks for presentation.
pub trait SessionObserver: Send + Sync {
    fn on_start(&self, snapshot: &SessionSnapshot);
    fn on_tick(&self, snapshot: &SessionSnapshot);
    fn on_answer(&self, outcome: SubmitOutcome, snapshot: &SessionSnapshot);
    fn on_finish(&self, snapshot: &SessionSnapshot);
    fn on_abandon(&self, snapshot: &SessionSnapshot);
}

/// No-op session observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_start(&self, _: &SessionSnapshot) {}
    fn on_tick(&self, _: &SessionSnapshot) {}
    fn on_answer(&self, _: SubmitOutcome, _: &SessionSnapshot) {}
    fn on_finish(&self, _: &SessionSnapshot) {}
    fn on_abandon(&self, _: &SessionSnapshot) {}
}

/// Runs sessions against a clock with a fixed tick period.
#[derive(Debug, Clone, Copy, Default)]
pub struct PracticeRunner {
    clock: SessionClock,
}

impl PracticeRunner {
    pub fn new(tick_period: Duration) -> Self {
        Self {
            clock: SessionClock::new(tick_period),
        }
    }

    /// Run `session` until it finishes or the answer source goes away.
    ///
    /// The clock lives only for the duration of this call and is stopped on
    /// every exit path, including errors from the answer source.
    pub async fn run(
        &self,
        session: &mut AssessmentSession,
        answers: &mut dyn AnswerSource,
        observer: &dyn SessionObserver,
    ) -> Result<RunOutcome> {
        let snapshot = session.snapshot();
        observer.on_start(&snapshot);
        if let Some(reason) = session.termination() {
            observer.on_finish(&snapshot);
            return Ok(RunOutcome::Finished(reason));
        }

        tracing::info!(
            session = %session.id(),
            bank = %session.bank().id,
            questions = session.bank().len(),
            duration_secs = session.config().duration_secs,
            "practice session started"
        );

        let (tick_tx, mut ticks) = mpsc::unbounded_channel::<()>();
        let clock = self.clock.start(move || match tick_tx.send(()) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        });

        let outcome = loop {
            if let Some(reason) = session.termination() {
                observer.on_finish(&session.snapshot());
                break RunOutcome::Finished(reason);
            }

            let snapshot = session.snapshot();
            tokio::select! {
                biased;
                Some(()) = ticks.recv() => {
                    session.tick();
                    observer.on_tick(&session.snapshot());
                }
                answer = answers.next_answer(&snapshot) => match answer {
                    Ok(Some(index)) => {
                        let result = session.submit_answer(index);
                        observer.on_answer(result, &session.snapshot());
                    }
                    Ok(None) => {
                        tracing::warn!(
                            session = %session.id(),
                            cursor = session.cursor(),
                            "answer source closed, abandoning session"
                        );
                        observer.on_abandon(&session.snapshot());
                        break RunOutcome::Abandoned;
                    }
                    Err(e) => {
                        ticks.close();
                        clock.shutdown().await;
                        return Err(e);
                    }
                },
            }
        };

        // Close the channel first so a tick racing the shutdown can never
        // reach the session.
        ticks.close();
        clock.shutdown().await;

        tracing::info!(
            session = %session.id(),
            score = session.score(),
            total = session.bank().len(),
            remaining_seconds = session.remaining_seconds(),
            %outcome,
            "practice session ended"
        );
        Ok(outcome)
    }
}

/// An in-memory answer source that replays a fixed list of selections.
///
/// Each answer becomes available `delay` after the previous one was taken
/// (or after the first call). Once drained the source either waits forever,
/// leaving the clock to end the session, or reports that it has closed.
#[derive(Debug, Clone)]
pub struct ScriptedAnswers {
    queue: VecDeque<usize>,
    delay: Duration,
    close_when_drained: bool,
    ready_at: Option<Instant>,
}

impl ScriptedAnswers {
    pub fn new(answers: impl IntoIterator<Item = usize>) -> Self {
        Self {
            queue: answers.into_iter().collect(),
            delay: Duration::ZERO,
            close_when_drained: false,
            ready_at: None,
        }
    }

    /// Wait this long before delivering each answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report `None` instead of waiting forever once every answer is used.
    pub fn closing_when_drained(mut self) -> Self {
        self.close_when_drained = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl AnswerSource for ScriptedAnswers {
    async fn next_answer(&mut self, _snapshot: &SessionSnapshot) -> Result<Option<usize>> {
        if self.queue.is_empty() {
            if self.close_when_drained {
                return Ok(None);
            }
            std::future::pending::<()>().await;
        }

        // The deadline survives cancellation so a tick does not restart
        // the wait.
        let ready_at = *self.ready_at.get_or_insert_with(|| Instant::now() + self.delay);
        tokio::time::sleep_until(ready_at).await;
        self.ready_at = None;
        Ok(self.queue.pop_front())
    }
}

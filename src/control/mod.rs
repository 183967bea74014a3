// Concurrent scheduling of decision, observation and watchdog work

mod decision;
mod history;
mod observer;
mod session;
mod watchdog;

pub use history::History;
pub use session::{Decision, Session, SessionFlags};

use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;
use tracing::debug;

use crate::ai::{OpponentModel, PaddleModel};
use crate::arena::{ArenaSnapshot, TickContext};
use crate::config::Config;
use crate::search::Planner;

/// Handle to one game session's decision engine: the two learned models,
/// the shared session state and the three background workers.
///
/// The host simulation drives it from its tick loop: publish a snapshot,
/// execute the active tactic, and raise success/failure on scoring events.
pub struct Controller {
    session: Arc<Session>,
    paddle: Arc<PaddleModel>,
    opponent: Arc<OpponentModel>,
    workers: Vec<JoinHandle<()>>,
}

impl Controller {
    /// Build the models and start the workers for a new session.
    pub fn spawn(config: Config) -> anyhow::Result<Self> {
        let paddle = Arc::new(PaddleModel::new(
            config.arena.clone(),
            &config.features,
            &config.index,
        ));
        let opponent = Arc::new(OpponentModel::new(&config.features, &config.index));
        let session = Arc::new(Session::new(config.learning.history_capacity));

        let planner = Planner::new(
            paddle.clone(),
            opponent.clone(),
            session.flags.clone(),
            config.search.depth,
        );

        let schedule = &config.schedule;
        let read_wait = Duration::from_millis(schedule.snapshot_wait_ms);
        let mut workers = Vec::with_capacity(3);

        {
            let session = session.clone();
            let interval = Duration::from_millis(schedule.decision_interval_ms);
            workers.push(
                thread::Builder::new()
                    .name("paddlemind-decision".into())
                    .spawn(move || decision::run(session, planner, interval, read_wait))
                    .context("spawning decision worker")?,
            );
        }
        {
            let session = session.clone();
            let opponent = opponent.clone();
            let interval = Duration::from_millis(schedule.observation_interval_ms);
            let start_delay = Duration::from_millis(schedule.observer_start_delay_ms);
            workers.push(
                thread::Builder::new()
                    .name("paddlemind-observer".into())
                    .spawn(move || observer::run(session, opponent, interval, start_delay, read_wait))
                    .context("spawning observation worker")?,
            );
        }
        {
            let session = session.clone();
            let interval = Duration::from_millis(schedule.watchdog_interval_ms);
            let budget = Duration::from_millis(config.search.budget_ms);
            workers.push(
                thread::Builder::new()
                    .name("paddlemind-watchdog".into())
                    .spawn(move || watchdog::run(session, interval, budget))
                    .context("spawning watchdog")?,
            );
        }

        debug!("session workers started");
        Ok(Self {
            session,
            paddle,
            opponent,
            workers,
        })
    }

    /// Publish this tick's physical state. Never blocks: a contended lock
    /// drops the tick's state, only the latest snapshot matters.
    pub fn submit_snapshot(&self, snapshot: ArenaSnapshot) {
        self.session.submit_snapshot(snapshot);
    }

    /// Run the active tactic for one tick; call exactly once per tick while
    /// a session is live. Returns true when the tactic reports completion.
    pub fn execute_active(&self, tick: &mut TickContext) -> bool {
        self.session.execute_active(tick)
    }

    /// Level-triggered win signal, consumed by the next batch-learning pass.
    pub fn signal_success(&self) {
        self.session.flags.signal_success();
    }

    /// Level-triggered loss signal, consumed by the next batch-learning pass.
    pub fn signal_failure(&self) {
        self.session.flags.signal_failure();
    }

    pub fn paddle_model(&self) -> &Arc<PaddleModel> {
        &self.paddle
    }

    pub fn opponent_model(&self) -> &Arc<OpponentModel> {
        &self.opponent
    }

    pub fn history_len(&self) -> usize {
        self.session.history_len()
    }

    /// Stop the workers and reset the shared state to defaults.
    pub fn shutdown(mut self) {
        self.session.flags.trigger_shutdown();
        while let Some(worker) = self.workers.pop() {
            let _ = worker.join();
        }
        self.session.reset();
        debug!("session torn down");
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // Safety net for handles dropped without an explicit shutdown
        self.session.flags.trigger_shutdown();
        while let Some(worker) = self.workers.pop() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Body;
    use rand::Rng;
    use std::time::Instant;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.schedule.decision_interval_ms = 5;
        config.schedule.observation_interval_ms = 5;
        config.schedule.watchdog_interval_ms = 2;
        config.schedule.observer_start_delay_ms = 20;
        config.schedule.snapshot_wait_ms = 10;
        config.learning.history_capacity = 16;
        config.search.depth = 2;
        config
    }

    #[test]
    fn test_spawn_and_shutdown_promptly() {
        init_tracing();
        let controller = Controller::spawn(fast_config()).expect("spawn");
        let started = Instant::now();
        controller.shutdown();
        // Workers observe the flag within a few polling intervals
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_workers_survive_high_frequency_updates() {
        init_tracing();
        let capacity = 16;
        let controller = Controller::spawn(fast_config()).expect("spawn");
        let mut rng = rand::thread_rng();

        let started = Instant::now();
        while started.elapsed() < Duration::from_millis(400) {
            // Jittered but plausible table state, published at high frequency
            let snapshot = ArenaSnapshot::new(
                Body::new(0.3 + rng.gen_range(-0.05..0.05), 0.6),
                Body::with_velocity(
                    rng.gen_range(0.5..2.0),
                    rng.gen_range(0.2..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-0.5..0.5),
                ),
                Body::with_velocity(2.0, rng.gen_range(0.3..0.9), 0.0, rng.gen_range(-0.8..0.8)),
                1.0 / 60.0,
            );
            controller.submit_snapshot(snapshot);

            let mut paddle = Body::new(0.3, 0.6);
            let ball = Body::new(1.2, 0.6);
            let opponent = Body::new(2.0, 0.6);
            let mut tick = TickContext {
                paddle: &mut paddle,
                ball: &ball,
                opponent: &opponent,
                dt: 1.0 / 60.0,
            };
            controller.execute_active(&mut tick);

            // The ring never grows past its capacity, wrap after wrap
            assert!(controller.history_len() <= capacity);
            std::thread::sleep(Duration::from_millis(1));
        }

        controller.signal_success();
        controller.signal_failure();
        std::thread::sleep(Duration::from_millis(50));
        assert!(controller.history_len() <= capacity);

        // Models actually learned something while we hammered the state
        assert!(controller.paddle_model().state_count() > 0);

        controller.shutdown();
    }
}

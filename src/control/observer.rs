// Observation worker - feed the opponent's movements into its model

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::session::Session;
use crate::ai::{OpponentModel, OpponentStep};
use crate::arena::ArenaSnapshot;
use crate::features;

pub(super) fn run(
    session: Arc<Session>,
    opponent: Arc<OpponentModel>,
    interval: Duration,
    start_delay: Duration,
    read_wait: Duration,
) {
    debug!("observation worker started");

    // Hold off until the simulation has had time to publish real state,
    // in poll-sized steps so shutdown stays prompt
    let started = Instant::now();
    while started.elapsed() < start_delay {
        if session.flags.shutting_down() {
            return;
        }
        thread::sleep(interval.max(Duration::from_millis(1)));
    }

    let mut previous: Option<ArenaSnapshot> = None;
    while !session.flags.shutting_down() {
        if let Some(current) = session.latest_snapshot(read_wait) {
            if let Some(prev) = &previous {
                observe_step(&opponent, prev, &current);
            }
            previous = Some(current);
        } else {
            trace!("no snapshot this cycle");
        }
        thread::sleep(interval);
    }
    debug!("observation worker stopped");
}

/// Record the feature-space movement between two consecutive observed
/// snapshots, keyed by the state the movement started from.
fn observe_step(opponent: &OpponentModel, prev: &ArenaSnapshot, current: &ArenaSnapshot) {
    let origin = features::extract(prev);
    let latest = features::extract(current);
    let delta = latest.delta(&origin);
    let step = OpponentStep::between(&prev.opponent, &current.opponent);
    opponent.record(&origin, &delta, step);
}

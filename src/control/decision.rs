// Decision worker - plan, swap the active tactic, batch-learn on wrap

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use super::session::{Decision, Session};
use crate::ai::lock_tactic;
use crate::search::Planner;

/// Feedback weight applied to every buffered decision after a win signal.
const SUCCESS_FEEDBACK: f64 = 1.0;

/// Feedback weight applied after a loss signal.
const FAILURE_FEEDBACK: f64 = -1.0;

pub(super) fn run(session: Arc<Session>, planner: Planner, interval: Duration, read_wait: Duration) {
    debug!("decision worker started");
    while !session.flags.shutting_down() {
        cycle(&session, &planner, read_wait);
        thread::sleep(interval);
    }
    debug!("decision worker stopped");
}

/// One decision cycle: snapshot, search, swap, record, learn.
fn cycle(session: &Session, planner: &Planner, read_wait: Duration) {
    let Some(snapshot) = session.latest_snapshot(read_wait) else {
        trace!("no snapshot this cycle");
        return;
    };

    session.begin_search();
    let plan = planner.plan(&snapshot);
    session.end_search();

    let Some(candidate) = plan else {
        return;
    };
    let decision = Decision {
        tactic: candidate.tactic.clone(),
        state: candidate.state.clone(),
    };

    if session.replace_active_if_new(decision.clone()) {
        debug!(
            tactic = lock_tactic(&decision.tactic).name(),
            "active tactic swapped"
        );
    }

    // Outcome flags are consumed exactly once per lap of the buffer, after
    // it is fully populated
    if session.push_history(decision) {
        let success = session.flags.take_success();
        let failure = session.flags.take_failure();
        if success {
            debug!("batch feedback: success");
            session.adapt_history(SUCCESS_FEEDBACK);
        }
        if failure {
            debug!("batch feedback: failure");
            session.adapt_history(FAILURE_FEEDBACK);
        }
    }
}

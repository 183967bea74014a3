// Watchdog worker - bound the wall-clock cost of any single search

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::session::Session;

pub(super) fn run(session: Arc<Session>, interval: Duration, budget: Duration) {
    debug!("watchdog started");
    while !session.flags.shutting_down() {
        if !session.flags.timed_out() && session.search_overdue(budget) {
            warn!(
                budget_ms = budget.as_millis() as u64,
                "search exceeded budget; raising timeout"
            );
            session.flags.set_timeout();
        }
        thread::sleep(interval);
    }
    debug!("watchdog stopped");
}

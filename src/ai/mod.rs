// Tactic capability interface and the closed action set

mod action_state;
mod attack;
mod defend;
mod observed;
mod opponent_model;
mod paddle_model;
mod stop;

pub use action_state::ActionState;
pub use attack::Attack;
pub use defend::Defend;
pub use observed::{ObservedMove, OpponentStep};
pub use opponent_model::OpponentModel;
pub use paddle_model::PaddleModel;
pub use stop::Stop;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::arena::{ArenaSnapshot, Body, TickContext};
use crate::config::ArenaConfig;
use crate::features::FeatureVector;

/// Base probability every freshly created paddle tactic starts from.
pub const INITIAL_PROBABILITY: f64 = 0.5;

/// Step size for feedback-driven probability updates.
pub const LEARNING_STEP: f64 = 0.2;

/// Share of the feedback weight credited to the chosen tactic. The same
/// share is debited proportionally across the alternatives at that state.
pub const CREDIT_SHARE: f64 = 0.5;

/// A behavior the engine can select, predict with, and adapt.
///
/// Paddle tactics perform real physical effects through `apply`; observed
/// opponent moves are descriptive only and exist for prediction.
pub trait Tactic: Send {
    /// Short stable name used for logging and identity in tests.
    fn name(&self) -> &str;

    /// Perform one tick's physical effect on the paddle. Returns true when
    /// the tactic's goal is reached.
    fn apply(&self, tick: &mut TickContext) -> bool;

    /// Current base probability in [0, 1].
    fn base_probability(&self) -> f64;

    /// Base probability scaled by the tactic's hand-tuned, state-dependent
    /// heuristics.
    fn selection_weight(&self, features: &FeatureVector) -> f64;

    /// One-tick forward model consistent with `apply`. Planning only; never
    /// touches live simulation state.
    fn predict_next(&self, snapshot: &ArenaSnapshot) -> ArenaSnapshot;

    /// Move the base probability toward 1 (positive feedback) or 0
    /// (negative feedback).
    fn adapt_probability(&mut self, feedback: f64);
}

/// Tactics are shared between the index, the history buffer and the active
/// slot; probability updates and execution go through the mutex.
pub type SharedTactic = Arc<Mutex<dyn Tactic>>;

/// A weighted entry from the paddle's repertoire, carrying the state bucket
/// it was drawn from.
#[derive(Clone)]
pub struct Candidate {
    pub weight: f64,
    pub tactic: SharedTactic,
    pub state: Arc<ActionState>,
}

/// Lock a shared tactic, recovering from a poisoned mutex (a panicking
/// holder must not wedge the session).
pub(crate) fn lock_tactic(tactic: &SharedTactic) -> MutexGuard<'_, dyn Tactic + 'static> {
    tactic.lock().unwrap_or_else(|e| e.into_inner())
}

/// The canonical tactic set seeded into every newly created action state.
pub fn default_tactics(arena: &ArenaConfig) -> Vec<SharedTactic> {
    let attack: SharedTactic = Arc::new(Mutex::new(Attack::new()));
    let defend: SharedTactic = Arc::new(Mutex::new(Defend::new(arena.guard_x, arena.guard_y)));
    let stop: SharedTactic = Arc::new(Mutex::new(Stop::new()));
    vec![attack, defend, stop]
}

/// Clamped feedback step shared by the paddle tactics.
pub(crate) fn nudge_probability(probability: f64, feedback: f64) -> f64 {
    (probability + LEARNING_STEP * feedback).clamp(0.0, 1.0)
}

/// Steer a body straight at a target point, integrating one step. Returns
/// true once within `arrive` of the target (velocity is zeroed there, which
/// also keeps the division safe).
pub(crate) fn steer_toward(
    body: &mut Body,
    target_x: f32,
    target_y: f32,
    speed: f32,
    arrive: f32,
    dt: f32,
) -> bool {
    let dx = target_x - body.x;
    let dy = target_y - body.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= arrive {
        body.vx = 0.0;
        body.vy = 0.0;
        return true;
    }
    body.vx = dx / dist * speed;
    body.vy = dy / dist * speed;
    body.x += body.vx * dt;
    body.y += body.vy * dt;
    false
}

//! Werewolf Arena domain - game entities, rules, and invariants.
//!
//! This crate holds the pure data model of a Werewolf session: players and
//! their roles, per-player game views, per-round timelines, and the session
//! state, together with the deterministic rules (night resolution, exile
//! majorities, win conditions). Anything that does IO, calls a model, or
//! needs randomness lives in the engine crate.

pub mod belief;
pub mod error;
pub mod player;
pub mod role;
pub mod round;
pub mod state;
pub mod view;

pub use belief::{BeliefReport, RoleBelief, SuspectedRole};
pub use error::DomainError;
pub use player::Player;
pub use role::{Role, Team};
pub use round::Round;
pub use state::State;
pub use view::GameView;

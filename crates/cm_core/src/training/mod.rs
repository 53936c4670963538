//! Player development between matchdays.
//!
//! A club may send each player to one individual session per matchday and
//! hold one squad bonding session. Sessions are paid through the ledger,
//! cost fitness, and roll for improvement from a seed derived from the
//! season seed, so the same commands always produce the same squad.

pub mod session;

pub use session::{
    session_seed, success_chance, Session, TrainingEngine, TrainingKind, TrainingOutcome,
    TrainingRecord,
};

//! ECS components shared across subsystems.
//!
//! - actor: base stats for living entities (faction, health, stamina)
//!
//! Combat-specific components (hitboxes, action controllers, playback)
//! live with their systems in `combat`, `action` and `animation`.

pub mod actor;

pub use actor::*;

//! ECS systems that operate on the stage world each tick.
//!
//! Systems are free functions over `&World` / `&mut World` plus the
//! scheduler's id index. They do not own state; all state lives in components.

pub mod approach;
pub mod cleanup;
pub mod effects;
pub mod snapshot;

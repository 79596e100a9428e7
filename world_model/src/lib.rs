//! # World Model
//!
//! The containment graph consumed by the perception core. Holds entities,
//! their traits, parent/child placement, and the entity-keyed scope
//! side-tables that authors use to override perceptibility and rank
//! disambiguation candidates.
//!
//! This crate answers "where is it and what is it"; it never decides what
//! anyone can perceive.

pub mod entities;
pub mod error;
pub mod scope;
pub mod world_state;

pub use entities::*;
pub use error::*;
pub use scope::*;
pub use world_state::*;

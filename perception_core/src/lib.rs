//! # Perception Core
//!
//! Answers "what can actor A perceive about entity B, through which sense,
//! and how confidently", and tracks what each actor has learned by
//! witnessing changes to the world.
//!
//! ## Core Components
//!
//! - **scope**: Per-sense predicates and aggregate scope levels over the containment graph
//! - **witness**: Turns reported state changes into per-actor knowledge and witness events
//! - **config**: Traversal and history limits
//!
//! ## Design Philosophy
//!
//! - **Pure queries**: Scope resolution never mutates the world and never fails;
//!   anything unresolvable is simply out of scope
//! - **Returned effects**: Witness recording hands back the events to emit instead
//!   of pushing them through a global sink

pub mod config;
pub mod error;
pub mod scope;
pub mod witness;

pub use config::*;
pub use error::*;
pub use scope::*;
pub use witness::*;

//! Triage Core - failure-log classification for CI pipelines.
//!
//! Takes the raw log of a failed run and produces one explanation:
//! tier 1 matches an ordered, mergeable rule set; tier 2 falls back to
//! an inference endpoint; tier 3 is a generic unknown record. Network
//! problems only ever narrow the result, never fail it.

pub mod ai;
pub mod builtin;
pub mod classifier;
pub mod matcher;
pub mod normalize;
pub mod observer;
pub mod patterns;
pub mod store;
pub mod validate;

pub use ai::*;
pub use builtin::*;
pub use classifier::*;
pub use matcher::*;
pub use normalize::*;
pub use observer::*;
pub use patterns::*;
pub use store::*;
pub use validate::*;

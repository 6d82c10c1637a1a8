//! Visual preference quiz engine.
//!
//! The [`quiz`] module holds the core: the scoring accumulator, profile
//! normalizer, template matcher, and the session state machine that
//! sequences a respondent from intro to results. [`config`], [`telemetry`],
//! and [`error`] carry the service plumbing shared with the API binary.

pub mod config;
pub mod error;
pub mod quiz;
pub mod telemetry;

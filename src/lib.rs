//! Reads a residential site drawing, works out which walls are the front,
//! rear and shared ones and which parts are extensions, and checks the
//! result against householder permitted-development limits.
//!
//! The pipeline runs [`parser`] → [`inference`] → [`context`] →
//! [`rules`], with [`calculator`] supplying measurements throughout.
//! [`ComplianceEngine`] wires the stages together.

pub mod calculator;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod inference;
pub mod math;
pub mod metadata;
pub mod parser;
pub mod report;
pub mod rules;

pub use config::EngineConfig;
pub use context::{ContextValue, EvaluationContext};
pub use engine::{Assessment, ComplianceEngine};
pub use error::{PlanscopeError, Result};
pub use metadata::SessionMetadata;
pub use parser::DrawingObject;
pub use rules::{ComplianceCheckResult, ComplianceSummary, RuleRegistry};

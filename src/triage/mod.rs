pub mod advisor;
pub mod engine;
pub mod guidance;
pub mod orchestrator;

pub use advisor::{AdvisorError, TriageAdvisor};
pub use engine::{decide, RuleEngine};
pub use orchestrator::{TriageOrchestrator, TriageOutcome};

pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod registry;

pub use orchestrator::{FailoverOrchestrator, OrchestratorConfig};
pub use registry::{ProviderEntry, ProviderHealth, ProviderRegistry, RateLimit};

pub mod prelude {
    pub use super::orchestrator::{FailoverOrchestrator, OrchestratorConfig};
    pub use super::registry::{ProviderEntry, ProviderHealth, ProviderRegistry, RateLimit};
    pub use ni_core::{Error, Result, RewriteCapability, RewriteKind, RewriteOutcome};
}

// Lead pipeline: normalize -> enrich (extract) -> route -> serialize

pub mod enrich;
pub mod extract;
pub mod normalize;
pub mod orchestrator;
pub mod routing;

// Re-export the entry points each stage exposes
pub use enrich::{EnrichmentClient, EnrichmentOutcome, FallbackReason};
pub use extract::{extract_structured, ExtractionError, ExtractionMatch};
pub use normalize::{normalize_file, normalize_line};
pub use orchestrator::{LeadPipeline, RunPaths, RunSummary};
pub use routing::assign_team;

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod types;

// Layered boundaries: ports the pipeline depends on, adapters that implement them
pub mod app;
pub mod infra;

pub use error::{LeadError, Result};
pub use types::{EnrichedLead, EnrichmentResult, LeadRow, PersonaType, Team, Urgency};

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use super::extract::{extract_structured, ExtractionError};
use crate::app::ports::ModelBackend;
use crate::config::BackendErrorPolicy;
use crate::error::Result;
use crate::metrics::PipelineMetrics;
use crate::types::{EnrichmentResult, PersonaType, Urgency};

/// Why a lead ended up with the fallback classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Response text held no usable object
    Extraction(String),
    /// The backend call itself failed and policy allowed continuing
    Backend(String),
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::Extraction(_) => "extraction",
            FallbackReason::Backend(_) => "backend",
        }
    }
}

/// Enrichment plus where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentOutcome {
    pub result: EnrichmentResult,
    pub fallback: Option<FallbackReason>,
}

impl EnrichmentOutcome {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Build the classification prompt for one lead. Fields are embedded verbatim.
pub fn build_prompt(job_title: &str, comment: &str) -> String {
    format!(
        r#"You are an AI that extracts structured insight from inbound leads.

Given the following fields:
job_title: "{job_title}"
comment: "{comment}"

Return ONLY a JSON object with exactly these keys:
- urgency: one of ["High", "Medium", "Low"]
- persona_type: one of ["Decision Maker", "Practitioner", "Other"] ("Other" includes student or researcher)
- summary: a single-sentence summary of the user's request

Rules:
- If the person controls budgets or is senior (C-level, VP, Head) -> Decision Maker
- If the person is hands-on (Analyst, Engineer, Specialist) -> Practitioner
- Students or researchers -> Other
- Urgency determination:
    * High -> explicitly asks for demo, sales contact, technical meeting, evaluation, or active project
    * Medium -> general interest or exploratory questions
    * Low -> educational or academic, not for purchase
- Only return the json response in curly brackets without any other text
Example output:
{{
"urgency": "High",
"persona_type": "Decision Maker",
"summary": "The user needs to improve order management efficiency and is available for a technical deep dive next week."
}}
"#
    )
}

/// Trim the response and, if it opens with a code fence, keep only the first fenced segment.
pub fn unwrap_leading_fence(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with("```") {
        text.split("```").nth(1).unwrap_or("")
    } else {
        text
    }
}

/// Turn raw model text into a validated enrichment.
///
/// Out-of-vocabulary `urgency`/`persona_type` values and an empty `summary` are replaced
/// field by field with the fallback values; an object carrying none of the keys counts as
/// malformed.
pub fn parse_response(raw: &str) -> std::result::Result<EnrichmentResult, ExtractionError> {
    let map = extract_structured(unwrap_leading_fence(raw))?;
    if !["urgency", "persona_type", "summary"]
        .iter()
        .any(|key| map.contains_key(*key))
    {
        return Err(ExtractionError::MalformedStructure(
            "object has none of urgency, persona_type, summary".to_string(),
        ));
    }
    Ok(interpret(&map))
}

fn interpret(map: &Map<String, Value>) -> EnrichmentResult {
    let fallback = EnrichmentResult::fallback();

    let urgency = map
        .get("urgency")
        .and_then(Value::as_str)
        .and_then(Urgency::parse_lenient)
        .unwrap_or_else(|| {
            warn!(raw_value = ?map.get("urgency"), "Unrecognized urgency, defaulting to {}", fallback.urgency);
            PipelineMetrics::record_value_corrected("urgency");
            fallback.urgency
        });

    let persona_type = map
        .get("persona_type")
        .and_then(Value::as_str)
        .and_then(PersonaType::parse_lenient)
        .unwrap_or_else(|| {
            warn!(raw_value = ?map.get("persona_type"), "Unrecognized persona_type, defaulting to {}", fallback.persona_type);
            PipelineMetrics::record_value_corrected("persona_type");
            fallback.persona_type
        });

    let summary = map
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            warn!("Missing or empty summary, using fallback text");
            PipelineMetrics::record_value_corrected("summary");
            fallback.summary.clone()
        });

    EnrichmentResult {
        urgency,
        persona_type,
        summary,
    }
}

/// Classifies leads through an injected model backend
pub struct EnrichmentClient {
    backend: Arc<dyn ModelBackend>,
    on_backend_error: BackendErrorPolicy,
}

impl EnrichmentClient {
    pub fn new(backend: Arc<dyn ModelBackend>, on_backend_error: BackendErrorPolicy) -> Self {
        Self {
            backend,
            on_backend_error,
        }
    }

    /// One model round-trip for one lead.
    ///
    /// Unusable responses always fall back to the default classification. A failing backend
    /// call is returned as an error under [`BackendErrorPolicy::Abort`] and falls back under
    /// [`BackendErrorPolicy::Fallback`].
    #[instrument(skip(self, comment), fields(backend = %self.backend.name()))]
    pub async fn enrich(&self, job_title: &str, comment: &str) -> Result<EnrichmentOutcome> {
        let prompt = build_prompt(job_title, comment);

        let started = Instant::now();
        let response = self.backend.generate(&prompt).await;
        PipelineMetrics::record_model_call(started.elapsed().as_secs_f64());

        let raw = match response {
            Ok(raw) => raw,
            Err(e) => match self.on_backend_error {
                BackendErrorPolicy::Abort => return Err(e),
                BackendErrorPolicy::Fallback => {
                    warn!(error = %e, "Model backend failed, using fallback enrichment");
                    return Ok(Self::fallback(FallbackReason::Backend(e.to_string())));
                }
            },
        };

        match parse_response(&raw) {
            Ok(result) => {
                debug!(urgency = %result.urgency, persona = %result.persona_type, "Enriched lead");
                Ok(EnrichmentOutcome {
                    result,
                    fallback: None,
                })
            }
            Err(e) => {
                warn!(error = %e, raw_response = %raw, "Could not parse model response, using fallback enrichment");
                Ok(Self::fallback(FallbackReason::Extraction(e.to_string())))
            }
        }
    }

    fn fallback(reason: FallbackReason) -> EnrichmentOutcome {
        PipelineMetrics::record_fallback(reason.as_str());
        EnrichmentOutcome {
            result: EnrichmentResult::fallback(),
            fallback: Some(reason),
        }
    }
}

impl std::fmt::Debug for EnrichmentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentClient")
            .field("backend", &self.backend.name())
            .field("on_backend_error", &self.on_backend_error)
            .finish()
    }
}

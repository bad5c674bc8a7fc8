use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::enrich::EnrichmentClient;
use super::normalize::normalize_file;
use super::routing::assign_team;
use crate::constants;
use crate::error::{LeadError, Result};
use crate::metrics::PipelineMetrics;
use crate::types::{EnrichedLead, LeadRow};

/// One lead queued for processing, keyed by its position in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadTask {
    pub index: usize,
    /// 1-based line in the cleaned file, for diagnostics
    pub line: u64,
    pub row: LeadRow,
}

/// Rows parsed from the cleaned tabular artifact
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub tasks: Vec<LeadTask>,
    /// Rows that didn't carry exactly three fields and were repaired
    pub anomalies: usize,
}

/// Enriched leads in input order
#[derive(Debug, Default)]
pub struct ProcessedBatch {
    pub leads: Vec<EnrichedLead>,
    pub fallbacks: usize,
}

/// Paths for one run
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input: PathBuf,
    pub cleaned: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_leads: usize,
    pub fallbacks: usize,
    pub anomalies: usize,
    pub team_counts: BTreeMap<String, usize>,
    pub cleaned_file: String,
    pub output_file: String,
    pub duration_secs: f64,
}

/// Build a row from a CSV record. Missing fields become empty strings and surplus fields are
/// folded back into the comment, which is where unquoted commas usually come from.
fn row_from_record(record: &StringRecord) -> (LeadRow, bool) {
    let field = |i: usize| record.get(i).unwrap_or("").to_string();
    let comment = if record.len() > 3 {
        record.iter().skip(2).collect::<Vec<_>>().join(",")
    } else {
        field(2)
    };
    let row = LeadRow {
        email: field(0),
        job_title: field(1),
        comment,
    };
    (row, record.len() != 3)
}

/// Parse the cleaned artifact: three positional fields, no header row.
///
/// Only truly empty lines are dropped (the reader does that itself); a line of blank fields
/// such as `,,` still yields a lead.
pub fn read_lead_rows(path: &Path) -> Result<ParsedRows> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut parsed = ParsedRows::default();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 1);
        let (row, anomalous) = row_from_record(&record);
        if anomalous {
            warn!(line, fields = record.len(), "Row does not have exactly three fields, repaired");
            PipelineMetrics::record_normalization_anomaly();
            parsed.anomalies += 1;
        }
        parsed.tasks.push(LeadTask {
            index: parsed.tasks.len(),
            line,
            row,
        });
    }
    Ok(parsed)
}

/// Serialize the whole batch with four-space indentation in a single write.
pub fn write_output(path: &Path, leads: &[EnrichedLead]) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    leads.serialize(&mut serializer)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, buf)?;
    Ok(())
}

/// Run file stages on the blocking pool so upload handlers don't stall the runtime.
async fn on_blocking_pool<T, F>(stage: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(stage)
        .await
        .map_err(|e| LeadError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

/// Normalize, enrich, route and serialize a batch of leads
#[derive(Debug)]
pub struct LeadPipeline {
    client: EnrichmentClient,
}

impl LeadPipeline {
    pub fn new(client: EnrichmentClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, task), fields(index = task.index, line = task.line))]
    async fn process_lead(&self, task: &LeadTask) -> Result<(EnrichedLead, bool)> {
        let outcome = self
            .client
            .enrich(&task.row.job_title, &task.row.comment)
            .await?;
        let team = assign_team(outcome.result.urgency, outcome.result.persona_type);
        PipelineMetrics::record_lead_routed(team);
        debug!(email = %task.row.email, %team, "Routed lead");

        let fallback = outcome.is_fallback();
        Ok((EnrichedLead::new(task.row.clone(), outcome.result, team), fallback))
    }

    /// Process tasks one at a time and reassemble the results by task index.
    pub async fn process(&self, tasks: &[LeadTask]) -> Result<ProcessedBatch> {
        let mut slots: Vec<Option<EnrichedLead>> = vec![None; tasks.len()];
        let mut fallbacks = 0;

        for (done, task) in tasks.iter().enumerate() {
            let (lead, fallback) = self.process_lead(task).await?;
            if fallback {
                fallbacks += 1;
            }
            if let Some(slot) = slots.get_mut(task.index) {
                *slot = Some(lead);
            }
            if (done + 1) % 10 == 0 {
                info!("Processed {}/{} leads", done + 1, tasks.len());
            }
        }

        Ok(ProcessedBatch {
            leads: slots.into_iter().flatten().collect(),
            fallbacks,
        })
    }

    /// Run the full batch. Output is only written once every lead has been processed.
    #[instrument(skip(self, paths), fields(input = %paths.input.display()))]
    pub async fn run(&self, paths: &RunPaths) -> Result<RunSummary> {
        let started = Instant::now();

        let (input, cleaned) = (paths.input.clone(), paths.cleaned.clone());
        let (lines, parsed) = on_blocking_pool(move || {
            let lines = normalize_file(&input, &cleaned)?;
            Ok((lines, read_lead_rows(&cleaned)?))
        })
        .await?;
        info!(
            "Processing {} leads from {} input lines",
            parsed.tasks.len(),
            lines
        );

        let ProcessedBatch { leads, fallbacks } = self.process(&parsed.tasks).await?;
        let output = paths.output.clone();
        let leads = on_blocking_pool(move || {
            write_output(&output, &leads)?;
            Ok(leads)
        })
        .await?;

        let mut team_counts: BTreeMap<String, usize> = constants::all_teams()
            .into_iter()
            .map(|team| (team.to_string(), 0))
            .collect();
        for lead in &leads {
            *team_counts.entry(lead.assigned_team.to_string()).or_insert(0) += 1;
        }

        let duration_secs = started.elapsed().as_secs_f64();
        PipelineMetrics::record_batch(leads.len(), duration_secs);
        info!(
            "Processing complete: {} leads ({} fallbacks, {} repaired rows) saved to {}",
            leads.len(),
            fallbacks,
            parsed.anomalies,
            paths.output.display()
        );

        Ok(RunSummary {
            total_leads: leads.len(),
            fallbacks,
            anomalies: parsed.anomalies,
            team_counts,
            cleaned_file: paths.cleaned.to_string_lossy().to_string(),
            output_file: paths.output.to_string_lossy().to_string(),
            duration_secs,
        })
    }
}

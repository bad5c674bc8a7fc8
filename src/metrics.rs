use crate::constants;
use crate::types::Team;
use std::net::SocketAddr;

pub fn init_metrics() {
    let port: u16 = std::env::var(constants::ENV_METRICS_PORT)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9898);
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            tracing::info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            tracing::warn!("Prometheus exporter install failed (possibly already installed): {}", e);
        }
    }
}

/// Counters and histograms for the lead pipeline
pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_lead_routed(team: Team) {
        ::metrics::counter!("lead_router_leads_processed_total", "team" => team.as_str())
            .increment(1);
    }

    pub fn record_fallback(reason: &'static str) {
        ::metrics::counter!("lead_router_enrichment_fallbacks_total", "reason" => reason)
            .increment(1);
    }

    pub fn record_value_corrected(field: &'static str) {
        ::metrics::counter!("lead_router_enrichment_values_corrected_total", "field" => field)
            .increment(1);
    }

    pub fn record_normalization_anomaly() {
        ::metrics::counter!("lead_router_normalization_anomalies_total").increment(1);
    }

    pub fn record_model_call(duration_secs: f64) {
        ::metrics::histogram!("lead_router_model_call_duration_seconds").record(duration_secs);
    }

    pub fn record_batch(leads: usize, duration_secs: f64) {
        ::metrics::counter!("lead_router_batches_total").increment(1);
        ::metrics::histogram!("lead_router_batch_size_leads").record(leads as f64);
        ::metrics::histogram!("lead_router_batch_duration_seconds").record(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_exporter_is_a_no_op() {
        PipelineMetrics::record_lead_routed(Team::NurtureCampaign);
        PipelineMetrics::record_fallback("extraction");
        PipelineMetrics::record_value_corrected("urgency");
        PipelineMetrics::record_normalization_anomaly();
        PipelineMetrics::record_model_call(0.25);
        PipelineMetrics::record_batch(3, 1.5);
    }
}

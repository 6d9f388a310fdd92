//! Health command implementation

use crate::cli::output::{format_health_json, format_health_table, HealthView};
use crate::cli::HealthArgs;
use crate::health::{HttpProber, ProbeConfig};
use crate::registry::BackendRegistry;

/// Probe every enabled backend in priority order.
///
/// Unlike Probed resolution this does not stop at the first healthy backend,
/// so the report shows the whole fleet.
pub async fn probe_all(
    registry: &BackendRegistry,
    prober: &HttpProber,
    config: &ProbeConfig,
) -> Vec<HealthView> {
    let mut results = Vec::new();

    for backend in registry.list_enabled() {
        let timeout = config.timeout_for(&backend);
        let outcome = prober.check(&backend, timeout).await;

        results.push(HealthView {
            key: backend.key.clone(),
            url: backend.url.clone(),
            healthy: outcome.is_ok(),
            latency_ms: outcome.as_ref().ok().map(|r| r.latency_ms),
            error: outcome.err().map(|e| e.to_string()),
            timeout_ms: timeout.as_millis() as u64,
        });
    }

    results
}

/// The backend Probed resolution would choose: first healthy in priority order.
pub fn selected_backend(results: &[HealthView]) -> Option<&str> {
    results
        .iter()
        .find(|r| r.healthy)
        .map(|r| r.key.as_str())
}

/// Handle health command
pub async fn handle_health(
    args: &HealthArgs,
    registry: &BackendRegistry,
    config: &ProbeConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let prober = HttpProber::new();
    let results = probe_all(registry, &prober, config).await;
    let selected = selected_backend(&results);

    if args.json {
        Ok(format_health_json(&results, selected))
    } else {
        Ok(format_health_table(&results, selected))
    }
}

use dx_sim::config::DataConfig;
use dx_sim::dataset::{load_catalog, load_characters, load_flows, Catalog, FlowCatalog};
use dx_sim::simulation::{Mode, View};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) datasets: Arc<Datasets>,
}

/// Everything read from disk at startup, plus the fallback warnings.
#[derive(Debug, Clone, Default)]
pub(crate) struct Datasets {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) flows: Arc<FlowCatalog>,
    pub(crate) warnings: Vec<String>,
}

impl Datasets {
    pub(crate) fn degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Prints fallback warnings ahead of CLI output.
    pub(crate) fn print_banner(&self) {
        for warning in &self.warnings {
            eprintln!("warning: {warning}");
        }
    }
}

pub(crate) fn load_datasets(config: &DataConfig) -> Datasets {
    let catalog = load_catalog(&config.dataset_path);
    let flows = load_flows(&config.flows_path);
    let characters = load_characters(&config.characters_path);

    let warnings = [&catalog.warning, &flows.warning, &characters.warning]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    Datasets {
        catalog: Arc::new(catalog.value.with_characters(characters.value)),
        flows: Arc::new(flows.value),
        warnings,
    }
}

pub(crate) fn parse_mode(raw: &str) -> Result<Mode, String> {
    Mode::parse(raw).ok_or_else(|| format!("unknown mode '{raw}' (expected plain, smart or ai)"))
}

pub(crate) fn parse_view(raw: &str) -> Result<View, String> {
    View::parse(raw)
        .ok_or_else(|| format!("unknown view '{raw}' (expected plain, smart, ai or summary)"))
}

/// `domain=mode`, e.g. `medical=ai`.
pub(crate) fn parse_domain_mode(raw: &str) -> Result<(String, Mode), String> {
    let (domain, mode) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DOMAIN=MODE, got '{raw}'"))?;
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(format!("missing domain in '{raw}'"));
    }
    Ok((domain.to_string(), parse_mode(mode)?))
}

/// `domain=view`, e.g. `disaster=summary`.
pub(crate) fn parse_domain_view(raw: &str) -> Result<(String, View), String> {
    let (domain, view) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DOMAIN=VIEW, got '{raw}'"))?;
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(format!("missing domain in '{raw}'"));
    }
    Ok((domain.to_string(), parse_view(view)?))
}

/// `flag` sets the flag; `flag=false` (or `0`) records an explicit no.
pub(crate) fn parse_flag(raw: &str) -> Result<(String, bool), String> {
    let (flag, value) = match raw.split_once('=') {
        Some((flag, value)) => {
            let value = dx_sim::state::parse_flag_value(&serde_json::Value::String(
                value.to_string(),
            ))
            .ok_or_else(|| format!("invalid flag value in '{raw}'"))?;
            (flag.trim(), value)
        }
        None => (raw.trim(), true),
    };
    if flag.is_empty() {
        return Err(format!("missing flag name in '{raw}'"));
    }
    Ok((flag.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_default_to_true() {
        assert_eq!(parse_flag("surgery"), Ok(("surgery".to_string(), true)));
        assert_eq!(parse_flag("hce=0"), Ok(("hce".to_string(), false)));
        assert!(parse_flag("=1").is_err());
        assert!(parse_flag("hce=perhaps").is_err());
    }

    #[test]
    fn domain_modes_parse_strictly() {
        assert_eq!(
            parse_domain_mode("medical=AI"),
            Ok(("medical".to_string(), Mode::Ai))
        );
        assert!(parse_domain_mode("medical").is_err());
        assert!(parse_domain_mode("medical=turbo").is_err());
        assert_eq!(parse_view("summary"), Ok(View::Summary));
    }

    #[test]
    fn missing_files_collect_warnings() {
        let missing = PathBuf::from("/nonexistent/dx-sim");
        let datasets = load_datasets(&DataConfig {
            dataset_path: missing.join("domains.json"),
            flows_path: missing.join("flows.json"),
            characters_path: missing.join("characters.json"),
            state_dir: missing.join("state"),
        });
        assert!(datasets.degraded());
        assert_eq!(datasets.warnings.len(), 3);
        assert!(!datasets.catalog.domains.is_empty());
        assert!(!datasets.flows.base_documents().is_empty());
    }
}

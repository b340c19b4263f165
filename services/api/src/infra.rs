use jurat::config::AppConfig;
use jurat::forms::{DirectoryTemplateStore, FormCatalog, FormFillService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Service over the on-disk templates named by `config`, with an optional
/// directory override from the command line.
pub(crate) fn directory_service(
    config: &AppConfig,
    template_dir: Option<PathBuf>,
) -> Arc<FormFillService<DirectoryTemplateStore>> {
    let root = template_dir.unwrap_or_else(|| config.forms.template_dir.clone());
    Arc::new(FormFillService::new(
        FormCatalog::standard(),
        Arc::new(DirectoryTemplateStore::new(root)),
        config.forms.unknown_fields,
    ))
}

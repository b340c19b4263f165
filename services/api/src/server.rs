use crate::cli::ServeArgs;
use crate::infra::{directory_service, AppState};
use crate::routes::build_router;
use axum_prometheus::PrometheusMetricLayer;
use jurat::config::AppConfig;
use jurat::error::AppError;
use jurat::forms::{FormFillService, TemplateStore};
use jurat::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(template_dir) = args.template_dir.take() {
        config.forms.template_dir = template_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = directory_service(&config, None);
    warm_templates(&service);

    let app = build_router(service, app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        template_dir = %config.forms.template_dir.display(),
        "form fill service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Loads each registered template once so the first request does not pay for
/// the read, and reports tables that no longer match their template.
fn warm_templates<S>(service: &FormFillService<S>)
where
    S: TemplateStore + 'static,
{
    for table in service.catalog().tables() {
        match service.engine().missing_targets(table) {
            Ok(missing) if missing.is_empty() => {
                info!(form_id = table.form_id, revision = table.revision, "template loaded");
            }
            Ok(missing) => {
                warn!(
                    form_id = table.form_id,
                    revision = table.revision,
                    missing = missing.len(),
                    "template lacks mapped fields; fills will fail"
                );
            }
            Err(err) => {
                warn!(form_id = table.form_id, error = %err, "template unavailable");
            }
        }
    }
}

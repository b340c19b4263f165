use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use super::service::{FilledDocument, FormFillService};
use super::template::TemplateStore;
use crate::error::AppError;

/// Router exposing `POST /fill/:form`.
pub fn form_router<S>(service: Arc<FormFillService<S>>) -> Router
where
    S: TemplateStore + 'static,
{
    Router::new()
        .route("/fill/:form", post(fill_handler::<S>))
        .with_state(service)
}

/// The body is read raw rather than through `Json` so an empty body (or one
/// sent without a JSON content type) still fills a blank form. Template
/// loading and PDF work run on the blocking pool.
pub(crate) async fn fill_handler<S>(
    State(service): State<Arc<FormFillService<S>>>,
    Path(form): Path<String>,
    body: Bytes,
) -> Result<FilledDocument, AppError>
where
    S: TemplateStore + 'static,
{
    let filled = tokio::task::spawn_blocking(move || service.handle(&form, &body))
        .await
        .map_err(AppError::Worker)??;
    Ok(filled)
}

impl IntoResponse for FilledDocument {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.media_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use serde_json::Value;

use crate::forms::testing::TemplateBuilder;
use crate::forms::{
    FormCatalog, FormFillService, InMemoryTemplateStore, UnknownFieldPolicy, N400,
};

pub(super) const ALIEN_NUMBER_FIELD: &str = "Line1_AlienNumber";
pub(super) const SURNAME_FIELD: &str = "form1[0].#subform[1].Part2Line3_FamilyName[0]";
/// Present in the template but absent from the N-400 table.
pub(super) const UNMAPPED_FIELD: &str = "form1[0].#subform[3].P5_Line1_MaritalStatus[0]";

/// N-400 stand-in whose mapped fields all carry a stale value.
pub(super) fn n400_template() -> Vec<u8> {
    TemplateBuilder::for_table(&N400, "STALE")
        .field(UNMAPPED_FIELD, "SINGLE")
        .build()
}

pub(super) fn n400_store() -> InMemoryTemplateStore {
    InMemoryTemplateStore::new().with_template("N-400", n400_template())
}

pub(super) fn service_with(
    store: InMemoryTemplateStore,
    policy: UnknownFieldPolicy,
) -> Arc<FormFillService<InMemoryTemplateStore>> {
    Arc::new(FormFillService::new(
        FormCatalog::standard(),
        Arc::new(store),
        policy,
    ))
}

pub(super) fn n400_service() -> Arc<FormFillService<InMemoryTemplateStore>> {
    service_with(n400_store(), UnknownFieldPolicy::Ignore)
}

pub(super) fn fill_request(path: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json body")
}

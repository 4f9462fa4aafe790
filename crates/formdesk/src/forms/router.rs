use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request, State},
    http::{header, request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde_json::json;
use tracing::{debug, error};

use super::builder::FormPayload;
use super::domain::{FormId, TenantId, TenantIdentity, FILE_INPUT_NAME};
use super::error::FormError;
use super::render::{FormView, SubmissionView};
use super::repository::{FileStorage, FormRepository};
use super::service::FormService;
use super::submission::RawUpload;

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const TENANT_NAME_HEADER: &str = "x-tenant-name";

/// Router builder exposing the public form pages and the owner dashboard.
pub fn form_router<R, F>(service: Arc<FormService<R, F>>) -> Router
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    Router::new()
        .route("/api/v1/forms", get(public_list_handler::<R, F>))
        .route("/api/v1/forms/:form_id", get(public_form_handler::<R, F>))
        .route(
            "/api/v1/forms/:form_id/html",
            get(public_form_html_handler::<R, F>),
        )
        .route(
            "/api/v1/forms/:form_id/submissions",
            axum::routing::post(submit_handler::<R, F>),
        )
        .route(
            "/api/v1/dashboard/forms",
            get(owned_list_handler::<R, F>).post(create_handler::<R, F>),
        )
        .route(
            "/api/v1/dashboard/forms/:form_id",
            get(owned_form_handler::<R, F>).put(edit_handler::<R, F>),
        )
        .route(
            "/api/v1/dashboard/forms/:form_id/submissions",
            get(submissions_handler::<R, F>),
        )
        .with_state(service)
}

/// Tenant identity established by the session layer in front of the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardTenant(pub TenantIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for DashboardTenant
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let Some(id) = header_value(TENANT_ID_HEADER) else {
            let payload = json!({ "error": "authentication required" });
            return Err((StatusCode::UNAUTHORIZED, Json(payload)).into_response());
        };
        let company_name = header_value(TENANT_NAME_HEADER).unwrap_or_else(|| id.clone());

        Ok(Self(TenantIdentity {
            id: TenantId(id),
            company_name,
        }))
    }
}

pub(crate) async fn public_list_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    match service.list_public() {
        Ok(listings) => (StatusCode::OK, Json(listings)).into_response(),
        Err(err) => failure(err, None),
    }
}

pub(crate) async fn public_form_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
    Path(form_id): Path<String>,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    match service.public_form(&FormId(form_id)) {
        Ok(form) => (StatusCode::OK, Json(FormView::from_definition(&form))).into_response(),
        Err(err) => failure(err, None),
    }
}

pub(crate) async fn public_form_html_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
    Path(form_id): Path<String>,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    match service.public_form(&FormId(form_id)) {
        Ok(form) => {
            let action = format!("/api/v1/forms/{}/submissions", form.id);
            let html = FormView::from_definition(&form).to_html(&action);
            (StatusCode::OK, Html(html)).into_response()
        }
        Err(err) => failure(err, None),
    }
}

pub(crate) async fn submit_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
    Path(form_id): Path<String>,
    request: Request,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    let (body, upload) = match read_submission(request).await {
        Ok(parts) => parts,
        Err(message) => {
            let payload = json!({ "error": message });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.submit(&FormId(form_id), &body, upload).await {
        Ok(submission) => {
            (StatusCode::CREATED, Json(SubmissionView::from(&submission))).into_response()
        }
        Err(err) => failure(err, None),
    }
}

pub(crate) async fn owned_list_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
    DashboardTenant(identity): DashboardTenant,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    match service.list_owned(&identity.id) {
        Ok(forms) => (StatusCode::OK, Json(forms)).into_response(),
        Err(err) => failure(err, None),
    }
}

pub(crate) async fn create_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
    DashboardTenant(identity): DashboardTenant,
    Json(payload): Json<FormPayload>,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    match service.create_form(&identity, &payload) {
        Ok(form) => (StatusCode::CREATED, Json(form)).into_response(),
        Err(err) => failure(err, Some(&payload)),
    }
}

pub(crate) async fn owned_form_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
    DashboardTenant(identity): DashboardTenant,
    Path(form_id): Path<String>,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    match service.owned_form(&FormId(form_id), &identity.id) {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(err) => failure(err, None),
    }
}

pub(crate) async fn edit_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
    DashboardTenant(identity): DashboardTenant,
    Path(form_id): Path<String>,
    Json(payload): Json<FormPayload>,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    match service.edit_form(&FormId(form_id), &identity.id, &payload) {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(err) => failure(err, Some(&payload)),
    }
}

pub(crate) async fn submissions_handler<R, F>(
    State(service): State<Arc<FormService<R, F>>>,
    DashboardTenant(identity): DashboardTenant,
    Path(form_id): Path<String>,
) -> Response
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    match service.submissions(&FormId(form_id), &identity.id) {
        Ok(submissions) => {
            let views: Vec<SubmissionView> = submissions.iter().map(SubmissionView::from).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => failure(err, None),
    }
}

async fn read_submission(
    request: Request,
) -> Result<(HashMap<String, String>, Option<RawUpload>), String> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if !is_multipart {
        let Form(body) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|rejection| rejection.body_text())?;
        return Ok((body, None));
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| rejection.body_text())?;

    let mut body = HashMap::new();
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| format!("failed to read field: {err}"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_INPUT_NAME {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| format!("failed to read file: {err}"))?;
            upload = Some(RawUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else if field.file_name().is_some() {
            debug!(part = %name, "skipping file part outside the attachment input");
        } else {
            let value = field
                .text()
                .await
                .map_err(|err| format!("failed to read field '{name}': {err}"))?;
            body.insert(name, value);
        }
    }

    Ok((body, upload))
}

fn failure(err: FormError, payload: Option<&FormPayload>) -> Response {
    match err {
        FormError::Validation(message) => {
            let body = json!({
                "error": message,
                "rerender": true,
                "form": payload,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
        FormError::AccessDenied => {
            let body = json!({ "error": "access refused" });
            (StatusCode::FORBIDDEN, Json(body)).into_response()
        }
        FormError::NotFound => {
            let body = json!({ "error": "form not found" });
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        other => {
            error!(error = %other, "storage failure");
            let body = json!({ "error": "server error" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

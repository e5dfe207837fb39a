//! Address route handlers.

use async_trait::async_trait;
use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use tracing::instrument;

use address_api_core::RecordId;

use crate::error::{ApiError, Result, add_breadcrumb};
use crate::forms::{AddressUpsert, AddressUpsertRequest, Interceptor, Next, SubmitError};
use crate::models::Address;
use crate::state::AppState;

const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Upsert request body, bound from JSON or a url-encoded form.
///
/// An empty body binds to an empty request so that the form reports every
/// missing field instead of a formatting error.
pub struct UpsertBody(pub AddressUpsertRequest);

impl<S> FromRequest<S> for UpsertBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> std::result::Result<Self, ApiError> {
        let media_type = media_type(request.headers());

        if media_type.as_deref() == Some(FORM_MEDIA_TYPE) {
            let Form(payload) = Form::<AddressUpsertRequest>::from_request(request, state).await?;
            return Ok(Self(payload));
        }

        let bytes = Bytes::from_request(request, state).await?;
        if bytes.is_empty() {
            return Ok(Self(AddressUpsertRequest::default()));
        }

        match media_type.as_deref() {
            Some(m) if m == "application/json" || m.ends_with("+json") => {
                let Json(payload) = Json::<AddressUpsertRequest>::from_bytes(&bytes)?;
                Ok(Self(payload))
            }
            other => Err(ApiError::MalformedBody(format!(
                "unsupported content type {}",
                other.unwrap_or("(none)")
            ))),
        }
    }
}

/// Lowercased media type of the request, without parameters.
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next().unwrap_or_default().trim();
    Some(essence.to_ascii_lowercase())
}

/// The id of a saved address, or `""` while it has none.
fn saved_id(address: &Address) -> &str {
    address.id().map_or("", RecordId::as_str)
}

/// Leaves a Sentry breadcrumb for every address that gets saved.
struct SaveBreadcrumb;

#[async_trait]
impl Interceptor for SaveBreadcrumb {
    async fn intercept(
        &self,
        address: &mut Address,
        next: Next<'_>,
    ) -> std::result::Result<(), SubmitError> {
        let action = if address.is_new() { "created" } else { "updated" };
        next.run(address).await?;

        add_breadcrumb(
            "address",
            &format!("Address {action}"),
            &[("id", saved_id(address))],
        );
        Ok(())
    }
}

/// Create an address.
///
/// POST /address
///
/// Accepts `{id?, street, city, state, zipCode, country}` as JSON or as a
/// url-encoded form. A client `id` must be exactly 15 characters, well
/// formed, and unused; otherwise one is generated.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    UpsertBody(request): UpsertBody,
) -> Result<Json<Address>> {
    let mut address = Address::new();
    let mut form = AddressUpsert::new(state.store(), &mut address);
    form.load(request);
    form.submit_with(&[&SaveBreadcrumb]).await?;

    tracing::info!(id = saved_id(&address), "Address created");
    Ok(Json(address))
}

/// View an address.
///
/// GET /address/{id}
#[instrument(skip(state))]
pub async fn view(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Address>> {
    let address = find(&state, &id).await?;
    Ok(Json(address))
}

/// Update an address.
///
/// PATCH /address/{id}
///
/// Fields missing from the body keep their current values. If the body
/// carries an `id`, it must equal the record's id.
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    UpsertBody(request): UpsertBody,
) -> Result<Json<Address>> {
    let mut address = find(&state, &id).await?;
    let mut form = AddressUpsert::new(state.store(), &mut address);
    form.load(request);
    form.submit_with(&[&SaveBreadcrumb]).await?;

    tracing::info!(id = saved_id(&address), "Address updated");
    Ok(Json(address))
}

/// Load an address by raw path id; malformed ids are reported as not found.
async fn find(state: &AppState, id: &str) -> Result<Address> {
    let not_found = || ApiError::NotFound(format!("address {id}"));

    let id = RecordId::parse(id).map_err(|_| not_found())?;
    state.store().find_by_id(&id).await?.ok_or_else(not_found)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use chrono::Utc;

    use super::*;

    async fn bind(
        content_type: Option<&str>,
        body: &'static str,
    ) -> std::result::Result<AddressUpsertRequest, ApiError> {
        let mut builder = Request::builder().method("POST").uri("/address");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();

        UpsertBody::from_request(request, &()).await.map(|UpsertBody(r)| r)
    }

    #[tokio::test]
    async fn test_binds_json() {
        let body = r#"{"city":"Springfield","zipCode":"97403"}"#;
        let request = bind(Some("application/json"), body).await.unwrap();

        assert_eq!(request.city.as_deref(), Some("Springfield"));
        assert_eq!(request.zip_code.as_deref(), Some("97403"));
        assert!(request.street.is_none());
    }

    #[tokio::test]
    async fn test_binds_url_encoded_form() {
        let request = bind(
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            "street=1+Main&city=Spr&zipCode=62701",
        )
        .await
        .unwrap();

        assert_eq!(request.street.as_deref(), Some("1 Main"));
        assert_eq!(request.city.as_deref(), Some("Spr"));
        assert_eq!(request.zip_code.as_deref(), Some("62701"));
        assert!(request.country.is_none());
    }

    #[tokio::test]
    async fn test_empty_body_binds_empty_request() {
        let request = bind(None, "").await.unwrap();

        assert!(request.id.is_none());
        assert!(request.street.is_none());
        assert!(request.zip_code.is_none());
    }

    #[tokio::test]
    async fn test_unknown_content_type_is_malformed() {
        let err = bind(Some("text/plain"), "street=1+Main").await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));

        let err = bind(None, r#"{"city":"Springfield"}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));
    }

    #[test]
    fn test_saved_id_is_bare_value() {
        let mut address = Address::new();
        assert_eq!(saved_id(&address), "");

        let id = RecordId::parse("abc123def456ghi").unwrap();
        address.mark_persisted(id, Utc::now(), Utc::now());
        assert_eq!(saved_id(&address), "abc123def456ghi");
    }
}

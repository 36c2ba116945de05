//! Collection endpoints, written once for every [`Resource`]
//!
//! | method | path | handler |
//! |---|---|---|
//! | GET | `{collection}` | [`list`] |
//! | POST | `{collection}` | [`create`] |
//! | GET | `{collection}/{id}` | [`show`] |
//! | PATCH | `{collection}/{id}` | [`update`] |
//! | DELETE | `{collection}/{id}` | [`destroy`] |

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use tracing::instrument;

use super::error::ApiError;
use super::response::Envelope;
use crate::resources::Resource;
use crate::state::AppState;
use crate::validator::Validator;

/// Optional precondition on PATCH: the version the client last read
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// Routes for one resource collection
pub fn routes<R: Resource>() -> Router<AppState> {
    let item_path = format!("{}/{{id}}", R::COLLECTION_PATH);
    Router::new()
        .route(R::COLLECTION_PATH, get(list::<R>).post(create::<R>))
        .route(
            &item_path,
            get(show::<R>).patch(update::<R>).delete(destroy::<R>),
        )
}

/// A positive item id taken from the `{id}` path segment
///
/// Anything else is answered with 404, since no such resource can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ItemId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found())?;
        match raw.parse::<i64>() {
            Ok(id) if id >= 1 => Ok(Self(id)),
            _ => Err(ApiError::not_found()),
        }
    }
}

fn validate<R: Resource>(item: &R) -> Result<(), ApiError> {
    let mut v = Validator::new();
    item.validate(&mut v);
    if v.valid() {
        Ok(())
    } else {
        Err(ApiError::failed_validation(v.into_errors()))
    }
}

fn expected_version(headers: &HeaderMap) -> Result<Option<i32>, ApiError> {
    let Some(value) = headers.get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|text| text.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| ApiError::bad_request("the X-Expected-Version header must be an integer"))
}

#[instrument(skip_all, fields(kind = R::KIND))]
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    payload: Result<Json<R::Create>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = payload?;
    let mut item = R::from_create(input);
    validate(&item)?;

    R::repository(&state.models).insert(&mut item).await?;

    let location = format!("{}/{}", R::COLLECTION_PATH, item.record().id);
    let mut headers = HeaderMap::new();
    headers.insert(
        LOCATION,
        HeaderValue::from_str(&location).map_err(ApiError::internal)?,
    );

    Ok(Envelope::new()
        .with(R::ITEM_KEY, &item)?
        .respond(StatusCode::CREATED, headers))
}

#[instrument(skip(state), fields(kind = R::KIND))]
pub async fn show<R: Resource>(
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> Result<Envelope, ApiError> {
    let item = R::repository(&state.models).get(id).await?;
    Envelope::new().with(R::ITEM_KEY, &item)
}

/// Read, patch, and conditionally write one item
///
/// The version read here is the one the conditional write checks, so a
/// concurrent update between the two surfaces as an edit conflict.
#[instrument(skip(state, headers, payload), fields(kind = R::KIND))]
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    ItemId(id): ItemId,
    headers: HeaderMap,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Envelope, ApiError> {
    let repository = R::repository(&state.models);
    let mut item = repository.get(id).await?;

    if let Some(expected) = expected_version(&headers)? {
        if expected != item.record().version {
            tracing::warn!(kind = R::KIND, id, expected, "stale expected version");
            return Err(ApiError::edit_conflict());
        }
    }

    let Json(patch) = payload?;
    item.apply_patch(patch);
    validate(&item)?;

    repository.update(&mut item).await?;
    Envelope::new().with(R::ITEM_KEY, &item)
}

#[instrument(skip(state), fields(kind = R::KIND))]
pub async fn destroy<R: Resource>(
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> Result<Envelope, ApiError> {
    R::repository(&state.models).delete(id).await?;
    Envelope::new().with("message", R::DELETED_MESSAGE)
}

#[instrument(skip_all, fields(kind = R::KIND))]
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    query: Result<Query<R::Query>, QueryRejection>,
) -> Result<Envelope, ApiError> {
    let Query(query) = query?;

    let mut v = Validator::new();
    let (filter, filters) = R::list_params(&query, &mut v);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }

    let (items, metadata) = R::repository(&state.models)
        .get_all(&filter, &filters)
        .await?;

    Envelope::new()
        .with(R::LIST_KEY, &items)?
        .with("metadata", metadata)
}

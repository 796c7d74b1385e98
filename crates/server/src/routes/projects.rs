use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use models::resource::Resource;
use models::schema::{StatusSet, OWNER_KEY, STATUS_KEY};
use models::validation::{validate, FieldError, Payload, Reason};
use serde::Deserialize;
use service::{
    pagination::{Page, Pagination},
    repository::{ListFilter, ListOrder, SortDirection, SortField},
    Envelope, ServiceError,
};
use tracing::info;
use uuid::Uuid;

use crate::{context::Principal, errors::ApiError, routes::AppState};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Only projects owned by this principal.
    pub owner: Option<String>,
    /// `active`, `completed` or `archived`.
    pub status: Option<String>,
    /// `created_at` (default) or `updated_at`.
    pub sort: Option<String>,
    /// `desc` (default) or `asc`.
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    /// Split into filter, order and page. `statuses` bounds the status filter.
    pub fn into_parts(self, statuses: &StatusSet) -> Result<(ListFilter, ListOrder, Pagination), ServiceError> {
        let mut errors = Vec::new();

        let owner = match self.owner.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push(FieldError::new(OWNER_KEY, Reason::Format));
                    None
                }
            },
        };
        let status = self.status.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if status.as_deref().is_some_and(|s| !statuses.contains(s)) {
            errors.push(FieldError::new(STATUS_KEY, Reason::Enum));
        }

        let field = match self.sort.as_deref().map(str::trim) {
            None | Some("") | Some("created_at") => SortField::CreatedAt,
            Some("updated_at") => SortField::UpdatedAt,
            Some(_) => {
                errors.push(FieldError::new("sort", Reason::Enum));
                SortField::default()
            }
        };
        let direction = match self.direction.as_deref().map(|d| d.trim().to_ascii_lowercase()) {
            None => SortDirection::default(),
            Some(d) => match d.as_str() {
                "" | "desc" => SortDirection::Desc,
                "asc" => SortDirection::Asc,
                _ => {
                    errors.push(FieldError::new("direction", Reason::Enum));
                    SortDirection::default()
                }
            },
        };

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }
        Ok((
            ListFilter { owner, status },
            ListOrder::new(field, direction),
            Pagination::new(self.page, self.per_page),
        ))
    }
}

#[utoipa::path(
    get, path = "/api/projects", tag = "projects",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of projects"),
        (status = 400, description = "Invalid query", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 500, description = "Storage failure", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<Page<Resource>>>> {
    let Query(query) = query?;
    let (filter, order, pagination) = query.into_parts(&state.projects.schema().statuses)?;
    let page = state.projects.list(&filter, order, pagination).await?;
    Ok(Json(Envelope::ok(page)))
}

#[utoipa::path(
    post, path = "/api/projects", tag = "projects",
    params(("X-Principal-Id" = Uuid, Header, description = "Owner of the new project")),
    request_body = crate::openapi::ProjectInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation failed", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 409, description = "Project already exists", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 500, description = "Storage failure", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    body: Result<Json<Payload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Resource>>)> {
    let ctx = match principal.require() {
        Ok(ctx) => ctx,
        // report payload problems alongside the owner error
        Err(ServiceError::Validation(mut errors)) => {
            if let Ok(Json(payload)) = &body {
                if let Err(more) = validate(payload, state.projects.schema()) {
                    errors.extend(more);
                }
            }
            return Err(ServiceError::Validation(errors).into());
        }
        Err(e) => return Err(e.into()),
    };
    let Json(payload) = body?;
    let created = state.projects.create(&ctx, &payload).await?;
    info!(id = %created.id, owner = %created.owner, "project created");
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

#[utoipa::path(
    get, path = "/api/projects/{id}", tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 400, description = "Malformed id", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Project not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Envelope<Resource>>> {
    let Path(id) = id?;
    Ok(Json(Envelope::ok(state.projects.read(id).await?)))
}

/// Serves both PUT and PATCH: fields absent from the body keep their stored values.
#[utoipa::path(
    put, path = "/api/projects/{id}", tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = crate::openapi::ProjectPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation failed", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Project not found", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 409, description = "Project already exists", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<Payload>, JsonRejection>,
) -> ApiResult<Json<Envelope<Resource>>> {
    let Path(id) = id?;
    let Json(patch) = body?;
    let updated = state.projects.update(id, &patch).await?;
    info!(%id, status = %updated.status, "project updated");
    Ok(Json(Envelope::ok(updated)))
}

#[utoipa::path(
    delete, path = "/api/projects/{id}", tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Project not found", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 500, description = "Storage failure", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.projects.delete(id).await?;
    info!(%id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses() -> StatusSet {
        models::project::schema(false).statuses
    }

    #[test]
    fn empty_query_uses_defaults() {
        let (filter, order, pagination) = ListQuery::default().into_parts(&statuses()).unwrap();
        assert_eq!(filter, ListFilter::default());
        assert_eq!(order, ListOrder::default());
        assert_eq!(pagination.normalize(), (0, 20));
    }

    #[test]
    fn parses_sort_direction_and_owner() {
        let owner = Uuid::new_v4();
        let q = ListQuery {
            owner: Some(owner.to_string()),
            status: Some("archived".into()),
            sort: Some("updated_at".into()),
            direction: Some("ASC".into()),
            page: Some(2),
            per_page: Some(500),
        };
        let (filter, order, pagination) = q.into_parts(&statuses()).unwrap();
        assert_eq!(filter.owner, Some(owner));
        assert_eq!(filter.status.as_deref(), Some("archived"));
        assert_eq!(order, ListOrder::new(SortField::UpdatedAt, SortDirection::Asc));
        assert_eq!(pagination.normalize(), (1, 100));
    }

    #[test]
    fn invalid_parameters_are_field_errors() {
        let q = ListQuery {
            owner: Some("bob".into()),
            status: Some("deleted".into()),
            sort: Some("title".into()),
            direction: Some("sideways".into()),
            ..Default::default()
        };
        let err = q.into_parts(&statuses()).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Validation(vec![
                FieldError::new("owner", Reason::Format),
                FieldError::new("status", Reason::Enum),
                FieldError::new("sort", Reason::Enum),
                FieldError::new("direction", Reason::Enum),
            ])
        );
    }
}

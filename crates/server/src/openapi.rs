use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Body accepted by `POST /api/projects`. Unknown keys are ignored.
#[derive(ToSchema)]
pub struct ProjectInputDoc {
    /// 1 to 100 characters, trimmed.
    pub title: String,
    /// Up to 500 characters.
    pub description: Option<String>,
    /// Non-negative; numeric strings are accepted.
    pub budget: f64,
    /// `YYYY-MM-DD` or RFC 3339.
    pub deadline: Option<String>,
    /// `active` (default), `completed` or `archived`.
    pub status: Option<String>,
}

/// Body accepted by `PUT`/`PATCH /api/projects/{id}`; `null` clears an optional field.
#[derive(ToSchema)]
pub struct ProjectPatchDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub deadline: Option<String>,
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct FieldErrorDoc {
    pub field: String,
    /// One of `required`, `type`, `min_length`, `max_length`, `range`, `enum`, `format`.
    pub reason: String,
}

#[derive(ToSchema)]
pub struct ErrorEnvelopeDoc {
    pub success: bool,
    pub message: String,
    pub details: Option<Vec<FieldErrorDoc>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::projects::list,
        crate::routes::projects::create,
        crate::routes::projects::get,
        crate::routes::projects::update,
        crate::routes::projects::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ProjectInputDoc,
            ProjectPatchDoc,
            FieldErrorDoc,
            ErrorEnvelopeDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "projects")
    )
)]
pub struct ApiDoc;

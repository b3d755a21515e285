use crate::validation::ValidationFailure;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RegistrarResult<T> = Result<T, RegistrarError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RegistrarError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error initialising DB schema"))]
    InitialiseSchema { source: sqlx::Error },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unable to parse student id {:?}", original))]
    ParseStudentId {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Invalid student id: {}", id))]
    InvalidStudentId { id: i32 },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i32 },
    #[snafu(display("Email already exists"))]
    DuplicateEmail { email: String },
    #[snafu(display("Validation failed"))]
    Validation { failure: ValidationFailure },
}

impl IntoResponse for RegistrarError {
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let status_code = match &self {
            Self::OpenDatabase { .. }
            | Self::GetDatabaseConnection { .. }
            | Self::InitialiseSchema { .. } => ISE,
            Self::MakeQuery { source } => match source {
                sqlx::Error::RowNotFound => NF,
                _ => ISE,
            },
            Self::BadEnvVar { .. } | Self::ParsePort { .. } => ISE,
            Self::ParseStudentId { .. } | Self::InvalidStudentId { .. } => BI,
            Self::MissingStudent { .. } => NF,
            Self::DuplicateEmail { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } => BI,
        };

        let body = match &self {
            Self::Validation { failure } => json!({
                "error": "Validation failed",
                "details": failure,
            }),
            other => json!({ "error": other.to_string() }),
        };

        error!(?self, "Error!");
        (status_code, Json(body)).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::error::AppError;

/// Every failure a request can end in, each tied to a fixed status code.
#[derive(Debug)]
pub enum ApiError {
    MissingSearchFields,
    ArxivUnavailable,
    NoResults,
    StorageFailure,
    Duplicate,
    StartInFuture,
    EndBeforeStart,
    MalformedTimestamp,
    NoQueriesInRange,
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let code = match self {
            ApiError::MissingSearchFields => 420,
            ApiError::ArxivUnavailable => 421,
            ApiError::NoResults => 422,
            ApiError::StorageFailure => 423,
            ApiError::Duplicate => 424,
            ApiError::StartInFuture => 425,
            ApiError::EndBeforeStart => 426,
            ApiError::MalformedTimestamp => 427,
            ApiError::NoQueriesInRange => 428,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::MissingSearchFields => {
                "At least one of author, title, or journal must be provided.".to_string()
            }
            ApiError::ArxivUnavailable => {
                "Arxiv API is not responding. Please try again later".to_string()
            }
            ApiError::NoResults => "No results from this query that was made to arXiv API. \
                                    Please check the input parameters"
                .to_string(),
            ApiError::StorageFailure => {
                "Failed to store query and results in the database".to_string()
            }
            ApiError::Duplicate => {
                "Query already exists. Please retrieve it from the database".to_string()
            }
            ApiError::StartInFuture => "Query start timestamp cannot be in the future".to_string(),
            ApiError::EndBeforeStart => {
                "Query end timestamp cannot be before the start timestamp".to_string()
            }
            ApiError::MalformedTimestamp => {
                "Timestamps must be in the format 'YYYY-MM-DDTHH:MM:SS'".to_string()
            }
            ApiError::NoQueriesInRange => {
                "No Query results found in the database for the given timestamps".to_string()
            }
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Internal(msg) => format!("Internal server error: {msg}"),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NoSearchParameters => ApiError::MissingSearchFields,
            AppError::ArxivUnavailable(_) => ApiError::ArxivUnavailable,
            AppError::StorageFailure(_) => ApiError::StorageFailure,
            AppError::StartInFuture => ApiError::StartInFuture,
            AppError::EndBeforeStart => ApiError::EndBeforeStart,
            AppError::MalformedTimestamp(_) => ApiError::MalformedTimestamp,
            AppError::InvalidParameter(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!("{} {}", status.as_u16(), message);
        } else {
            warn!("{} {}", status.as_u16(), message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_their_codes() {
        let cases = [
            (AppError::NoSearchParameters, 420),
            (AppError::ArxivUnavailable("timeout".into()), 421),
            (AppError::StorageFailure("disk full".into()), 423),
            (AppError::StartInFuture, 425),
            (AppError::EndBeforeStart, 426),
            (AppError::MalformedTimestamp("yesterday".into()), 427),
            (AppError::InvalidParameter("page".into()), 400),
            (AppError::Render("no columns".into()), 500),
        ];

        for (err, code) in cases {
            assert_eq!(ApiError::from(err).status().as_u16(), code);
        }
    }

    #[test]
    fn internal_errors_carry_the_cause() {
        let err = ApiError::from(AppError::Render("no columns".into()));
        assert!(err.message().contains("no columns"));
    }

    #[test]
    fn outcome_codes_have_fixed_messages() {
        assert_eq!(ApiError::NoResults.status().as_u16(), 422);
        assert_eq!(ApiError::Duplicate.status().as_u16(), 424);
        assert_eq!(ApiError::NoQueriesInRange.status().as_u16(), 428);
        assert_eq!(
            ApiError::NoResults.message(),
            "No results from this query that was made to arXiv API. Please check the input parameters"
        );
    }
}

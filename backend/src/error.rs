use adapters::notifier::NotifierError;
use market::MarketError;
use market::types::Family;
use serde::Serialize;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reply::Response;

/// User-visible failure of an API operation.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unknown instrument: {family} level {level}")]
    UnknownInstrument { family: Family, level: u32 },

    #[error("not connected to the market feed")]
    NotConnected,

    #[error("notifier is not configured")]
    NotifierNotConfigured,

    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("market feed unavailable")]
    FeedUnavailable,

    #[error("internal error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownInstrument { .. }
            | ApiError::NotConnected
            | ApiError::NotifierNotConfigured => StatusCode::BAD_REQUEST,
            ApiError::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::FeedUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UnknownInstrument { .. } => "unknown_instrument",
            ApiError::NotConnected => "not_connected",
            ApiError::NotifierNotConfigured => "notifier_not_configured",
            ApiError::DeliveryFailed(_) => "delivery_failed",
            ApiError::FeedUnavailable => "feed_unavailable",
            ApiError::Internal => "internal",
        }
    }
}

impl warp::Reply for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.code(),
            message: self.to_string(),
        };
        warp::reply::with_status(warp::reply::json(&body), self.status()).into_response()
    }
}

impl From<MarketError> for ApiError {
    fn from(e: MarketError) -> Self {
        match e {
            MarketError::UnknownInstrument { family, level } => {
                ApiError::UnknownInstrument { family, level }
            }
            MarketError::NotConnected => ApiError::NotConnected,
            MarketError::StaleTick { .. }
            | MarketError::InsufficientData
            | MarketError::InvalidTick { .. } => ApiError::Internal,
        }
    }
}

impl From<NotifierError> for ApiError {
    fn from(e: NotifierError) -> Self {
        match e {
            NotifierError::NotConfigured => ApiError::NotifierNotConfigured,
            other => ApiError::DeliveryFailed(other.to_string()),
        }
    }
}

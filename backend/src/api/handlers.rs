use std::convert::Infallible;

use market::catalog;
use serde::Serialize;
use tracing::{field, info, instrument, warn};
use warp::Reply;
use warp::http::StatusCode;
use warp::reply::Response;

use super::dto::{Ack, SetInstrumentRequest, SetInstrumentResponse};
use crate::context::AppContext;
use crate::error::ApiError;
use crate::logger::annotate_span;

/// Number of signals returned by `GET /api/signals`.
pub const RECENT_SIGNALS: usize = 20;

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Result<Response, Infallible> {
    Ok(match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) => e.into_response(),
    })
}

pub async fn status(ctx: AppContext) -> Result<Response, Infallible> {
    respond(Ok(ctx.market.status()))
}

#[instrument(skip_all)]
pub async fn start(ctx: AppContext) -> Result<Response, Infallible> {
    respond(
        ctx.market
            .start()
            .map(|()| Ack::ok("Signal analysis started"))
            .map_err(ApiError::from),
    )
}

#[instrument(skip_all)]
pub async fn stop(ctx: AppContext) -> Result<Response, Infallible> {
    ctx.market.stop();
    respond(Ok(Ack::ok("Signal analysis stopped")))
}

#[instrument(
    skip(ctx),
    fields(level = req.level, family = ?req.family, symbol = field::Empty)
)]
pub async fn set_instrument(
    req: SetInstrumentRequest,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    let switch = ctx.begin_switch().await;
    let spec = match switch.apply(req.family, req.level).await {
        Ok(spec) => spec,
        Err(e) => {
            warn!(error = %e, "instrument switch rejected");
            return respond::<()>(Err(e));
        }
    };
    annotate_span(spec.symbol);
    info!("instrument switched via api");

    respond(Ok(SetInstrumentResponse {
        success: true,
        symbol: spec.symbol,
        name: spec.display_name,
        family: spec.family,
    }))
}

pub async fn signals(ctx: AppContext) -> Result<Response, Infallible> {
    respond(Ok(ctx.market.recent_signals(RECENT_SIGNALS)))
}

pub async fn available_instruments() -> Result<Response, Infallible> {
    respond(Ok(catalog::grouped()))
}

#[instrument(skip_all, fields(symbol = field::Empty))]
pub async fn notify_test(ctx: AppContext) -> Result<Response, Infallible> {
    let instrument = ctx.market.active_instrument();
    annotate_span(instrument.symbol);

    let result = ctx
        .notifications
        .send_test(
            instrument,
            ctx.market.current_price(),
            ctx.market.is_connected(),
        )
        .await
        .map(|()| Ack::ok("Test message sent"))
        .map_err(ApiError::from);

    if let Err(e) = &result {
        warn!(error = %e, "test notification failed");
    }
    respond(result)
}

pub async fn health(ctx: AppContext) -> Result<Response, Infallible> {
    respond(Ok(ctx.market.health()))
}

#[derive(Serialize)]
struct RejectionBody {
    success: bool,
    error: &'static str,
    message: String,
}

/// Turn filter rejections (unknown route, bad body) into JSON errors.
pub async fn handle_rejection(err: warp::Rejection) -> Result<Response, Infallible> {
    let (status, error, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not_found", "route not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "invalid_body", e.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "request body too large".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "method not allowed".to_string(),
        )
    } else {
        warn!(rejection = ?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "internal error".to_string(),
        )
    };

    let body = RejectionBody {
        success: false,
        error,
        message,
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status).into_response())
}

//! HTTP gateway.
//!
//! | method | path                          |
//! |--------|-------------------------------|
//! | GET    | /                             |
//! | GET    | /api/status                   |
//! | POST   | /api/start                    |
//! | POST   | /api/stop                     |
//! | POST   | /api/set-instrument           |
//! | GET    | /api/signals                  |
//! | GET    | /api/available-instruments    |
//! | POST   | /api/notify-test              |
//! | GET    | /api/health                   |

pub mod dto;
pub mod handlers;

use std::convert::Infallible;

use warp::Filter;

use crate::context::AppContext;
use crate::logger::{TraceId, request_span};

const MAX_BODY_BYTES: u64 = 4 * 1024;

/// Control page driving the `/api` routes.
const DASHBOARD_HTML: &str = include_str!("../../static/index.html");

fn with_ctx(ctx: AppContext) -> impl Filter<Extract = (AppContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

pub fn routes(
    ctx: AppContext,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    let dashboard = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(DASHBOARD_HTML));

    let api = warp::path("api");

    let status = api
        .and(warp::path("status"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::status);

    let start = api
        .and(warp::path("start"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::start);

    let stop = api
        .and(warp::path("stop"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::stop);

    let set_instrument = api
        .and(warp::path("set-instrument"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::set_instrument);

    let signals = api
        .and(warp::path("signals"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::signals);

    let instruments = api
        .and(warp::path("available-instruments"))
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::available_instruments);

    let notify_test = api
        .and(warp::path("notify-test"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::notify_test);

    let health = api
        .and(warp::path("health"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_ctx(ctx))
        .and_then(handlers::health);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST"])
        .allow_header("content-type");

    dashboard
        .or(status)
        .or(start)
        .or(stop)
        .or(set_instrument)
        .or(signals)
        .or(instruments)
        .or(notify_test)
        .or(health)
        .with(cors)
        .recover(handlers::handle_rejection)
        .with(warp::trace(|info| {
            request_span(info.method().as_str(), info.path(), &TraceId::random())
        }))
}

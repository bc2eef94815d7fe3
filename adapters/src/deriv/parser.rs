//! Deriv websocket message parser.
//!
//! Every server frame is a JSON object tagged with `msg_type` and echoing the
//! request that produced it:
//!
//! ```jsonc
//! { "msg_type": "tick", "echo_req": { "ticks": "R_75", "subscribe": 1 },
//!   "tick": { "quote": 1234.56, "bid": 1234.5, "ask": 1234.6, "epoch": 1700000000, "symbol": "R_75" } }
//! { "msg_type": "forget_all", "forget_all": ["..."] }
//! { "msg_type": "tick", "error": { "code": "InvalidSymbol", "message": "..." }, "echo_req": { "ticks": "1HZ75V" } }
//! ```
//!
//! The parser is stateless. Errors take precedence over any payload in the
//! same frame. Frames that carry nothing actionable yield `Ok(None)`.

use serde_json::Value;

use super::types::{DerivResponse, FeedErrorCode, FeedEvent};

pub fn parse_deriv_message(raw: &str) -> Result<Option<FeedEvent>, serde_json::Error> {
    let resp: DerivResponse = serde_json::from_str(raw)?;

    if let Some(err) = resp.error {
        let symbol = resp
            .echo_req
            .as_ref()
            .and_then(|req| req.get("ticks"))
            .and_then(Value::as_str)
            .map(str::to_string);

        return Ok(Some(FeedEvent::Error {
            code: FeedErrorCode::from(err.code.as_str()),
            message: err.message,
            symbol,
        }));
    }

    if let Some(tick) = resp.tick {
        return Ok(Some(FeedEvent::Tick(tick.into())));
    }

    if resp.msg_type.as_deref() == Some("forget_all") {
        return Ok(Some(FeedEvent::Unsubscribed));
    }

    Ok(None)
}

/// `{"ticks": <symbol>, "subscribe": 1}`
pub fn subscribe_request(symbol: &str) -> Value {
    serde_json::json!({ "ticks": symbol, "subscribe": 1 })
}

/// `{"forget_all": "ticks"}`
pub fn forget_all_request() -> Value {
    serde_json::json!({ "forget_all": "ticks" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use market::types::Tick;
    use serde_json::json;

    #[test]
    fn parses_tick_with_quote_and_book() {
        let raw = json!({
            "msg_type": "tick",
            "echo_req": { "ticks": "1HZ75V", "subscribe": 1 },
            "subscription": { "id": "abc" },
            "tick": {
                "ask": 4521.53,
                "bid": 4521.13,
                "epoch": 1_700_000_123,
                "id": "abc",
                "pip_size": 2,
                "quote": 4521.33,
                "symbol": "1HZ75V"
            }
        })
        .to_string();

        let ev = parse_deriv_message(&raw).unwrap().unwrap();
        assert_eq!(
            ev,
            FeedEvent::Tick(Tick {
                price: 4521.33,
                bid: Some(4521.13),
                ask: Some(4521.53),
                symbol: "1HZ75V".into(),
                epoch_seconds: 1_700_000_123,
            })
        );
    }

    #[test]
    fn tick_without_book_leaves_bid_ask_empty() {
        let raw = r#"{"msg_type":"tick","tick":{"quote":101.5,"epoch":1,"symbol":"R_10"}}"#;

        match parse_deriv_message(raw).unwrap() {
            Some(FeedEvent::Tick(t)) => {
                assert_eq!(t.bid, None);
                assert_eq!(t.ask, None);
                assert_eq!(t.price, 101.5);
            }
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[test]
    fn invalid_symbol_error_carries_echoed_symbol() {
        let raw = json!({
            "msg_type": "tick",
            "echo_req": { "ticks": "1HZ75V", "subscribe": 1 },
            "error": { "code": "InvalidSymbol", "message": "Symbol 1HZ75V invalid." }
        })
        .to_string();

        let ev = parse_deriv_message(&raw).unwrap().unwrap();
        assert_eq!(
            ev,
            FeedEvent::Error {
                code: FeedErrorCode::InvalidSymbol,
                message: "Symbol 1HZ75V invalid.".into(),
                symbol: Some("1HZ75V".into()),
            }
        );
    }

    #[test]
    fn other_error_codes_are_preserved() {
        let raw = r#"{"msg_type":"forget_all","error":{"code":"RateLimit","message":"slow down"}}"#;

        match parse_deriv_message(raw).unwrap() {
            Some(FeedEvent::Error { code, symbol, .. }) => {
                assert_eq!(code, FeedErrorCode::Other("RateLimit".into()));
                assert_eq!(symbol, None);
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn forget_all_ack() {
        let raw = r#"{"msg_type":"forget_all","forget_all":["abc"],"echo_req":{"forget_all":"ticks"}}"#;
        assert_eq!(parse_deriv_message(raw).unwrap(), Some(FeedEvent::Unsubscribed));
    }

    #[test]
    fn unrelated_frames_are_ignored() {
        let raw = r#"{"msg_type":"ping","ping":"pong"}"#;
        assert_eq!(parse_deriv_message(raw).unwrap(), None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_deriv_message("{not json").is_err());
        assert!(parse_deriv_message(r#"{"tick":{"quote":"x"}}"#).is_err());
    }

    #[test]
    fn request_payloads() {
        assert_eq!(
            subscribe_request("R_50"),
            json!({ "ticks": "R_50", "subscribe": 1 })
        );
        assert_eq!(forget_all_request(), json!({ "forget_all": "ticks" }));
    }
}

use tokio::sync::mpsc;

use market::MarketError;
use market::catalog;
use market::manager::MarketManager;
use market::types::{Direction, Family, Tick};

const T0_MS: u64 = 1_700_000_000_000;

fn zigzag(len: usize) -> Vec<f64> {
    let mut prices = Vec::with_capacity(len);
    let mut p = 100.0;
    prices.push(p);
    for i in 0..len.saturating_sub(1) {
        p *= if i % 2 == 0 { 1.06 } else { 0.97 };
        prices.push(p);
    }
    prices
}

fn tick(symbol: &str, price: f64, epoch_seconds: i64) -> Tick {
    Tick {
        price,
        bid: None,
        ask: None,
        symbol: symbol.to_string(),
        epoch_seconds,
    }
}

fn running_manager(tx: Option<mpsc::Sender<market::signal::Signal>>) -> MarketManager {
    let spec = catalog::lookup(Family::Regular, 50).unwrap();
    let mgr = MarketManager::new(spec, tx);
    mgr.set_connected(true);
    mgr.start().unwrap();
    mgr
}

#[test]
fn start_requires_connected_feed() {
    let mgr = MarketManager::new(catalog::default_instrument(), None);

    assert_eq!(mgr.start(), Err(MarketError::NotConnected));
    assert!(!mgr.is_running());

    mgr.set_connected(true);
    mgr.start().unwrap();
    assert!(mgr.is_running());

    mgr.stop();
    assert!(!mgr.is_running());
}

#[test]
fn stopped_manager_keeps_state_but_never_evaluates() {
    let spec = catalog::lookup(Family::Regular, 50).unwrap();
    let mgr = MarketManager::new(spec, None);

    for (i, p) in zigzag(40).into_iter().enumerate() {
        let out = mgr
            .ingest_tick_at(&tick("R_50", p, i as i64), T0_MS + i as u64 * 2_000)
            .unwrap();
        assert!(out.is_none());
    }

    let counters = mgr.counters().snapshot();
    assert_eq!(counters.ticks_accepted, 40);
    assert_eq!(counters.evaluations, 0);
    assert!(mgr.recent_signals(20).is_empty());
    assert_eq!(mgr.with_state(|s| s.history().len()), 40);
}

#[tokio::test]
async fn emits_once_then_cooldown_suppresses_and_forwards() {
    let (tx, mut rx) = mpsc::channel(8);
    let mgr = running_manager(Some(tx));

    let mut emitted = Vec::new();
    for (i, p) in zigzag(40).into_iter().enumerate() {
        let now = T0_MS + i as u64 * 2_000;
        if let Some(signal) = mgr.ingest_tick_at(&tick("R_50", p, i as i64), now).unwrap() {
            emitted.push((i, signal));
        }
    }

    assert_eq!(emitted.len(), 1);
    let (index, signal) = &emitted[0];
    assert_eq!(*index, 19);
    assert_eq!(signal.direction, Direction::Bullish);
    assert_eq!(signal.instrument_symbol, "R_50");

    let forwarded = rx.recv().await.unwrap();
    assert_eq!(forwarded.id, signal.id);

    let counters = mgr.counters().snapshot();
    assert_eq!(counters.evaluations, 40);
    assert_eq!(counters.signals_emitted, 1);
    assert_eq!(counters.signals_bullish, 1);
    assert_eq!(counters.suppressed_cooldown, 20);
    assert_eq!(mgr.recent_signals(20).len(), 1);
}

#[test]
fn full_queue_drops_notification_but_keeps_signal() {
    let (tx, _rx) = mpsc::channel(1);
    let mgr = running_manager(Some(tx));

    let prices = zigzag(21);
    for (i, p) in prices.iter().enumerate() {
        mgr.ingest_tick_at(&tick("R_50", *p, i as i64), T0_MS).unwrap();
    }
    // cooldown elapsed; the queue still holds the first signal
    mgr.ingest_tick_at(&tick("R_50", prices[20] * 1.06, 21), T0_MS + 300_000)
        .unwrap()
        .expect("second signal");

    assert_eq!(mgr.recent_signals(50).len(), 2);
    assert_eq!(mgr.counters().snapshot().notifications_dropped, 1);
}

#[test]
fn stale_and_invalid_ticks_are_counted_and_rejected() {
    let mgr = running_manager(None);

    let err = mgr.ingest_tick_at(&tick("R_10", 100.0, 1), T0_MS).unwrap_err();
    assert!(matches!(err, MarketError::StaleTick { .. }));

    let err = mgr.ingest_tick_at(&tick("R_50", -1.0, 2), T0_MS).unwrap_err();
    assert_eq!(err, MarketError::InvalidTick { price: -1.0 });

    let counters = mgr.counters().snapshot();
    assert_eq!(counters.ticks_stale, 1);
    assert_eq!(counters.ticks_invalid, 1);
    assert_eq!(counters.ticks_accepted, 0);
    assert_eq!(mgr.current_price(), 0.0);
}

#[test]
fn switch_defaults_to_active_family_and_resets_state() {
    let mgr = running_manager(None);
    for (i, p) in zigzag(25).into_iter().enumerate() {
        mgr.ingest_tick_at(&tick("R_50", p, i as i64), T0_MS).unwrap();
    }

    let spec = mgr.switch_instrument(None, 100).unwrap();
    assert_eq!(spec.symbol, "R_100");
    assert_eq!(mgr.active_instrument().symbol, "R_100");
    assert_eq!(mgr.current_price(), 0.0);
    assert!(mgr.with_state(|s| s.history().is_empty()));
    assert!(mgr.is_running());

    // ticks for the old symbol are now stale
    assert!(mgr.ingest_tick_at(&tick("R_50", 101.0, 99), T0_MS).is_err());

    let spec = mgr.switch_instrument(Some(Family::HighFrequency), 10).unwrap();
    assert_eq!(spec.symbol, "1HZ10V");
    assert_eq!(mgr.with_state(|s| s.history().capacity()), 300);
}

#[test]
fn unknown_level_leaves_instrument_unchanged() {
    let mgr = running_manager(None);
    mgr.ingest_tick_at(&tick("R_50", 123.0, 1), T0_MS).unwrap();

    assert_eq!(
        mgr.switch_instrument(None, 999),
        Err(MarketError::UnknownInstrument {
            family: Family::Regular,
            level: 999
        })
    );
    assert_eq!(mgr.active_instrument().symbol, "R_50");
    assert_eq!(mgr.current_price(), 123.0);
}

#[test]
fn status_reports_active_instrument_and_todays_signals() {
    let mgr = running_manager(None);
    for (i, p) in zigzag(20).into_iter().enumerate() {
        mgr.ingest_tick(&tick("R_50", p, 1_700_000_000 + i as i64)).unwrap();
    }

    let status = mgr.status();
    assert_eq!(status.symbol, "R_50");
    assert_eq!(status.family, Family::Regular);
    assert_eq!(status.frequency, "~2s");
    assert!(status.running);
    assert!(status.connected);
    assert_eq!(status.signals_today, 1);
    assert_eq!(status.performance.counters.signals_emitted, 1);
    assert!(status.performance.last_signal_at.is_some());
    assert!(status.last_update.is_some());

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["performance"]["signals_emitted"], 1);
    assert_eq!(json["family"], "regular");

    let health = mgr.health();
    assert!(health.connected && health.running);
}

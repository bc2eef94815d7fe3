use market::catalog;
use market::signal::log::SIGNAL_LOG_CAPACITY;
use market::signal::analysis::{TAG_HIGH_VOLATILITY, TAG_OVERSOLD_BULLISH, TAG_SCALP, TAG_STRONG_TREND};
use market::signal::types::{Momentum, Trend};
use market::signal::{Evaluation, SignalEngine};
use market::state::MarketState;
use market::types::{Direction, Family, Tick};
use proptest::prelude::*;

const T0_MS: u64 = 1_700_000_000_000;

fn state_with(family: Family, level: u32, prices: &[f64]) -> MarketState {
    let spec = catalog::lookup(family, level).unwrap();
    let mut state = MarketState::new(spec);
    state.start(true).unwrap();
    for (i, p) in prices.iter().enumerate() {
        state
            .ingest_tick(&Tick {
                price: *p,
                bid: Some(p - 0.05),
                ask: Some(p + 0.05),
                symbol: spec.symbol.to_string(),
                epoch_seconds: 1_700_000_000 + i as i64,
            })
            .unwrap();
    }
    state
}

/// Flat base, a one-tick spike, then a slow climb: strong bullish SMAs with an
/// oversold RSI and high realized volatility.
fn spike_then_climb() -> Vec<f64> {
    let mut prices = vec![100.0; 40];
    prices.push(110.0);
    prices.extend((0..14).map(|j| 100.0 + 0.2 * j as f64));
    prices
}

fn dip_then_slide() -> Vec<f64> {
    let mut prices = vec![100.0; 40];
    prices.push(90.0);
    prices.extend((0..14).map(|j| 100.0 - 0.2 * j as f64));
    prices
}

/// Alternating +6% / -3% steps from 100.
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

#[test]
fn warm_up_gate_per_family() {
    let mut engine = SignalEngine::new();

    let hf = state_with(Family::HighFrequency, 75, &[100.0; 29]);
    assert_eq!(
        engine.evaluate(&hf, T0_MS),
        Evaluation::Warming {
            samples: 29,
            required: 30
        }
    );

    let reg = state_with(Family::Regular, 75, &[100.0; 19]);
    assert_eq!(
        engine.evaluate(&reg, T0_MS),
        Evaluation::Warming {
            samples: 19,
            required: 20
        }
    );
}

#[test]
fn flat_market_scores_below_threshold() {
    let mut engine = SignalEngine::new();
    let state = state_with(Family::Regular, 10, &[100.0; 40]);

    // neutral trend, low volatility: 50 - 20
    assert_eq!(
        engine.evaluate(&state, T0_MS),
        Evaluation::BelowThreshold {
            strength: 30,
            threshold: 75
        }
    );
    assert!(engine.log().is_empty());
}

#[test]
fn steady_climb_is_strong_bullish_but_too_quiet_to_emit() {
    let prices: Vec<f64> = (0..60).map(|i| 100.0 + 0.1 * i as f64).collect();
    let state = state_with(Family::HighFrequency, 75, &prices);

    let profile = Family::HighFrequency.profile();
    let window = state.recent_prices(profile.analysis_window);
    let snapshot = market::signal::analysis::compute_snapshot(
        &window,
        state.current_price(),
        state.previous_price(),
    )
    .unwrap();
    let c = market::signal::analysis::classify(&snapshot, &profile);

    assert_eq!(c.trend, Trend::StrongBullish);
    assert_eq!(c.momentum, Momentum::Overbought);
    assert_eq!(snapshot.rsi14, 100.0);

    // Low realized volatility cancels the strong-trend bonus.
    let mut engine = SignalEngine::new();
    assert_eq!(
        engine.evaluate(&state, T0_MS),
        Evaluation::BelowThreshold {
            strength: 50,
            threshold: 80
        }
    );
}

#[test]
fn spike_then_climb_emits_bullish_signal_on_vol75_1s() {
    let prices = spike_then_climb();
    let state = state_with(Family::HighFrequency, 75, &prices);
    let mut engine = SignalEngine::new();

    let signal = engine
        .evaluate(&state, T0_MS)
        .into_signal()
        .expect("signal expected");

    let last = *prices.last().unwrap();
    assert_eq!(signal.direction, Direction::Bullish);
    assert_eq!(signal.instrument_symbol, "1HZ75V");
    assert_eq!(signal.entry_price, last);
    assert_eq!(signal.stop_loss_price, last - 100.0);
    assert_eq!(signal.take_profit_price, last + 250.0);
    assert_eq!(signal.confidence, 95);
    assert_eq!(signal.risk_reward_ratio, "1:2.5");
    assert_eq!(signal.risk_percent, 2.2);
    assert_eq!(signal.technicals.trend, Trend::StrongBullish);
    assert_eq!(signal.technicals.momentum, Momentum::Oversold);
    assert_eq!(
        signal.reason_tags,
        vec![TAG_STRONG_TREND, TAG_OVERSOLD_BULLISH, TAG_HIGH_VOLATILITY, TAG_SCALP]
    );
    assert!((signal.spread_at_entry - 0.1).abs() < 1e-9);
    assert_eq!(signal.id, T0_MS);
    assert_eq!(engine.clock().last_signal_at_ms(), Some(T0_MS));
    assert_eq!(engine.log().len(), 1);
}

#[test]
fn dip_then_slide_emits_bearish_signal_with_mirrored_levels() {
    let prices = dip_then_slide();
    let state = state_with(Family::HighFrequency, 75, &prices);
    let mut engine = SignalEngine::new();

    let signal = engine.evaluate(&state, T0_MS).into_signal().unwrap();
    let last = *prices.last().unwrap();

    assert_eq!(signal.direction, Direction::Bearish);
    assert_eq!(signal.stop_loss_price, last + 100.0);
    assert_eq!(signal.take_profit_price, last - 250.0);
    assert_eq!(signal.technicals.trend, Trend::StrongBearish);
}

#[test]
fn second_eligible_evaluation_inside_cooldown_is_suppressed() {
    let state = state_with(Family::HighFrequency, 75, &spike_then_climb());
    let mut engine = SignalEngine::new();

    assert!(matches!(engine.evaluate(&state, T0_MS), Evaluation::Emitted(_)));
    assert_eq!(
        engine.evaluate(&state, T0_MS + 10_000),
        Evaluation::CoolingDown {
            strength: 95,
            remaining_ms: 170_000
        }
    );
    assert_eq!(engine.log().len(), 1);
    assert_eq!(engine.clock().last_signal_at_ms(), Some(T0_MS));

    // Exactly at the boundary the cooldown has elapsed.
    let again = engine.evaluate(&state, T0_MS + 180_000).into_signal().unwrap();
    assert_eq!(again.id, T0_MS + 180_000);
    assert_eq!(engine.log().recent(2)[0].id, again.id);
}

#[test]
fn regular_cooldown_is_five_minutes() {
    let prices = zigzag(40);
    let state = state_with(Family::Regular, 50, &prices);
    let mut engine = SignalEngine::new();

    let first = engine.evaluate(&state, T0_MS).into_signal().unwrap();
    assert_eq!(first.confidence, 80);
    assert_eq!(first.direction, Direction::Bullish);
    assert_eq!(first.stop_loss_price, first.entry_price - 100.0);

    assert!(matches!(
        engine.evaluate(&state, T0_MS + 299_999),
        Evaluation::CoolingDown { remaining_ms: 1, .. }
    ));
    assert!(matches!(
        engine.evaluate(&state, T0_MS + 300_000),
        Evaluation::Emitted(_)
    ));
}

#[test]
fn signal_log_is_capped_newest_first() {
    let state = state_with(Family::HighFrequency, 75, &spike_then_climb());
    let mut engine = SignalEngine::new();

    for k in 0..60u64 {
        let now = T0_MS + k * 180_000;
        assert!(matches!(engine.evaluate(&state, now), Evaluation::Emitted(_)));
    }

    let log = engine.log();
    assert_eq!(log.len(), 50);
    let ids: Vec<u64> = log.recent(50).iter().map(|s| s.id).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(ids[0], T0_MS + 59 * 180_000);
    assert_eq!(log.recent(20).len(), 20);
}

/// A state that clears its family's emission threshold.
fn eligible_state(family: Family) -> MarketState {
    match family {
        Family::HighFrequency => state_with(family, 75, &spike_then_climb()),
        Family::Regular => state_with(family, 50, &zigzag(40)),
    }
}

proptest! {
    #[test]
    fn signal_log_stays_bounded_and_newest_first(
        steps in prop::collection::vec(0u64..400_000, 1..150)
    ) {
        let state = eligible_state(Family::HighFrequency);
        let mut engine = SignalEngine::new();
        let mut now = T0_MS;

        for step in steps {
            now += step;
            engine.evaluate(&state, now);

            let log = engine.log();
            prop_assert!(log.len() <= SIGNAL_LOG_CAPACITY);
            let ids: Vec<u64> = log.recent(SIGNAL_LOG_CAPACITY).iter().map(|s| s.id).collect();
            prop_assert!(ids.windows(2).all(|w| w[0] > w[1]));
        }
    }

    #[test]
    fn nothing_emits_inside_the_cooldown(
        regular in any::<bool>(),
        fraction in 0.0..1.0f64,
        prices in prop::collection::vec(50.0..150.0f64, 30..120)
    ) {
        let family = if regular { Family::Regular } else { Family::HighFrequency };
        let cooldown_ms = family.profile().cooldown_ms;
        let mut engine = SignalEngine::new();
        prop_assert!(matches!(
            engine.evaluate(&eligible_state(family), T0_MS),
            Evaluation::Emitted(_)
        ));

        let elapsed = ((cooldown_ms as f64 * fraction) as u64).min(cooldown_ms - 1);
        let now = T0_MS + elapsed;

        // Neither the eligible state nor an arbitrary one may emit.
        let arbitrary = state_with(family, 25, &prices);
        prop_assert!(!matches!(engine.evaluate(&eligible_state(family), now), Evaluation::Emitted(_)));
        prop_assert!(!matches!(engine.evaluate(&arbitrary, now), Evaluation::Emitted(_)));
        prop_assert_eq!(engine.log().len(), 1);
    }
}

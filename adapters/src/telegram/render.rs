//! Telegram message bodies (legacy `Markdown` parse mode).
//!
//! Legacy Markdown treats `_` as an italic marker, so enum labels are rendered
//! with spaces instead of underscores.

use chrono::Local;
use market::signal::Signal;
use market::types::InstrumentSpec;

fn plain(label: &str) -> String {
    label.replace('_', " ")
}

pub fn render_signal(signal: &Signal) -> String {
    let t = &signal.technicals;

    format!(
        "🚨 *LIVE TRADING SIGNAL* 🚨\n\
         \n\
         📊 *{name}*\n\
         ⚡ *Update Frequency:* {frequency}\n\
         🎯 *Direction:* {direction}\n\
         💰 *Entry:* {entry:.5}\n\
         🛡️ *Stop Loss:* {sl:.5}\n\
         🎯 *Take Profit:* {tp:.5}\n\
         📈 *Risk/Reward:* {rr}\n\
         ⚡ *Confidence:* {confidence}%\n\
         \n\
         📋 *Technical Analysis:*\n\
         • RSI: {rsi:.1}\n\
         • Volatility: {vol:.2}%\n\
         • Trend: {trend}\n\
         • Momentum: {momentum}\n\
         \n\
         💡 *Reason:* {reason}\n\
         📊 *Spread:* {spread:.5}\n\
         ⏰ *Time:* {time}\n\
         \n\
         *🔴 LIVE {label} DATA - Risk: {risk}% max*\n\
         \n\
         _Execute manually on Deriv platform_",
        name = signal.instrument_name,
        frequency = signal.frequency,
        direction = signal.direction,
        entry = signal.entry_price,
        sl = signal.stop_loss_price,
        tp = signal.take_profit_price,
        rr = signal.risk_reward_ratio,
        confidence = signal.confidence,
        rsi = t.rsi,
        vol = t.volatility_pct,
        trend = plain(t.trend.as_str()),
        momentum = plain(t.momentum.as_str()),
        reason = signal.reason(),
        spread = signal.spread_at_entry,
        time = signal.created_at.with_timezone(&Local).format("%H:%M:%S"),
        label = signal.family.label().to_uppercase(),
        risk = signal.risk_percent,
    )
}

pub fn render_test(instrument: &InstrumentSpec, current_price: f64, connected: bool) -> String {
    format!(
        "🤖 *TEST MESSAGE*\n\
         \n\
         ✅ Bot connected to LIVE Deriv data\n\
         📊 Current Index: {name}\n\
         ⚡ Update Frequency: {frequency}\n\
         💰 Current Price: {price:.5}\n\
         🔗 Connection: {connection}\n\
         \n\
         Ready to send real {label} trading signals!",
        name = instrument.display_name,
        frequency = instrument.nominal_frequency,
        price = current_price,
        connection = if connected { "LIVE" } else { "DISCONNECTED" },
        label = instrument.family.label(),
    )
}

pub fn render_connected(instrument: &InstrumentSpec) -> String {
    format!(
        "🟢 Bot connected to LIVE Deriv data!\n📊 Monitoring: {}\n⚡ Update frequency: {}",
        instrument.display_name, instrument.nominal_frequency
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market::catalog;
    use market::signal::types::{Momentum, SignalTechnicals, Trend};
    use market::types::{Direction, Family};

    fn sample_signal() -> Signal {
        let spec = catalog::default_instrument();
        Signal {
            id: 1,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            instrument_symbol: spec.symbol.into(),
            instrument_name: spec.display_name.into(),
            family: Family::HighFrequency,
            frequency: spec.nominal_frequency.into(),
            direction: Direction::Bullish,
            entry_price: 1234.5,
            stop_loss_price: 1134.5,
            take_profit_price: 1484.5,
            confidence: 95,
            risk_percent: 2.2,
            risk_reward_ratio: spec.risk_reward_ratio(),
            technicals: SignalTechnicals {
                rsi: 20.634,
                volatility_pct: 1.8412,
                sma5: 0.0,
                sma10: 0.0,
                sma20: 0.0,
                price_change_pct: 0.2,
                trend: Trend::StrongBullish,
                momentum: Momentum::Oversold,
            },
            reason_tags: vec!["Strong Trend Confirmed".into(), "High Volatility Breakout".into()],
            spread_at_entry: 0.4,
            market_time_at_entry: None,
        }
    }

    #[test]
    fn signal_message_fields() {
        let text = render_signal(&sample_signal());

        assert!(text.contains("*Direction:* BULLISH"));
        assert!(text.contains("*Entry:* 1234.50000"));
        assert!(text.contains("*Stop Loss:* 1134.50000"));
        assert!(text.contains("*Take Profit:* 1484.50000"));
        assert!(text.contains("*Risk/Reward:* 1:2.5"));
        assert!(text.contains("*Confidence:* 95%"));
        assert!(text.contains("• RSI: 20.6\n"));
        assert!(text.contains("• Volatility: 1.84%"));
        assert!(text.contains("• Trend: STRONG BULLISH"));
        assert!(text.contains("• Momentum: OVERSOLD"));
        assert!(text.contains("*Reason:* Strong Trend Confirmed + High Volatility Breakout"));
        assert!(text.contains("LIVE 1S DATA - Risk: 2.2% max"));
    }

    #[test]
    fn signal_message_has_balanced_markdown() {
        let text = render_signal(&sample_signal());
        assert_eq!(text.matches('*').count() % 2, 0);
        assert_eq!(text.matches('_').count(), 2);
    }

    #[test]
    fn test_message_reports_connection() {
        let spec = catalog::lookup(Family::Regular, 10).unwrap();

        let live = render_test(spec, 6123.456789, true);
        assert!(live.contains("Current Price: 6123.45679"));
        assert!(live.contains("Connection: LIVE"));
        assert!(live.contains("real regular trading signals"));

        let down = render_test(spec, 0.0, false);
        assert!(down.contains("Connection: DISCONNECTED"));
    }

    #[test]
    fn connected_announcement_names_instrument() {
        let spec = catalog::default_instrument();
        let text = render_connected(spec);
        assert!(text.contains(spec.display_name));
        assert!(text.contains("Update frequency: 1s"));
    }
}

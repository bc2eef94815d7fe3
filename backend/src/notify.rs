//! Best-effort signal notifications.
//!
//! Signals reach the dispatcher through a bounded queue filled by the
//! `MarketManager`. Each delivery is time-bounded. Failures are logged and
//! never retried; they do not touch market state or the signal log.

use std::sync::Arc;
use std::time::Duration;

use adapters::notifier::{Notifier, NotifierError};
use adapters::telegram::render::{render_connected, render_signal, render_test};
use market::signal::Signal;
use market::types::InstrumentSpec;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, instrument, warn};

use crate::logger::warn_if_slow;

pub struct NotificationService {
    notifier: Option<Arc<dyn Notifier>>,
    recipient: String,
    timeout: Duration,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, recipient: impl Into<String>, timeout: Duration) -> Self {
        Self {
            notifier: Some(notifier),
            recipient: recipient.into(),
            timeout,
        }
    }

    /// No notifier configured: every delivery fails with `NotConfigured`.
    pub fn disabled() -> Self {
        Self {
            notifier: None,
            recipient: String::new(),
            timeout: Duration::ZERO,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.notifier.is_some()
    }

    async fn deliver(&self, text: &str) -> Result<(), NotifierError> {
        let notifier = self.notifier.as_ref().ok_or(NotifierError::NotConfigured)?;

        let bounded = tokio::time::timeout(self.timeout, notifier.deliver(&self.recipient, text));
        match warn_if_slow("notify.deliver", self.timeout / 2, bounded).await {
            Ok(res) => res,
            Err(_) => Err(NotifierError::Timeout(self.timeout)),
        }
    }

    #[instrument(skip(self, signal), fields(id = signal.id, symbol = %signal.instrument_symbol))]
    pub async fn notify_signal(&self, signal: &Signal) {
        if !self.is_configured() {
            debug!("notifier disabled; signal not delivered");
            return;
        }
        match self.deliver(&render_signal(signal)).await {
            Ok(()) => info!("signal notification delivered"),
            Err(e) => warn!(error = %e, "signal notification failed"),
        }
    }

    /// Tell the recipient which instrument is being monitored after a (re)connect.
    pub async fn announce_connected(&self, instrument: &InstrumentSpec) {
        if !self.is_configured() {
            return;
        }
        if let Err(e) = self.deliver(&render_connected(instrument)).await {
            warn!(error = %e, symbol = %instrument.symbol, "connection announcement failed");
        }
    }

    /// Deliver a test message describing the current market snapshot.
    pub async fn send_test(
        &self,
        instrument: &InstrumentSpec,
        current_price: f64,
        connected: bool,
    ) -> Result<(), NotifierError> {
        self.deliver(&render_test(instrument, current_price, connected))
            .await
    }

    /// Drain the signal queue until every sender is gone.
    #[instrument(skip_all)]
    pub async fn run_dispatcher(self: Arc<Self>, mut signals: Receiver<Signal>) {
        info!(configured = self.is_configured(), "notification dispatcher started");
        while let Some(signal) = signals.recv().await {
            self.notify_signal(&signal).await;
        }
        info!("signal queue closed; dispatcher stopping");
    }
}

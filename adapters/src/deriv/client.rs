use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, instrument, trace, warn};

use super::connection::{ConnectionMachine, ReconnectPolicy};
use super::parser::{forget_all_request, parse_deriv_message, subscribe_request};
use super::types::{FeedCommand, FeedEvent};
use super::{FeedError, MarketFeed};

const COMMAND_CAPACITY: usize = 16;

/// Cloneable control handle for a running [`DerivFeedClient`].
#[derive(Clone, Debug)]
pub struct FeedHandle {
    commands: Sender<FeedCommand>,
}

#[async_trait]
impl MarketFeed for FeedHandle {
    async fn subscribe(&self, symbol: &str) -> Result<(), FeedError> {
        self.commands
            .send(FeedCommand::Subscribe(symbol.to_string()))
            .await
            .map_err(|_| FeedError::ChannelClosed)
    }

    async fn unsubscribe_all(&self) -> Result<(), FeedError> {
        self.commands
            .send(FeedCommand::UnsubscribeAll)
            .await
            .map_err(|_| FeedError::ChannelClosed)
    }

    /// False once the client has stopped for good.
    fn is_available(&self) -> bool {
        !self.commands.is_closed()
    }
}

enum SessionEnd {
    /// Socket closed or errored; reconnect.
    Closed,
    /// Every handle was dropped; stop.
    HandleDropped,
}

/// Websocket client for the Deriv tick stream.
///
/// Owns the connection and the reconnect policy. Subscriptions requested
/// while disconnected are held until the next connection, and every
/// (re)connect re-subscribes the last requested symbol.
pub struct DerivFeedClient {
    ws_url: String,
    policy: ReconnectPolicy,
    commands: Receiver<FeedCommand>,
    events: Sender<FeedEvent>,
}

impl DerivFeedClient {
    pub fn new(
        ws_url: impl Into<String>,
        policy: ReconnectPolicy,
        events: Sender<FeedEvent>,
    ) -> (Self, FeedHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let client = Self {
            ws_url: ws_url.into(),
            policy,
            commands: rx,
            events,
        };
        (client, FeedHandle { commands: tx })
    }

    /// Connect, stream and reconnect until retries are exhausted or every handle is dropped.
    #[instrument(skip(self), fields(url = %self.ws_url))]
    pub async fn run(mut self) -> Result<(), FeedError> {
        let mut machine = ConnectionMachine::new(self.policy);
        let mut desired: Option<String> = None;

        loop {
            machine.on_connecting();
            debug!("connecting to deriv websocket");

            match connect_async(self.ws_url.as_str()).await {
                Ok((ws, _)) => {
                    machine.on_connected();
                    info!("deriv websocket connected");
                    emit(&self.events, FeedEvent::Connected).await?;

                    match session(ws, &mut self.commands, &self.events, &mut desired).await {
                        Ok(SessionEnd::HandleDropped) => {
                            info!("feed handles dropped; stopping");
                            return Ok(());
                        }
                        Ok(SessionEnd::Closed) => {}
                        Err(FeedError::ChannelClosed) => return Err(FeedError::ChannelClosed),
                        Err(e) => error!(error = %e, "feed session failed"),
                    }

                    emit(&self.events, FeedEvent::Disconnected).await?;
                }
                Err(e) => error!(error = %e, "deriv websocket connection failed"),
            }

            match machine.on_lost() {
                Some(delay) => {
                    warn!(
                        attempt = machine.attempts(),
                        max_attempts = machine.policy().max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "reconnecting"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    error!(attempts = machine.attempts(), "reconnect attempts exhausted");
                    return Err(FeedError::RetriesExhausted {
                        attempts: machine.attempts(),
                    });
                }
            }
        }
    }
}

async fn emit(events: &Sender<FeedEvent>, event: FeedEvent) -> Result<(), FeedError> {
    events.send(event).await.map_err(|_| FeedError::ChannelClosed)
}

async fn send_json<W>(write: &mut W, payload: &Value) -> Result<(), FeedError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let text = serde_json::to_string(payload)?;
    debug!(payload = %text, "sending deriv request");
    write.send(Message::Text(text.into())).await?;
    Ok(())
}

/// Drop whatever is streaming, then subscribe to `symbol`.
async fn resubscribe<W>(write: &mut W, symbol: &str) -> Result<(), FeedError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    send_json(write, &forget_all_request()).await?;
    send_json(write, &subscribe_request(symbol)).await
}

/// Serve one live connection until it closes.
async fn session<S>(
    ws: S,
    commands: &mut Receiver<FeedCommand>,
    events: &Sender<FeedEvent>,
    desired: &mut Option<String>,
) -> Result<SessionEnd, FeedError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin,
{
    let (mut write, mut read) = ws.split();

    // commands that arrived while disconnected
    while let Ok(cmd) = commands.try_recv() {
        match cmd {
            FeedCommand::Subscribe(symbol) => *desired = Some(symbol),
            FeedCommand::UnsubscribeAll => *desired = None,
        }
    }

    let mut awaiting_ack = desired.clone();
    if let Some(symbol) = desired.as_deref() {
        resubscribe(&mut write, symbol).await?;
    }

    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                None => {
                    let _ = write.close().await;
                    return Ok(SessionEnd::HandleDropped);
                }
                Some(FeedCommand::Subscribe(symbol)) => {
                    resubscribe(&mut write, &symbol).await?;
                    awaiting_ack = Some(symbol.clone());
                    *desired = Some(symbol);
                }
                Some(FeedCommand::UnsubscribeAll) => {
                    send_json(&mut write, &forget_all_request()).await?;
                    awaiting_ack = None;
                    *desired = None;
                }
            },

            msg = read.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket stream error");
                        return Ok(SessionEnd::Closed);
                    }
                    None => return Ok(SessionEnd::Closed),
                };

                if msg.is_close() {
                    debug!("server closed the connection");
                    return Ok(SessionEnd::Closed);
                }
                if msg.is_ping() || msg.is_pong() {
                    trace!("keep-alive frame");
                    continue;
                }
                if !msg.is_text() {
                    debug!(msg_type = ?msg, "ignoring non-text frame");
                    continue;
                }

                let raw = match msg.to_text() {
                    Ok(t) => t,
                    Err(e) => {
                        error!(error = %e, "failed to read text frame");
                        continue;
                    }
                };
                trace!(raw_event = %raw, "received deriv message");

                match parse_deriv_message(raw) {
                    Ok(Some(FeedEvent::Tick(tick))) => {
                        if awaiting_ack.as_deref() == Some(tick.symbol.as_str()) {
                            info!(symbol = %tick.symbol, "subscription confirmed");
                            awaiting_ack = None;
                            emit(events, FeedEvent::Subscribed { symbol: tick.symbol.clone() }).await?;
                        }
                        emit(events, FeedEvent::Tick(tick)).await?;
                    }
                    Ok(Some(FeedEvent::Unsubscribed)) => {
                        debug!("forget_all acknowledged");
                        emit(events, FeedEvent::Unsubscribed).await?;
                    }
                    Ok(Some(ev)) => emit(events, ev).await?,
                    Ok(None) => trace!("non-actionable message"),
                    Err(e) => warn!(error = %e, raw = %raw, "failed to parse deriv message"),
                }
            }
        }
    }
}

//! Push channel over WebSocket
//!
//! | Path | Auth |
//! |------|------|
//! | /ws/orders/{id} | owner, admin, guest holding the id |
//! | /ws/admin | admin |
//!
//! Browsers cannot set headers on a WebSocket handshake, so a bearer token
//! may also be passed as `?token=<JWT>`.
//!
//! Server → client frames are JSON [`HubEvent`]s. The current status is sent
//! on connect and again whenever the subscriber lags behind the broadcast
//! buffer. Every status frame passes through a [`StageTracker`], so a client
//! never sees the same `(orderId, currentStage)` twice on one connection.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::message::{ADMIN_DASHBOARD_CHANNEL, order_channel};
use shared::{AppError, AppResult, HubEvent, OrderStatusEvent};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::auth::RequesterContext;
use crate::core::ServerState;
use crate::live::StageTracker;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Context used for dashboard snapshots after the admin check passed
const DASHBOARD_READER: RequesterContext = RequesterContext {
    user_id: None,
    is_admin: true,
};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/ws/orders/{id}", get(order_ws))
        .route("/ws/admin", get(admin_ws))
}

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    token: Option<String>,
}

/// Header context wins; otherwise fall back to the query token
fn resolve_context(
    state: &ServerState,
    header_ctx: RequesterContext,
    query: &WsAuthQuery,
) -> AppResult<RequesterContext> {
    match &query.token {
        Some(token) if header_ctx.is_guest() => {
            RequesterContext::from_token(state.jwt_service(), token)
        }
        _ => Ok(header_ctx),
    }
}

/// GET /ws/orders/{id} - live status of one order
pub async fn order_ws(
    State(state): State<ServerState>,
    header_ctx: RequesterContext,
    Path(order_id): Path<String>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let ctx = resolve_context(&state, header_ctx, &query)?;
    // access check before upgrading
    state.orders.order_status(&order_id, &ctx)?;

    let feed = Feed::Order { order_id, ctx };
    Ok(ws.on_upgrade(move |socket| run_session(socket, state, feed)))
}

/// GET /ws/admin - every order event
pub async fn admin_ws(
    State(state): State<ServerState>,
    header_ctx: RequesterContext,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let ctx = resolve_context(&state, header_ctx, &query)?;
    ctx.require_admin()?;

    Ok(ws.on_upgrade(move |socket| run_session(socket, state, Feed::Dashboard)))
}

/// Where a session's snapshots come from
enum Feed {
    Order {
        order_id: String,
        ctx: RequesterContext,
    },
    Dashboard,
}

impl Feed {
    fn channel(&self) -> String {
        match self {
            Feed::Order { order_id, .. } => order_channel(order_id),
            Feed::Dashboard => ADMIN_DASHBOARD_CHANNEL.to_string(),
        }
    }

    /// Current status of every order this feed covers
    fn snapshot(&self, state: &ServerState) -> Vec<OrderStatusEvent> {
        let result = match self {
            Feed::Order { order_id, ctx } => {
                state.orders.order_status(order_id, ctx).map(|s| vec![s])
            }
            Feed::Dashboard => state
                .orders
                .list_orders(&DASHBOARD_READER)
                .map(|orders| {
                    orders
                        .iter()
                        .filter(|o| !o.current_stage.is_terminal())
                        .map(OrderStatusEvent::from_order)
                        .collect()
                }),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "WS snapshot unavailable");
            Vec::new()
        })
    }
}

async fn run_session(socket: WebSocket, state: ServerState, feed: Feed) {
    let (mut sink, mut stream) = socket.split();
    let channel = feed.channel();
    tracing::info!(channel = %channel, "WS connected");

    // subscribe before the snapshot so no transition falls in between
    let mut hub_rx = state.hub.subscribe(&channel);
    let mut tracker = StageTracker::new();

    if send_snapshot(&mut sink, &mut tracker, feed.snapshot(&state))
        .await
        .is_ok()
    {
        let mut ping_interval = tokio::time::interval(PING_INTERVAL);
        ping_interval.tick().await; // skip immediate

        loop {
            tokio::select! {
                _ = ping_interval.tick() => {
                    if sink.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }

                event = hub_rx.recv() => {
                    match event {
                        Ok(event) => {
                            let fresh = match &event {
                                HubEvent::StatusChanged(status) => tracker.apply(status),
                                HubEvent::OrderCreated(_) => true,
                            };
                            if fresh && send_event(&mut sink, &event).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(channel = %channel, lagged = n, "WS subscriber lagged, resending snapshot");
                            hub_rx = state.hub.subscribe(&channel);
                            if send_snapshot(&mut sink, &mut tracker, feed.snapshot(&state))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }

                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(_)) => break,
                        // client frames carry no commands
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    drop(hub_rx);
    state.hub.release(&channel);
    tracing::info!(channel = %channel, "WS disconnected");
}

type WsSink = SplitSink<WebSocket, Message>;

async fn send_snapshot(
    sink: &mut WsSink,
    tracker: &mut StageTracker,
    statuses: Vec<OrderStatusEvent>,
) -> Result<(), axum::Error> {
    for status in statuses {
        if tracker.apply(&status) {
            send_event(sink, &HubEvent::StatusChanged(status)).await?;
        }
    }
    Ok(())
}

async fn send_event(sink: &mut WsSink, event: &HubEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => sink.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode hub event");
            Ok(())
        }
    }
}

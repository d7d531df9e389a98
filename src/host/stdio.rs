//! Newline-delimited JSON bridge between a host shell and the app state.
//!
//! Each input line is one `CommandEnvelope`; each output line is either a
//! `ResponseEnvelope` or an application event. Stdout carries nothing else,
//! so all diagnostics go through tracing to stderr and the log file.
//!
//! Commands that wait on the network or on an animation run as their own
//! tasks and answer when they finish. Everything else answers in input
//! order, so a slow `leaderboard.fetch` never holds back a `timer.stop`.

use crate::application::commands::{AppState, stop_timer_impl};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use crate::host::handler::dispatch;
use crate::infrastructure::error::InfraError;
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;

pub async fn run_stdio_bridge(state: Arc<AppState>) -> Result<(), InfraError> {
    let reader = BufReader::new(tokio::io::stdin());
    run_bridge(state, reader, tokio::io::stdout()).await?;
    Ok(())
}

/// Runs until the reader hits EOF or a `host.shutdown` command arrives, then
/// hands the writer back. On EOF, detached commands still in flight are
/// allowed to answer first; `host.shutdown` cancels them.
pub async fn run_bridge<R, W>(state: Arc<AppState>, mut reader: R, writer: W) -> Result<W, InfraError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let writer = Arc::new(Mutex::new(writer));

    let event_writer = Arc::clone(&writer);
    let mut events = state.subscribe_events();
    let forwarder = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(error) = write_json(&event_writer, &event).await {
                        tracing::warn!(error = %error, "failed to write event; stopping event forwarder");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event forwarder lagged; some events were dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut in_flight = JoinSet::new();
    let result = read_commands(&state, &mut reader, &writer, &mut in_flight).await;

    match &result {
        Ok(BridgeExit::InputClosed) => {
            while let Some(joined) = in_flight.join_next().await {
                if let Err(error) = joined {
                    tracing::warn!(error = %error, "detached host command did not finish");
                }
            }
        }
        Ok(BridgeExit::Shutdown) | Err(_) => in_flight.shutdown().await,
    }

    forwarder.abort();
    let _ = forwarder.await;
    result?;

    let writer = Arc::try_unwrap(writer)
        .map_err(|_| InfraError::Bridge("writer is still shared after shutdown".to_string()))?;
    Ok(writer.into_inner())
}

enum BridgeExit {
    InputClosed,
    Shutdown,
}

/// Commands whose handling waits on a remote store or a timed animation.
fn runs_detached(command: CommandName) -> bool {
    matches!(command, CommandName::WheelSpin | CommandName::LeaderboardFetch)
}

async fn read_commands<R, W>(
    state: &Arc<AppState>,
    reader: &mut R,
    writer: &Arc<Mutex<W>>,
    in_flight: &mut JoinSet<()>,
) -> Result<BridgeExit, InfraError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            tracing::info!("input closed; shutting down host bridge");
            return Ok(BridgeExit::InputClosed);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope = match serde_json::from_str::<CommandEnvelope>(trimmed) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(error = %error, raw_line = %trimmed, "failed to parse command envelope");
                let response =
                    ResponseEnvelope::error(None, format!("failed to parse command envelope: {error}"));
                write_json(writer, &response).await?;
                continue;
            }
        };

        if runs_detached(envelope.command) {
            let state = Arc::clone(state);
            let writer = Arc::clone(writer);
            in_flight.spawn(async move {
                let response = dispatch(&state, envelope).await;
                if let Err(error) = write_json(&writer, &response).await {
                    tracing::warn!(error = %error, "failed to write detached command response");
                }
            });
            continue;
        }

        let is_shutdown = envelope.command == CommandName::HostShutdown;
        let response = dispatch(state, envelope).await;
        write_json(writer, &response).await?;

        if is_shutdown {
            stop_timer_impl(state)?;
            tracing::info!("host.shutdown received; shutting down host bridge");
            return Ok(BridgeExit::Shutdown);
        }
    }
}

async fn write_json<W, T>(writer: &Mutex<W>, value: &T) -> Result<(), InfraError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    let mut writer = writer.lock().await;
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

//! # Termination Signals
//!
//! The controller consumes termination signals through the [`SignalSource`]
//! trait. [`OsSignals`] listens to the process via `tokio::signal`; tests
//! substitute [`ManualSignals`](crate::mock::ManualSignals).
//!
//! Panics count as a fault signal, but only when asked for: listing
//! [`Signal::Panic`] in the configuration (or using [`PanicSignals`]
//! directly) chains a forwarding hook onto the process panic hook. The
//! previous hook still runs first.
//!
//! A received signal only triggers a shutdown sweep. Exiting the process
//! stays the host's decision.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Signal {
    #[serde(rename = "SIGINT")]
    Interrupt,
    #[serde(rename = "SIGTERM")]
    Terminate,
    /// A panic anywhere in the process.
    #[serde(rename = "uncaughtException", alias = "panic")]
    Panic,
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Panic => "uncaughtException",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stream of termination signals.
#[async_trait]
pub trait SignalSource: Send + 'static {
    /// Waits for the next signal. `None` ends the listener.
    async fn recv(&mut self) -> Option<Signal>;
}

#[cfg(unix)]
type TerminateStream = tokio::signal::unix::Signal;
#[cfg(not(unix))]
type TerminateStream = ();

/// Process signals delivered through `tokio::signal`, plus panics when
/// [`Signal::Panic`] is requested.
///
/// Must be created from within a Tokio runtime.
pub struct OsSignals {
    interrupt: bool,
    terminate: Option<TerminateStream>,
    panics: Option<PanicSignals>,
}

impl OsSignals {
    pub fn new(signals: &[Signal]) -> Self {
        Self {
            interrupt: signals.contains(&Signal::Interrupt),
            terminate: if signals.contains(&Signal::Terminate) {
                register_terminate()
            } else {
                None
            },
            panics: signals.contains(&Signal::Panic).then(PanicSignals::install),
        }
    }
}

#[cfg(unix)]
fn register_terminate() -> Option<TerminateStream> {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!(error = %e, "Failed to register SIGTERM handler");
            None
        }
    }
}

#[cfg(not(unix))]
fn register_terminate() -> Option<TerminateStream> {
    None
}

#[cfg(unix)]
async fn terminated(stream: Option<&mut TerminateStream>) -> Option<()> {
    match stream {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(not(unix))]
async fn terminated(_: Option<&mut TerminateStream>) -> Option<()> {
    std::future::pending().await
}

async fn panicked(panics: Option<&mut PanicSignals>) -> Option<Signal> {
    match panics {
        Some(panics) => panics.recv().await,
        None => std::future::pending().await,
    }
}

#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        let interrupt = self.interrupt;
        tokio::select! {
            result = tokio::signal::ctrl_c(), if interrupt => match result {
                Ok(()) => Some(Signal::Interrupt),
                Err(e) => {
                    warn!(error = %e, "Failed to listen for SIGINT");
                    None
                }
            },
            Some(()) = terminated(self.terminate.as_mut()) => Some(Signal::Terminate),
            Some(signal) = panicked(self.panics.as_mut()) => Some(signal),
            else => None,
        }
    }
}

/// Forwards every panic in the process as [`Signal::Panic`].
pub struct PanicSignals {
    receiver: mpsc::UnboundedReceiver<Signal>,
}

impl PanicSignals {
    /// Chains a forwarding hook onto the current panic hook.
    ///
    /// The hook stays installed for the life of the process; once this
    /// source is dropped it only runs the previous hook.
    pub fn install() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            previous(info);
            let _ = sender.send(Signal::Panic);
        }));
        Self { receiver }
    }
}

#[async_trait]
impl SignalSource for PanicSignals {
    async fn recv(&mut self) -> Option<Signal> {
        self.receiver.recv().await
    }
}

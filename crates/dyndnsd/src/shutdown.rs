//! Signal escalation for the daemon
//!
//! SIGINT and SIGTERM share one counter. The first delivery asks the
//! scheduler to stop after the running cycle, the second is only logged,
//! the third exits the process immediately.

use tokio::sync::oneshot;
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// What to do after a shutdown signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownAction {
    /// Stop scheduling, let the in-flight cycle finish
    Graceful,
    /// Already shutting down
    Ignore,
    /// Exit now
    Force,
}

/// Counts signal deliveries and maps them to actions
#[derive(Debug, Default)]
pub struct SignalCounter {
    received: usize,
}

impl SignalCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one delivery
    pub fn record(&mut self) -> ShutdownAction {
        self.received += 1;
        match self.received {
            1 => ShutdownAction::Graceful,
            2 => ShutdownAction::Ignore,
            _ => ShutdownAction::Force,
        }
    }

    pub fn received(&self) -> usize {
        self.received
    }
}

/// Installed signal handlers
///
/// Installing is the only fallible step, so the daemon can refuse to start
/// without them.
pub struct Signals {
    #[cfg(unix)]
    sigterm: Signal,
    #[cfg(unix)]
    sigint: Signal,
}

impl Signals {
    /// Register SIGTERM and SIGINT handlers
    #[cfg(unix)]
    pub fn install() -> anyhow::Result<Self> {
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

        Ok(Self { sigterm, sigint })
    }

    /// Ctrl-C is registered lazily on non-Unix platforms
    #[cfg(not(unix))]
    pub fn install() -> anyhow::Result<Self> {
        Ok(Self {})
    }

    /// Listen for signals until forced out
    ///
    /// `shutdown_tx` fires on the first signal. It is never dropped
    /// unsent, since the scheduler treats a closed channel as shutdown.
    pub async fn listen(mut self, shutdown_tx: oneshot::Sender<()>) {
        let mut shutdown_tx = Some(shutdown_tx);
        let mut counter = SignalCounter::new();

        while let Some(name) = self.next().await {
            escalate(&mut counter, &mut shutdown_tx, name);
        }

        error!("Signal stream closed, graceful shutdown is no longer available");
        std::future::pending::<()>().await;
    }

    #[cfg(unix)]
    async fn next(&mut self) -> Option<&'static str> {
        tokio::select! {
            received = self.sigterm.recv() => received.map(|()| "SIGTERM"),
            received = self.sigint.recv() => received.map(|()| "SIGINT"),
        }
    }

    #[cfg(not(unix))]
    async fn next(&mut self) -> Option<&'static str> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some("CTRL-C"),
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                None
            }
        }
    }
}

fn escalate(
    counter: &mut SignalCounter,
    shutdown_tx: &mut Option<oneshot::Sender<()>>,
    name: &str,
) {
    match counter.record() {
        ShutdownAction::Graceful => {
            info!("Received {}, finishing current cycle and shutting down", name);
            if let Some(tx) = shutdown_tx.take() {
                // Receiver gone means the scheduler already stopped.
                let _ = tx.send(());
            }
        }
        ShutdownAction::Ignore => {
            warn!("Received {} again, send once more to force exit", name);
        }
        ShutdownAction::Force => {
            warn!(
                "Received {} {} times, exiting immediately",
                name,
                counter.received()
            );
            std::process::exit(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalates_on_third_signal() {
        let mut counter = SignalCounter::new();

        assert_eq!(counter.record(), ShutdownAction::Graceful);
        assert_eq!(counter.record(), ShutdownAction::Ignore);
        assert_eq!(counter.record(), ShutdownAction::Force);
        assert_eq!(counter.record(), ShutdownAction::Force);
        assert_eq!(counter.received(), 4);
    }

    #[tokio::test]
    async fn first_signal_fires_shutdown_once() {
        let (tx, rx) = oneshot::channel();
        let mut shutdown_tx = Some(tx);
        let mut counter = SignalCounter::new();

        escalate(&mut counter, &mut shutdown_tx, "SIGINT");
        assert!(shutdown_tx.is_none());
        assert!(rx.await.is_ok());

        escalate(&mut counter, &mut shutdown_tx, "SIGTERM");
        assert_eq!(counter.received(), 2);
    }

    #[tokio::test]
    async fn listener_holds_shutdown_open_without_signals() {
        let signals = Signals::install().unwrap();
        let (tx, mut rx) = oneshot::channel();

        let listener = tokio::spawn(signals.listen(tx));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(matches!(
            rx.try_recv(),
            Err(oneshot::error::TryRecvError::Empty)
        ));
        assert!(!listener.is_finished());
        listener.abort();
    }
}

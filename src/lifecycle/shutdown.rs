//! Shutdown coordination for the gateway.
//!
//! The trigger is level-based: a [`ShutdownSignal`] taken after
//! [`Shutdown::trigger`] resolves immediately.

use tokio::sync::watch;

/// Owner side of the shutdown flag.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A signal the server can wait on.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Waiting side of the shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once the flag is set or the owner is dropped.
    pub async fn triggered(mut self) {
        // Err means the sender is gone, which is as final as a trigger.
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }

    /// Resolves on Ctrl+C or on the flag, whichever comes first.
    pub async fn wait(self) {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = ctrl_c => tracing::info!("Shutdown signal received"),
            _ = self.triggered() => tracing::info!("Shutdown triggered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_resolves_signal() {
        let shutdown = Shutdown::new();
        let waiter = tokio::spawn(shutdown.subscribe().wait());

        shutdown.trigger();
        assert!(shutdown.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("shutdown signal did not resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn late_subscriber_sees_earlier_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), shutdown.subscribe().triggered())
            .await
            .expect("late subscriber missed the trigger");
    }

    #[tokio::test]
    async fn dropping_owner_releases_waiters() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), signal.triggered())
            .await
            .expect("waiter not released");
    }
}

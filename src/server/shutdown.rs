//! Signal-driven termination of the accept loop.
//!
//! Two pieces of state are shared between the signal listener and the
//! accept loop: a stop flag carried by a `watch` channel, and a flag that
//! records whether the loop is currently parked in `accept`. A signal that
//! arrives while the loop is parked cancels the accept right away. A signal
//! that arrives mid-exchange only raises the stop flag; the exchange runs to
//! completion and the loop exits at its next iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// What a shutdown request does to the accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// The loop was idle in `accept` and stops now.
    Immediate,
    /// An exchange is in flight and is allowed to finish first.
    AfterExchange,
}

#[derive(Debug, Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    stop: watch::Sender<bool>,
    accepting: AtomicBool,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                stop,
                accepting: AtomicBool::new(false),
            }),
        }
    }

    /// False once shutdown has been requested.
    pub fn is_running(&self) -> bool {
        !*self.inner.stop.borrow()
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.inner.accepting.store(accepting, Ordering::SeqCst);
    }

    pub fn is_accepting(&self) -> bool {
        self.inner.accepting.load(Ordering::SeqCst)
    }

    /// Requests shutdown and reports how the accept loop will react.
    pub fn trigger(&self) -> ShutdownMode {
        self.inner.stop.send_replace(true);

        if self.is_accepting() {
            ShutdownMode::Immediate
        } else {
            ShutdownMode::AfterExchange
        }
    }

    /// Resolves once shutdown has been requested, immediately if it
    /// already has been.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.stop.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Installed SIGINT/SIGTERM handlers that feed a [`Shutdown`].
pub struct SignalListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl SignalListener {
    /// Registers the handlers. Must be called from inside the runtime.
    pub fn install() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Forwards every received signal to `shutdown`. Never returns on its
    /// own; run it as a background task.
    pub async fn run(mut self, shutdown: Shutdown) {
        loop {
            let signal = self.next().await;

            match shutdown.trigger() {
                ShutdownMode::Immediate => {
                    tracing::info!(signal, "Signal received while idle, stopping");
                }
                ShutdownMode::AfterExchange => {
                    tracing::info!(signal, "Signal received, finishing current exchange");
                }
            }
        }
    }

    #[cfg(unix)]
    async fn next(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    async fn next(&mut self) -> &'static str {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        "Ctrl-C"
    }
}

//! # Connectivity Signal
//!
//! Tracks the device's online/offline state and broadcasts transitions.
//!
//! ## Signal Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Connectivity Transitions                            │
//! │                                                                         │
//! │  Platform network monitor ──► Connectivity::set_online() / set_offline()│
//! │                                        │                                │
//! │                                        │ watch channel                  │
//! │                 ┌──────────────────────┼──────────────────────┐         │
//! │                 ▼                      ▼                      ▼         │
//! │          command path           sync worker              status query   │
//! │          (push or skip)      (reconnect → flush          (is_online)    │
//! │                               then pull)                                │
//! │                                                                         │
//! │  The core never probes the network itself. Whoever embeds it feeds     │
//! │  transitions in, exactly one source of truth per process.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::watch;
use tracing::info;

// =============================================================================
// Connection State
// =============================================================================

/// Connectivity state of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Remote store reachable; pushes and pulls may be attempted.
    Online,
    /// No connectivity; all mutations stay local until reconnect.
    Offline,
}

impl ConnectionState {
    /// True when the device is online.
    #[inline]
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionState::Online)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Online => write!(f, "online"),
            ConnectionState::Offline => write!(f, "offline"),
        }
    }
}

// =============================================================================
// Connectivity Handle
// =============================================================================

/// Shared connectivity signal.
///
/// Cheap to clone; all clones observe the same state. The embedder calls
/// [`set_online`](Connectivity::set_online) / [`set_offline`](Connectivity::set_offline)
/// from its platform network monitor; the sync worker subscribes to react
/// to transitions.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: watch::Sender<ConnectionState>,
}

impl Connectivity {
    /// Creates a connectivity signal with the given initial state.
    pub fn new(initial: ConnectionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Connectivity { tx }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// True when the device is online.
    pub fn is_online(&self) -> bool {
        self.state().is_online()
    }

    /// Marks the device online. Returns true if this was a transition.
    pub fn set_online(&self) -> bool {
        self.set(ConnectionState::Online)
    }

    /// Marks the device offline. Returns true if this was a transition.
    pub fn set_offline(&self) -> bool {
        self.set(ConnectionState::Offline)
    }

    /// Sets the state, reporting whether it changed.
    pub fn set(&self, state: ConnectionState) -> bool {
        let previous = self.tx.send_replace(state);
        let changed = previous != state;
        if changed {
            info!(from = %previous, to = %state, "Connectivity changed");
        }
        changed
    }

    /// Subscribes to state transitions.
    ///
    /// The receiver sees the current value immediately and every change
    /// afterwards.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }
}

impl Default for Connectivity {
    /// Starts offline. The embedder reports the real state once its network
    /// monitor has one; starting pessimistic avoids a push into the void.
    fn default() -> Self {
        Connectivity::new(ConnectionState::Offline)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

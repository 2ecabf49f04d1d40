//! Credential gate
//!
//! Holds the catalog access key. Searching and playback stay disabled while
//! the gate is closed and re-enable as soon as a key is set; interested tasks
//! follow the gate through [`CredentialWatch`].

use crate::error::{CoreError, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Shared holder of the catalog credential
///
/// Cloning is cheap and every clone observes the same credential.
#[derive(Debug, Clone)]
pub struct CredentialGate {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl CredentialGate {
    /// Create a closed gate
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Create a gate that is open with the given key
    ///
    /// A blank key leaves the gate closed.
    pub fn with_credential(key: impl Into<String>) -> Self {
        let gate = Self::new();
        let _ = gate.set_credential(key);
        gate
    }

    /// Whether a usable credential is present
    pub fn has_credential(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Current credential, if any
    pub fn credential(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Store a credential and open the gate
    pub fn set_credential(&self, key: impl Into<String>) -> Result<()> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(CoreError::InvalidCredential(
                "credential cannot be empty".into(),
            ));
        }

        let changed = self.tx.send_if_modified(|current| {
            if current.as_deref() == Some(key.as_str()) {
                false
            } else {
                *current = Some(key);
                true
            }
        });

        if changed {
            info!("Credential set");
        }
        Ok(())
    }

    /// Remove the credential and close the gate
    pub fn clear(&self) {
        let changed = self.tx.send_if_modified(|current| current.take().is_some());
        if changed {
            info!("Credential removed");
        }
    }

    /// Follow gate changes
    pub fn watch(&self) -> CredentialWatch {
        CredentialWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CredentialGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver side of a [`CredentialGate`]
#[derive(Debug, Clone)]
pub struct CredentialWatch {
    rx: watch::Receiver<Option<String>>,
}

impl CredentialWatch {
    /// Wait for the gate to change
    ///
    /// Resolves to the new open/closed state, or `None` once every gate
    /// handle has been dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        match self.rx.changed().await {
            Ok(()) => {
                let open = self.rx.borrow_and_update().is_some();
                debug!(open, "Credential gate changed");
                Some(open)
            }
            Err(_) => None,
        }
    }

    /// Whether the gate is currently open
    pub fn is_open(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_gate_is_closed() {
        let gate = CredentialGate::new();
        assert!(!gate.has_credential());
        assert!(gate.credential().is_none());
    }

    #[test]
    fn blank_credential_rejected() {
        let gate = CredentialGate::new();
        assert!(matches!(
            gate.set_credential("   "),
            Err(CoreError::InvalidCredential(_))
        ));
        assert!(!gate.has_credential());

        let gate = CredentialGate::with_credential("");
        assert!(!gate.has_credential());
    }

    #[test]
    fn credential_is_trimmed_and_shared_between_clones() {
        let gate = CredentialGate::new();
        let other = gate.clone();

        gate.set_credential("  key-123 ").unwrap();
        assert_eq!(other.credential().as_deref(), Some("key-123"));

        other.clear();
        assert!(!gate.has_credential());
    }

    #[tokio::test]
    async fn watch_reports_open_and_close() {
        let gate = CredentialGate::new();
        let mut watch = gate.watch();
        assert!(!watch.is_open());

        gate.set_credential("key").unwrap();
        assert_eq!(watch.changed().await, Some(true));

        gate.clear();
        assert_eq!(watch.changed().await, Some(false));
    }

    #[tokio::test]
    async fn setting_same_key_does_not_notify() {
        let gate = CredentialGate::with_credential("key");
        let mut watch = gate.watch();

        gate.set_credential("key").unwrap();
        let pending =
            tokio::time::timeout(std::time::Duration::from_millis(20), watch.changed()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn watch_ends_when_gate_dropped() {
        let gate = CredentialGate::new();
        let mut watch = gate.watch();
        drop(gate);

        assert_eq!(watch.changed().await, None);
    }
}

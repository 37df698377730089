//! Session-expiry signal between the HTTP client and the session owner.
//!
//! The sender is latched: after it fires, further notifications are dropped
//! until a new session re-arms it, so any number of concurrent 401 responses
//! produce exactly one signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

/// Delivered once per expired session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExpired;

/// Creates a connected, armed sender/receiver pair.
pub fn expiry_channel() -> (ExpirySender, ExpiryReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sender = ExpirySender {
        tx,
        armed: Arc::new(AtomicBool::new(true)),
    };
    (sender, ExpiryReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct ExpirySender {
    tx: mpsc::UnboundedSender<SessionExpired>,
    armed: Arc<AtomicBool>,
}

impl ExpirySender {
    /// Fires the signal if armed. Returns whether this call delivered it.
    pub fn notify(&self) -> bool {
        if !self.armed.swap(false, Ordering::AcqRel) {
            return false;
        }
        // A dropped receiver means nobody owns the session any more.
        self.tx.send(SessionExpired).is_ok()
    }

    /// Re-arms the latch after a new session is adopted.
    pub fn rearm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct ExpiryReceiver {
    rx: mpsc::UnboundedReceiver<SessionExpired>,
}

impl ExpiryReceiver {
    /// Non-blocking poll.
    pub fn try_recv(&mut self) -> Option<SessionExpired> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next signal; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<SessionExpired> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_delivers_once_until_rearmed() {
        let (tx, mut rx) = expiry_channel();

        assert!(tx.notify());
        assert!(!tx.notify());
        assert!(!tx.clone().notify());
        assert_eq!(rx.try_recv(), Some(SessionExpired));
        assert_eq!(rx.try_recv(), None);

        tx.rearm();
        assert!(tx.is_armed());
        assert!(tx.notify());
        assert_eq!(rx.try_recv(), Some(SessionExpired));
    }

    #[tokio::test]
    async fn test_concurrent_notifications_coalesce() {
        let (tx, mut rx) = expiry_channel();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let tx = tx.clone();
                tokio::spawn(async move { tx.notify() })
            })
            .collect();

        let mut delivered = 0;
        for handle in handles {
            if handle.await.unwrap() {
                delivered += 1;
            }
        }

        assert_eq!(delivered, 1);
        assert_eq!(rx.try_recv(), Some(SessionExpired));
        assert_eq!(rx.try_recv(), None);
    }
}

//! Outbound notifications for concierge.
//!
//! A [`Notifier`] delivers a point-to-point text message over some external
//! channel. [`WhatsAppNotifier`] is the WhatsApp Cloud API implementation.

pub mod error;
pub mod whatsapp;

pub use error::NotifyError;
pub use whatsapp::{DEFAULT_API_BASE, WhatsAppConfig, WhatsAppNotifier};

use async_trait::async_trait;

/// Sends a text message to an address.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text` to `address`, returning whether delivery was accepted.
    ///
    /// Failures are logged, not returned.
    async fn send(&self, address: &str, text: &str) -> bool;
}

//! Vendor notification port
//!
//! Panel vendors are told when a respondent leaves (complete or not) and
//! when a survey's job status changes. Neither may hold up the protocol.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from vendor notifications
#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Vendor endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Timeout")]
    Timeout,
}

/// Outbound notifications to the panel vendor
#[async_trait]
pub trait VendorNotifier: Send + Sync {
    /// Fire the redirect beacon without waiting for it.
    ///
    /// Implementations must return immediately; delivery failures are only
    /// logged.
    fn fire_redirect(&self, share_token: &str, completed: bool);

    /// Update the vendor's job status for a survey
    async fn update_job_status(
        &self,
        vendor_id: &str,
        survey_id: &str,
        status_code: u32,
    ) -> Result<(), BeaconError>;
}

/// Notifier for surveys without a vendor
pub struct NoVendorNotifier;

#[async_trait]
impl VendorNotifier for NoVendorNotifier {
    fn fire_redirect(&self, _share_token: &str, _completed: bool) {}

    async fn update_job_status(
        &self,
        _vendor_id: &str,
        _survey_id: &str,
        _status_code: u32,
    ) -> Result<(), BeaconError> {
        Ok(())
    }
}

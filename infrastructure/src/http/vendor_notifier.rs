//! Panel-vendor callbacks over HTTP

use super::client::ApiClient;
use super::dto::StatusUpdate;
use async_trait::async_trait;
use quota_gate_application::{BeaconError, VendorNotifier};
use tokio::runtime::Handle;
use tracing::{debug, warn};

pub struct HttpVendorNotifier {
    client: ApiClient,
}

impl HttpVendorNotifier {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VendorNotifier for HttpVendorNotifier {
    /// `GET vendors/redirect?shareTokenId=..&isCompleted=..`, detached.
    ///
    /// Needs a running tokio runtime; without one the beacon is dropped.
    fn fire_redirect(&self, share_token: &str, completed: bool) {
        let mut url = match self.client.endpoint(&["vendors", "redirect"]) {
            Ok(url) => url,
            Err(e) => {
                warn!("Redirect beacon not sent: {}", e);
                return;
            }
        };
        url.query_pairs_mut()
            .append_pair("shareTokenId", share_token)
            .append_pair("isCompleted", if completed { "true" } else { "false" });

        let Ok(handle) = Handle::try_current() else {
            warn!("Redirect beacon not sent: no async runtime");
            return;
        };
        let client = self.client.clone();
        handle.spawn(async move {
            match client.get(url).await {
                Ok(()) => debug!("Redirect beacon delivered (completed={})", completed),
                Err(e) => warn!("Redirect beacon failed: {}", e),
            }
        });
    }

    async fn update_job_status(
        &self,
        vendor_id: &str,
        survey_id: &str,
        status_code: u32,
    ) -> Result<(), BeaconError> {
        let url = self
            .client
            .endpoint(&["vendors", vendor_id, "surveys", survey_id, "status"])?;
        self.client
            .put(url, &StatusUpdate { status_code })
            .await?;
        Ok(())
    }
}

// Client device endpoints

use tracing::debug;

use crate::client::MeshClient;
use crate::error::Error;
use crate::models::RawDevice;

impl MeshClient {
    /// List every device the network knows about, connected or not.
    ///
    /// `GET /networks/{id}/devices`
    pub async fn list_devices(&self, network_id: &str) -> Result<Vec<RawDevice>, Error> {
        let url = self.network_url(network_id, "devices")?;
        debug!(network_id, "listing devices");
        self.get(network_id, url).await
    }
}

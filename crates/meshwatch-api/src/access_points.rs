// Access point endpoints
//
// The controller calls its mesh nodes "eeros"; the path keeps that name.

use tracing::debug;

use crate::client::MeshClient;
use crate::error::Error;
use crate::models::RawAccessPoint;

impl MeshClient {
    /// List the mesh access points of a network.
    ///
    /// `GET /networks/{id}/eeros`
    pub async fn list_access_points(&self, network_id: &str) -> Result<Vec<RawAccessPoint>, Error> {
        let url = self.network_url(network_id, "eeros")?;
        debug!(network_id, "listing access points");
        self.get(network_id, url).await
    }
}

// Device session seam.
//
// The engine talks to the device through this trait so tests can run
// against a scripted double. `XapiClient` is the production
// implementation.

use std::future::Future;
use std::time::Duration;

use pansync_xapi::XapiClient;

use crate::xpath::Xpath;

/// One authenticated session against a device's configuration API.
///
/// Implementor obligations: `read` returns the inner XML of the result
/// (empty when the node is absent, never an error for absence);
/// mutations return Ok only after the device acknowledged them;
/// `commit(true, ..)` returns once the commit job reaches a terminal
/// state.
pub trait DeviceSession: Send + Sync {
    /// Read the node at `xpath`, returning the result's inner XML.
    fn read(
        &self,
        xpath: &Xpath,
    ) -> impl Future<Output = Result<String, pansync_xapi::Error>> + Send;

    /// Create the node at `xpath`, or replace it wholesale.
    fn create_or_replace(
        &self,
        xpath: &Xpath,
        element: &str,
    ) -> impl Future<Output = Result<(), pansync_xapi::Error>> + Send;

    /// Merge `element` into the node at `xpath` without disturbing
    /// existing siblings.
    fn merge_insert(
        &self,
        xpath: &Xpath,
        element: &str,
    ) -> impl Future<Output = Result<(), pansync_xapi::Error>> + Send;

    /// Delete the node at `xpath`.
    fn delete(&self, xpath: &Xpath) -> impl Future<Output = Result<(), pansync_xapi::Error>> + Send;

    /// Commit the candidate configuration, optionally waiting for the
    /// commit job to finish.
    fn commit(
        &self,
        sync: bool,
        poll_interval: Duration,
    ) -> impl Future<Output = Result<(), pansync_xapi::Error>> + Send;
}

impl DeviceSession for XapiClient {
    async fn read(&self, xpath: &Xpath) -> Result<String, pansync_xapi::Error> {
        self.get_config(xpath.as_str()).await
    }

    async fn create_or_replace(
        &self,
        xpath: &Xpath,
        element: &str,
    ) -> Result<(), pansync_xapi::Error> {
        self.edit_config(xpath.as_str(), element).await
    }

    async fn merge_insert(&self, xpath: &Xpath, element: &str) -> Result<(), pansync_xapi::Error> {
        self.set_config(xpath.as_str(), element).await
    }

    async fn delete(&self, xpath: &Xpath) -> Result<(), pansync_xapi::Error> {
        self.delete_config(xpath.as_str()).await
    }

    async fn commit(&self, sync: bool, poll_interval: Duration) -> Result<(), pansync_xapi::Error> {
        XapiClient::commit(self, sync, poll_interval).await?;
        Ok(())
    }
}

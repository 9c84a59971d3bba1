use serde::de::DeserializeOwned;

use super::*;

impl StreamerApiClient {
    /// Execute a GET request and decode the JSON body.
    pub(super) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

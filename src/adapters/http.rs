use crate::domain::model::{ParticipantEmail, UnregisterResponse};
use crate::domain::ports::{SettingsProvider, UnregisterApi};
use crate::utils::error::Result;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const UNREGISTER_PATH: &str = "unregister";
pub const EMAIL_QUERY_PARAM: &str = "email";

/// Same character set `encodeURIComponent` leaves untouched.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `DELETE {base}/unregister?email=<encoded>` over reqwest.
#[derive(Debug, Clone)]
pub struct HttpUnregisterApi {
    client: Client,
    base_url: Url,
}

impl HttpUnregisterApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // join() drops the last path segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_settings<C: SettingsProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.base_url(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn endpoint_for(&self, email: &ParticipantEmail) -> Result<Url> {
        let mut url = self.base_url.join(UNREGISTER_PATH)?;
        let encoded = utf8_percent_encode(email.as_ref(), URI_COMPONENT);
        url.set_query(Some(&format!("{}={}", EMAIL_QUERY_PARAM, encoded)));
        Ok(url)
    }
}

#[async_trait]
impl UnregisterApi for HttpUnregisterApi {
    async fn unregister(&self, email: &ParticipantEmail) -> Result<UnregisterResponse> {
        let url = self.endpoint_for(email)?;
        tracing::debug!("Making API request: DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        // 4xx bodies carry `detail` instead of `success`; parse them the same way
        let body = response.text().await?;
        let parsed: UnregisterResponse = serde_json::from_str(&body)?;

        if !status.is_success() && parsed.success {
            tracing::warn!(
                "Server reported success with HTTP status {}, trusting the body",
                status
            );
        }

        Ok(parsed)
    }
}

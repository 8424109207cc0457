use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::{Provider, missing_credentials, settle};
use crate::config::{ConfigSource, keys};
use crate::social::channel::SocialChannel;
use crate::social::types::ChannelResult;

/// Instagram business-account posting via a long-lived user token.
pub struct InstagramProvider {
    config: Arc<dyn ConfigSource>,
}

struct UserCredentials {
    user_id: String,
    access_token: String,
}

impl InstagramProvider {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }

    fn credentials(&self) -> Option<UserCredentials> {
        Some(UserCredentials {
            access_token: self.config.non_empty(keys::IG_LONG_LIVED_ACCESS_TOKEN)?,
            user_id: self.config.non_empty(keys::IG_USER_ID)?,
        })
    }

    /// Stand-in for the container-create + `media_publish` pair.
    async fn publish(
        &self,
        creds: &UserCredentials,
        text: Option<&str>,
        media_urls: &[String],
    ) -> Result<String> {
        tracing::info!(
            channel = "instagram",
            user_id = %creds.user_id,
            token_len = creds.access_token.len(),
            has_caption = text.is_some(),
            media = media_urls.len(),
            "posting to Instagram"
        );
        Ok(format!("ig_media_{}", uuid::Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl Provider for InstagramProvider {
    fn channel(&self) -> SocialChannel {
        SocialChannel::Instagram
    }

    async fn post(&self, text: Option<&str>, media_urls: &[String]) -> ChannelResult {
        let Some(creds) = self.credentials() else {
            return missing_credentials(SocialChannel::Instagram);
        };
        settle(
            SocialChannel::Instagram,
            self.publish(&creds, text, media_urls).await,
        )
    }
}

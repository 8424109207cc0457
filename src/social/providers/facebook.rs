use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::{Provider, missing_credentials, settle};
use crate::config::{ConfigSource, keys};
use crate::social::channel::SocialChannel;
use crate::social::types::ChannelResult;

/// Facebook Page posting.
///
/// Credentials are looked up on every call so that rotating the page
/// token does not need a restart.
pub struct FacebookProvider {
    config: Arc<dyn ConfigSource>,
}

struct PageCredentials {
    page_id: String,
    access_token: String,
}

impl FacebookProvider {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }

    fn credentials(&self) -> Option<PageCredentials> {
        Some(PageCredentials {
            access_token: self.config.non_empty(keys::FACEBOOK_PAGE_ACCESS_TOKEN)?,
            page_id: self.config.non_empty(keys::FACEBOOK_PAGE_ID)?,
        })
    }

    /// Stand-in for the Graph API `/{page-id}/feed` call.
    async fn publish(
        &self,
        creds: &PageCredentials,
        text: Option<&str>,
        media_urls: &[String],
    ) -> Result<String> {
        tracing::info!(
            channel = "facebook",
            page_id = %creds.page_id,
            token_len = creds.access_token.len(),
            has_text = text.is_some(),
            media = media_urls.len(),
            "posting to Facebook"
        );
        Ok(format!("fb_post_{}", uuid::Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl Provider for FacebookProvider {
    fn channel(&self) -> SocialChannel {
        SocialChannel::Facebook
    }

    async fn post(&self, text: Option<&str>, media_urls: &[String]) -> ChannelResult {
        let Some(creds) = self.credentials() else {
            return missing_credentials(SocialChannel::Facebook);
        };
        settle(
            SocialChannel::Facebook,
            self.publish(&creds, text, media_urls).await,
        )
    }
}

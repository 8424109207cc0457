use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::channel::SocialChannel;

/// A request to publish one post to several channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,

    /// Raw channel names. Unknown names are dropped during resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl PostRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_channels(mut self, channels: &[&str]) -> Self {
        self.channels = Some(channels.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_media(mut self, urls: &[&str]) -> Self {
        self.media_urls = Some(urls.iter().map(|u| u.to_string()).collect());
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// True if there is something to publish: non-blank text or at least
    /// one media URL.
    pub fn has_content(&self) -> bool {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_media = self.media_urls.as_ref().is_some_and(|m| !m.is_empty());
        has_text || has_media
    }

    pub fn media(&self) -> &[String] {
        self.media_urls.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Success,
    Failed,
}

/// What one provider adapter reports for one post. Failures are data,
/// not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResult {
    pub channel: SocialChannel,
    pub status: ChannelStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ChannelResult {
    pub fn success(channel: SocialChannel, external_id: impl Into<String>) -> Self {
        Self {
            channel,
            status: ChannelStatus::Success,
            external_id: Some(external_id.into()),
            error_code: None,
            error_message: None,
        }
    }

    pub fn failed(
        channel: SocialChannel,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            status: ChannelStatus::Failed,
            external_id: None,
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ChannelStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl OverallStatus {
    /// Summarize per-channel outcomes. Order independent; an empty set
    /// counts as failed.
    pub fn aggregate<'a>(results: impl IntoIterator<Item = &'a ChannelResult>) -> Self {
        let (mut succeeded, mut failed) = (0usize, 0usize);
        for result in results {
            match result.status {
                ChannelStatus::Success => succeeded += 1,
                ChannelStatus::Failed => failed += 1,
            }
        }
        match (succeeded, failed) {
            (0, _) => OverallStatus::Failed,
            (_, 0) => OverallStatus::Success,
            _ => OverallStatus::PartialSuccess,
        }
    }
}

/// The aggregate answer to one [`PostRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub overall_status: OverallStatus,
    pub results: BTreeMap<SocialChannel, ChannelResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl PostResponse {
    /// The pre-fan-out rejection: nothing attempted, nothing stored.
    pub fn rejected() -> Self {
        Self {
            overall_status: OverallStatus::Failed,
            results: BTreeMap::new(),
            correlation_id: None,
        }
    }

    pub fn from_results(results: Vec<ChannelResult>, correlation_id: Option<String>) -> Self {
        let results: BTreeMap<_, _> = results.into_iter().map(|r| (r.channel, r)).collect();
        Self {
            overall_status: OverallStatus::aggregate(results.values()),
            results,
            correlation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(channel: SocialChannel) -> ChannelResult {
        ChannelResult::success(channel, "id")
    }

    fn err(channel: SocialChannel) -> ChannelResult {
        ChannelResult::failed(channel, "AUTH", "nope")
    }

    #[test]
    fn aggregate_empty_is_failed() {
        assert_eq!(OverallStatus::aggregate([]), OverallStatus::Failed);
    }

    #[test]
    fn aggregate_all_success() {
        let results = [ok(SocialChannel::Facebook), ok(SocialChannel::Instagram)];
        assert_eq!(OverallStatus::aggregate(&results), OverallStatus::Success);
    }

    #[test]
    fn aggregate_mixed_is_partial_in_any_order() {
        let a = [ok(SocialChannel::Facebook), err(SocialChannel::Instagram)];
        let b = [err(SocialChannel::Instagram), ok(SocialChannel::Facebook)];
        assert_eq!(OverallStatus::aggregate(&a), OverallStatus::PartialSuccess);
        assert_eq!(OverallStatus::aggregate(&b), OverallStatus::PartialSuccess);
    }

    #[test]
    fn aggregate_all_failed() {
        let results = [err(SocialChannel::Facebook), err(SocialChannel::Instagram)];
        assert_eq!(OverallStatus::aggregate(&results), OverallStatus::Failed);
    }

    #[test]
    fn has_content_requires_text_or_media() {
        assert!(!PostRequest::default().has_content());
        assert!(!PostRequest::text("   ").has_content());
        assert!(PostRequest::text("hi").has_content());
        assert!(PostRequest::default().with_media(&["https://x.io/a.png"]).has_content());
        assert!(!PostRequest::default().with_media(&[]).has_content());
    }

    #[test]
    fn response_serializes_with_wire_names() {
        let response = PostResponse::from_results(
            vec![ok(SocialChannel::Facebook), err(SocialChannel::Instagram)],
            Some("k1".to_string()),
        );
        let v = serde_json::to_value(&response).unwrap();
        assert_eq!(v["overallStatus"], "partial_success");
        assert_eq!(v["correlationId"], "k1");
        assert_eq!(v["results"]["FACEBOOK"]["status"], "success");
        assert_eq!(v["results"]["FACEBOOK"]["externalId"], "id");
        assert_eq!(v["results"]["INSTAGRAM"]["errorCode"], "AUTH");
        assert!(v["results"]["FACEBOOK"].get("errorCode").is_none());
    }

    #[test]
    fn rejected_response_omits_correlation_id() {
        let v = serde_json::to_value(PostResponse::rejected()).unwrap();
        assert_eq!(v, serde_json::json!({"overallStatus": "failed", "results": {}}));
    }

    #[test]
    fn request_parses_camel_case() {
        let req: PostRequest = serde_json::from_str(
            r#"{"text":"hi","mediaUrls":["https://a.b/c.png"],"channels":["FACEBOOK"],"idempotencyKey":"k","metadata":{"campaign":"x"}}"#,
        )
        .unwrap();
        assert_eq!(req.text.as_deref(), Some("hi"));
        assert_eq!(req.media().len(), 1);
        assert_eq!(req.channels.unwrap(), vec!["FACEBOOK"]);
        assert_eq!(req.idempotency_key.as_deref(), Some("k"));
        assert_eq!(req.metadata.unwrap()["campaign"], "x");
    }
}

//! Mastodon platform implementation
//!
//! Uses the megalodon library, so any instance speaking the Mastodon API
//! (Mastodon, Pleroma, Akkoma, GoToSocial) works.

use async_trait::async_trait;
use megalodon::megalodon::{GetAccountStatusesInputOptions, PostStatusOutput};
use megalodon::{Megalodon, SNS};
use scraper::{Html, Node};
use tracing::debug;

use crate::config::Config;
use crate::error::{ConfigError, FetchError, PlatformError, Result};
use crate::platforms::Platform;
use crate::types::HistoryEntry;

/// Default status length limit of a stock Mastodon instance
pub const DEFAULT_CHARACTER_LIMIT: usize = 500;

/// Largest page `GET /api/v1/accounts/:id/statuses` will return
pub const MAX_STATUSES_PER_PAGE: u32 = 40;

/// Mastodon platform client
pub struct MastodonClient {
    /// The megalodon client for API interactions
    client: Box<dyn Megalodon + Send + Sync>,

    /// The instance URL (e.g., "https://mastodon.social")
    instance_url: String,

    character_limit: usize,
}

impl MastodonClient {
    /// Create a new Mastodon client
    ///
    /// # Arguments
    ///
    /// * `instance_url` - The base URL of the Mastodon instance (e.g., "https://mastodon.social")
    /// * `access_token` - OAuth access token for authentication
    pub fn new(instance_url: String, access_token: String) -> Result<Self> {
        let client = megalodon::generator(
            SNS::Mastodon,
            instance_url.clone(),
            Some(access_token),
            Some(format!("feedcast/{}", env!("CARGO_PKG_VERSION"))),
        )
        .map_err(construction_error)?;

        Ok(Self {
            client,
            instance_url,
            character_limit: DEFAULT_CHARACTER_LIMIT,
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.instance_url.clone(),
            config.credentials.access_token().to_string(),
        )
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn validate_content(&self, content: &str) -> Result<()> {
        let char_count = content.chars().count();

        if char_count > self.character_limit {
            return Err(PlatformError::Validation(format!(
                "Content exceeds Mastodon's {} character limit (current: {} characters)",
                self.character_limit, char_count
            ))
            .into());
        }

        if content.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        Ok(())
    }
}

#[async_trait]
impl Platform for MastodonClient {
    fn name(&self) -> &str {
        "mastodon"
    }

    async fn fetch_recent_posts(&self, account: &str, limit: u32) -> Result<Vec<HistoryEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let acct = self
            .client
            .lookup_account(account.trim_start_matches('@').to_string())
            .await
            .map_err(|e| FetchError::History(map_megalodon_error(e, "lookup account")))?
            .json;

        let mut entries = Vec::new();
        let mut max_id: Option<String> = None;

        while let Some(page_limit) = next_page_limit(entries.len(), limit) {
            let options = GetAccountStatusesInputOptions {
                limit: Some(page_limit),
                max_id: max_id.clone(),
                ..Default::default()
            };

            let statuses = self
                .client
                .get_account_statuses(acct.id.clone(), Some(&options))
                .await
                .map_err(|e| FetchError::History(map_megalodon_error(e, "list statuses")))?
                .json;

            let fetched = statuses.len();
            max_id = statuses.last().map(|status| status.id.clone());
            entries.extend(
                statuses
                    .into_iter()
                    .map(|status| history_entry(status.plain_content, &status.content)),
            );

            // a short page means the account has no older posts
            if fetched < page_limit as usize || max_id.is_none() {
                break;
            }
        }

        entries.truncate(limit as usize);
        debug!("Fetched {} recent posts for {}", entries.len(), account);
        Ok(entries)
    }

    async fn publish(&self, text: &str) -> Result<String> {
        self.validate_content(text)?;

        let response = self
            .client
            .post_status(text.to_string(), None)
            .await
            .map_err(|e| map_megalodon_error(e, "post status"))?;

        let post_id = match response.json {
            PostStatusOutput::Status(status) => status.id,
            PostStatusOutput::ScheduledStatus(scheduled) => scheduled.id,
        };

        Ok(post_id)
    }
}

/// A client that cannot be built means the instance settings are unusable
fn construction_error<E: std::fmt::Debug>(error: E) -> ConfigError {
    ConfigError::Platform(format!(
        "Failed to create Mastodon client (check INSTANCE_URL): {:?}",
        error
    ))
}

/// Size of the next status page, or `None` once `limit` entries are in hand
fn next_page_limit(fetched: usize, limit: u32) -> Option<u32> {
    let remaining = (limit as usize).saturating_sub(fetched);
    if remaining == 0 {
        None
    } else {
        Some(remaining.min(MAX_STATUSES_PER_PAGE as usize) as u32)
    }
}

/// Build a history entry from a status
///
/// Mastodon only sends HTML `content`; the text a user sees (entities
/// decoded, markup dropped) is what titles are matched against.
fn history_entry(plain_content: Option<String>, content: &str) -> HistoryEntry {
    HistoryEntry::new(plain_content.unwrap_or_else(|| html_to_text(content)))
}

/// Visible text of a status body. `<br>` and paragraph starts become newlines.
fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(element) if element.name() == "br" => text.push('\n'),
            Node::Element(element) if element.name() == "p" && !text.is_empty() => {
                text.push('\n')
            }
            _ => {}
        }
    }

    text
}

/// Map megalodon errors to PlatformError
///
/// - HTTP 401/403 → `PlatformError::Authentication`
/// - HTTP 422 → `PlatformError::Validation`
/// - HTTP 429 → `PlatformError::RateLimit`
/// - HTTP 5xx and anything unrecognised → `PlatformError::Network`
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> PlatformError {
    classify_error(&error.to_string(), context)
}

fn classify_error(error_str: &str, context: &str) -> PlatformError {
    let error_lower = error_str.to_lowercase();

    match extract_http_status(error_str) {
        Some(401) | Some(403) => PlatformError::Authentication(format!(
            "Mastodon authentication failed ({}): {}. \
                Suggestion: Verify API_ACCESS_KEY is a valid access token for INSTANCE_URL.",
            context, error_str
        )),
        Some(404) => PlatformError::Posting(format!(
            "Mastodon resource not found ({}): {}. \
                Suggestion: Check ACCOUNT_IDENTIFIER exists on this instance.",
            context, error_str
        )),
        Some(422) => PlatformError::Validation(format!(
            "Mastodon validation failed ({}): {}",
            context, error_str
        )),
        Some(429) => PlatformError::RateLimit(format!(
            "Mastodon rate limit exceeded ({}): {}",
            context, error_str
        )),
        Some(500..=599) => PlatformError::Network(format!(
            "Mastodon server error ({}): {}",
            context, error_str
        )),
        Some(_) => {
            PlatformError::Network(format!("Mastodon HTTP error ({}): {}", context, error_str))
        }
        None => {
            if error_lower.contains("unauthorized") || error_lower.contains("forbidden") {
                PlatformError::Authentication(format!(
                    "Mastodon authentication failed ({}): {}",
                    context, error_str
                ))
            } else if error_lower.contains("rate limit") || error_lower.contains("too many requests")
            {
                PlatformError::RateLimit(format!(
                    "Mastodon rate limit exceeded ({}): {}",
                    context, error_str
                ))
            } else {
                PlatformError::Network(format!("Mastodon error ({}): {}", context, error_str))
            }
        }
    }
}

/// Extract HTTP status code from error message
///
/// Looks for patterns like "HTTP 401", "status 403" or a standalone "401:".
fn extract_http_status(error_str: &str) -> Option<u16> {
    let prefixes = ["HTTP ", "status ", "code: ", "status_code: "];

    for prefix in &prefixes {
        if let Some(pos) = error_str.find(prefix) {
            let after_prefix = &error_str[pos + prefix.len()..];
            if let Some(code) = after_prefix.get(0..3).and_then(|s| s.parse::<u16>().ok()) {
                if (100..=599).contains(&code) {
                    return Some(code);
                }
            }
        }
    }

    let bytes = error_str.as_bytes();
    for (i, window) in bytes.windows(4).enumerate() {
        if window[..3].iter().all(u8::is_ascii_digit) && (window[3] == b':' || window[3] == b' ') {
            // not part of a longer number
            if i > 0 && bytes[i - 1].is_ascii_digit() {
                continue;
            }
            let code = std::str::from_utf8(&window[..3])
                .ok()
                .and_then(|s| s.parse::<u16>().ok());
            if let Some(code) = code.filter(|c| (100..=599).contains(c)) {
                return Some(code);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MastodonClient {
        MastodonClient::new("https://mastodon.social".to_string(), "test-token".to_string())
            .expect("Failed to create client")
    }

    #[test]
    fn test_mastodon_client_creation() {
        let client = client();
        assert_eq!(client.name(), "mastodon");
        assert_eq!(client.instance_url(), "https://mastodon.social");
    }

    #[test]
    fn test_validate_content_within_limit() {
        assert!(client().validate_content("Hello: #rust  https://x - TBO").is_ok());
    }

    #[test]
    fn test_validate_content_exceeds_limit() {
        let content = "a".repeat(DEFAULT_CHARACTER_LIMIT + 1);
        let err = client().validate_content(&content).unwrap_err();
        assert!(err.to_string().contains("500 character limit"));
    }

    #[test]
    fn test_validate_content_counts_chars_not_bytes() {
        let content = "é".repeat(DEFAULT_CHARACTER_LIMIT);
        assert!(client().validate_content(&content).is_ok());
    }

    #[test]
    fn test_validate_content_whitespace_only() {
        assert!(client().validate_content("   ").is_err());
    }

    #[tokio::test]
    async fn test_fetch_recent_posts_zero_limit_skips_network() {
        let history = client().fetch_recent_posts("kainlite", 0).await.unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_entry_decodes_status_html() {
        let content = "<p>Let&#39;s learn Rust &amp; Go: \
            <a href=\"https://mastodon.social/tags/rust\" class=\"mention hashtag\" rel=\"tag\">#<span>rust</span></a> \
            <a href=\"https://x/b\" rel=\"nofollow noopener\"><span class=\"invisible\">https://</span><span class=\"\">x/b</span></a> - TBO</p>";

        let entry = history_entry(None, content);
        assert_eq!(entry.text, "Let's learn Rust & Go: #rust https://x/b - TBO");

        let candidate = crate::types::Candidate::new("b", "Let's learn Rust & Go", "https://x/b", &["rust"]);
        let check = crate::selector::DuplicateCheck::new(vec![entry]);
        assert!(check.is_duplicate(&candidate));
    }

    #[test]
    fn test_history_entry_prefers_plain_content() {
        let entry = history_entry(Some("plain <text>".to_string()), "<p>ignored</p>");
        assert_eq!(entry.text, "plain <text>");
    }

    #[test]
    fn test_html_to_text_line_breaks() {
        assert_eq!(html_to_text("<p>one<br>two</p><p>three</p>"), "one\ntwo\nthree");
        assert_eq!(html_to_text("&lt;tag&gt; &quot;q&quot;"), "<tag> \"q\"");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_next_page_limit_pages_past_server_cap() {
        assert_eq!(next_page_limit(0, 100), Some(40));
        assert_eq!(next_page_limit(40, 100), Some(40));
        assert_eq!(next_page_limit(80, 100), Some(20));
        assert_eq!(next_page_limit(100, 100), None);
        assert_eq!(next_page_limit(0, 15), Some(15));
        assert_eq!(next_page_limit(0, 0), None);
    }

    #[test]
    fn test_construction_error_is_config_error() {
        let err: crate::error::FeedcastError = construction_error("invalid base url").into();
        assert!(matches!(
            err,
            crate::error::FeedcastError::Config(ConfigError::Platform(_))
        ));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("INSTANCE_URL"));
    }

    #[test]
    fn test_extract_http_status_with_prefixes() {
        assert_eq!(extract_http_status("HTTP 401 Unauthorized"), Some(401));
        assert_eq!(extract_http_status("request failed with status 429"), Some(429));
        assert_eq!(extract_http_status("code: 503"), Some(503));
    }

    #[test]
    fn test_extract_http_status_standalone() {
        assert_eq!(extract_http_status("422: Validation failed"), Some(422));
        assert_eq!(extract_http_status("error 1404: nope"), None);
        assert_eq!(extract_http_status("connection reset"), None);
    }

    #[test]
    fn test_classify_error() {
        assert!(matches!(
            classify_error("HTTP 401 Unauthorized", "post status"),
            PlatformError::Authentication(_)
        ));
        assert!(matches!(
            classify_error("HTTP 422 Unprocessable", "post status"),
            PlatformError::Validation(_)
        ));
        assert!(matches!(
            classify_error("HTTP 429", "post status"),
            PlatformError::RateLimit(_)
        ));
        assert!(matches!(
            classify_error("HTTP 502 Bad Gateway", "list statuses"),
            PlatformError::Network(_)
        ));
        assert!(matches!(
            classify_error("operation timed out", "post status"),
            PlatformError::Network(_)
        ));
    }

    #[test]
    fn test_classify_error_keeps_context() {
        let err = classify_error("HTTP 404 Not Found", "lookup account");
        let message = err.to_string();
        assert!(message.contains("lookup account"));
        assert!(message.contains("ACCOUNT_IDENTIFIER"));
    }
}

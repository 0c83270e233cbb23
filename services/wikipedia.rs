/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Wikipedia article fetcher.
//!
//! An article is assembled from two REST endpoints fetched concurrently:
//! `page/summary/{title}` (JSON, mandatory) and `page/html/{title}` (parsoid
//! HTML, best-effort). A failed summary sinks the whole fetch; a failed HTML
//! fetch degrades to an article with no outbound links and the `"General"`
//! category. Nothing in this module panics or propagates errors past
//! [`ArticleFetcher::fetch_article`]; failures are logged and mapped to
//! `None`.

use log::warn;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

use crate::graph::ArticleData;

/// Wikipedia REST API, used when no proxy base is configured.
pub const DEFAULT_API_BASE: &str = "https://en.wikipedia.org/api/rest_v1";

const USER_AGENT: &str = "WikiGraphExplorer/0.1 (graph explorer; rust)";

/// Upper bound on extracted outbound links per article.
const MAX_LINKS: usize = 20;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("invalid api base or title: {0}")]
    InvalidUrl(String),
}

/// Relevant subset of the `page/summary` response.
#[derive(Debug, serde::Deserialize)]
struct PageSummary {
    title: String,
    #[serde(default)]
    extract: String,
    content_urls: ContentUrls,
}

#[derive(Debug, serde::Deserialize)]
struct ContentUrls {
    desktop: DesktopUrls,
}

#[derive(Debug, serde::Deserialize)]
struct DesktopUrls {
    page: String,
}

/// Fetches and assembles articles from the Wikipedia REST API.
pub struct ArticleFetcher {
    client: reqwest::Client,
    api_base: Url,
}

impl ArticleFetcher {
    /// Fetcher against the public REST API.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base(DEFAULT_API_BASE)
    }

    /// Fetcher against an alternate base, typically the local proxy.
    pub fn with_base(api_base: &str) -> Result<Self, FetchError> {
        let api_base =
            Url::parse(api_base).map_err(|_| FetchError::InvalidUrl(api_base.to_string()))?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, api_base })
    }

    /// Fetch an article by bare title or full `en.wikipedia.org/wiki/` URL.
    pub async fn fetch_article(&self, url_or_title: &str) -> Option<ArticleData> {
        let title = if url_or_title.starts_with("http") {
            match parse_wikipedia_url(url_or_title) {
                Some(title) => title,
                None => {
                    warn!("fetch: not a wikipedia article url: {url_or_title}");
                    return None;
                }
            }
        } else {
            url_or_title.to_string()
        };

        let (summary, html) = tokio::join!(self.fetch_summary(&title), self.fetch_html(&title));

        let summary = match summary {
            Ok(summary) => summary,
            Err(err) => {
                warn!("fetch: summary failed for \"{title}\": {err}");
                return None;
            }
        };

        let (links, category) = match html {
            Ok(html) => (extract_internal_links(&html), extract_category(&html)),
            Err(err) => {
                warn!("fetch: html failed for \"{title}\", degrading: {err}");
                (Vec::new(), "General".to_string())
            }
        };

        Some(ArticleData {
            title: summary.title,
            summary: summary.extract,
            url: summary.content_urls.desktop.page,
            category,
            links,
            popularity: 0.0,
            last_edited: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
        })
    }

    async fn fetch_summary(&self, title: &str) -> Result<PageSummary, FetchError> {
        let url = self.endpoint_url(&["page", "summary"], title)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: "page/summary",
                status,
            });
        }
        Ok(response.json().await?)
    }

    async fn fetch_html(&self, title: &str) -> Result<String, FetchError> {
        let url = self.endpoint_url(&["page", "html"], title)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: "page/html",
                status,
            });
        }
        Ok(response.text().await?)
    }

    /// `{api_base}/{segments...}/{title}` with the title percent-encoded as
    /// one path segment.
    fn endpoint_url(&self, segments: &[&str], title: &str) -> Result<Url, FetchError> {
        let mut url = self.api_base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.api_base.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
            path.push(title);
        }
        Ok(url)
    }
}

/// Accepts `http(s)://[<2-3 letter lang>.]wikipedia.org/wiki/...`.
pub fn is_valid_wikipedia_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host_ok = host == "wikipedia.org"
        || host.strip_suffix(".wikipedia.org").is_some_and(|lang| {
            (2..=3).contains(&lang.len()) && lang.bytes().all(|b| b.is_ascii_lowercase())
        });
    host_ok && parsed.path().starts_with("/wiki/")
}

/// Extract the article title out of an `en.wikipedia.org/wiki/` URL.
pub fn parse_wikipedia_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if parsed.host_str() != Some("en.wikipedia.org") {
        return None;
    }
    let mut segments = parsed.path_segments()?;
    if segments.next() != Some("wiki") {
        return None;
    }
    let title = segments.next()?;
    if title.is_empty() {
        return None;
    }
    Some(percent_decode(title))
}

/// Decode %XX escapes; malformed escapes pass through untouched.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// First [`MAX_LINKS`] distinct `/wiki/<title>` hrefs, skipping namespaced
/// pages (`:` in the title) and fragment links.
pub fn extract_internal_links(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(r#"a[href^="/wiki/"]"#) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let mut links: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        if links.len() >= MAX_LINKS {
            break;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(rest) = href.strip_prefix("/wiki/") else {
            continue;
        };
        if rest.is_empty() || rest.contains(':') || rest.contains('#') {
            continue;
        }
        let title = percent_decode(rest);
        if !links.contains(&title) {
            links.push(title);
        }
    }
    links
}

/// Category of an article page: an explicit category link when present,
/// otherwise a keyword guess from the page title.
pub fn extract_category(html: &str) -> String {
    let document = Html::parse_document(html);

    if let Ok(selector) = Selector::parse(".mw-category-group a, .category a") {
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect();
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }

    let title = Selector::parse("h1")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|h1| h1.text().collect::<String>())
        })
        .unwrap_or_default()
        .to_lowercase();

    if title.contains("war") || title.contains("battle") {
        return "History".to_string();
    }
    if title.contains("science") || title.contains("physics") {
        return "Science".to_string();
    }
    if title.contains("person") || title.contains("born") {
        return "People".to_string();
    }
    if title.contains("city") || title.contains("country") {
        return "Geography".to_string();
    }
    "General".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_wikipedia_urls() {
        assert!(is_valid_wikipedia_url("https://en.wikipedia.org/wiki/Rust"));
        assert!(is_valid_wikipedia_url("http://de.wikipedia.org/wiki/Rost"));
        assert!(!is_valid_wikipedia_url("https://simple.wikipedia.org/wiki/Rust"));
        assert!(is_valid_wikipedia_url("https://wikipedia.org/wiki/Rust"));
    }

    #[test]
    fn test_invalid_wikipedia_urls() {
        assert!(!is_valid_wikipedia_url("https://en.wikipedia.org/w/index.php"));
        assert!(!is_valid_wikipedia_url("https://example.com/wiki/Rust"));
        assert!(!is_valid_wikipedia_url("ftp://en.wikipedia.org/wiki/Rust"));
        assert!(!is_valid_wikipedia_url("not a url"));
        assert!(!is_valid_wikipedia_url("https://evil-wikipedia.org/wiki/Rust"));
    }

    #[test]
    fn test_parse_wikipedia_url() {
        assert_eq!(
            parse_wikipedia_url("https://en.wikipedia.org/wiki/Graph_theory"),
            Some("Graph_theory".to_string())
        );
        assert_eq!(
            parse_wikipedia_url("https://en.wikipedia.org/wiki/C%2B%2B"),
            Some("C++".to_string())
        );
        assert_eq!(parse_wikipedia_url("https://de.wikipedia.org/wiki/Rost"), None);
        assert_eq!(parse_wikipedia_url("https://en.wikipedia.org/about"), None);
        assert_eq!(parse_wikipedia_url("https://en.wikipedia.org/wiki/"), None);
    }

    #[test]
    fn test_percent_decode_passes_malformed_escapes_through() {
        assert_eq!(percent_decode("A%2GB"), "A%2GB");
        assert_eq!(percent_decode("trailing%2"), "trailing%2");
        assert_eq!(percent_decode("100%"), "100%");
    }

    #[test]
    fn test_extract_internal_links() {
        let html = r##"
            <html><body>
              <a href="/wiki/Graph_theory">graph theory</a>
              <a href="/wiki/Category:Mathematics">category</a>
              <a href="/wiki/Rust#History">fragment</a>
              <a href="/wiki/Graph_theory">duplicate</a>
              <a href="https://example.com/wiki/External">external</a>
              <a href="/wiki/Leonhard_Euler">euler</a>
            </body></html>
        "##;
        assert_eq!(
            extract_internal_links(html),
            vec!["Graph_theory".to_string(), "Leonhard_Euler".to_string()]
        );
    }

    #[test]
    fn test_extract_internal_links_caps_at_twenty() {
        let mut html = String::from("<html><body>");
        for i in 0..30 {
            html.push_str(&format!("<a href=\"/wiki/Article_{i}\">a</a>"));
        }
        html.push_str("</body></html>");
        assert_eq!(extract_internal_links(&html).len(), 20);
    }

    #[test]
    fn test_extract_internal_links_decodes_titles() {
        let html = r##"<a href="/wiki/C%2B%2B">c++</a>"##;
        assert_eq!(extract_internal_links(html), vec!["C++".to_string()]);
    }

    #[test]
    fn test_extract_category_prefers_explicit_links() {
        let html = r#"
            <html><body>
              <h1>Battle of Hastings</h1>
              <div class="mw-category-group"><a>Medieval battles</a></div>
            </body></html>
        "#;
        assert_eq!(extract_category(html), "Medieval battles");
    }

    #[test]
    fn test_extract_category_title_heuristics() {
        assert_eq!(extract_category("<h1>Battle of Hastings</h1>"), "History");
        assert_eq!(extract_category("<h1>Physics</h1>"), "Science");
        assert_eq!(extract_category("<h1>Persons of interest</h1>"), "People");
        assert_eq!(extract_category("<h1>City of London</h1>"), "Geography");
        assert_eq!(extract_category("<h1>Rust (programming language)</h1>"), "General");
        assert_eq!(extract_category(""), "General");
    }

    #[test]
    fn test_endpoint_url_encodes_title_as_one_segment() {
        let fetcher = ArticleFetcher::with_base("https://en.wikipedia.org/api/rest_v1").unwrap();
        let url = fetcher.endpoint_url(&["page", "summary"], "C++ (disambiguation)").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/C++%20(disambiguation)"
        );
    }
}

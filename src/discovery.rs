use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;

/// Results linking back to the search provider itself are noise.
const PROVIDER_DOMAIN: &str = "brave.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
}

/// Queries the web-search provider and normalizes the raw results into an
/// ordered candidate source list.
///
/// A provider failure is fatal for the request; there is no partial
/// discovery.
pub async fn discover_sources(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
    page_limit: usize,
) -> Result<Vec<SearchResult>, ApiError> {
    let url = format!(
        "{}?q={}&count={}",
        base_url,
        urlencoding::encode(query),
        page_limit
    );

    let response = client
        .get(url)
        .header("X-Subscription-Token", api_key)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(ApiError::upstream)?;

    if !response.status().is_success() {
        return Err(ApiError::Upstream(format!(
            "search failed: {}",
            response.status()
        )));
    }

    let payload: Value = response.json().await.map_err(ApiError::upstream)?;
    let items = payload
        .get("web")
        .and_then(|w| w.get("results"))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(normalize_results(&items, page_limit))
}

/// Drops entries without a usable title and link, drops self-referential
/// provider links, truncates to `page_limit`. Provider order is preserved.
pub fn normalize_results(items: &[Value], page_limit: usize) -> Vec<SearchResult> {
    items
        .iter()
        .filter_map(|item| {
            let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let link = item
                .get("url")
                .or_else(|| item.get("link"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            if title.is_empty() || link.is_empty() || link.contains(PROVIDER_DOMAIN) {
                return None;
            }
            Some(SearchResult {
                title: title.to_string(),
                link: link.to_string(),
            })
        })
        .take(page_limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(title: &str, url: &str) -> Value {
        json!({ "title": title, "url": url })
    }

    #[test]
    fn drops_entries_missing_title_or_link() {
        let items = vec![
            entry("", "https://example.com/a"),
            json!({ "title": "No link" }),
            entry("Kept", "https://example.com/b"),
        ];

        let results = normalize_results(&items, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Kept");
    }

    #[test]
    fn drops_provider_domain_links_and_truncates() {
        let items = vec![
            entry("Cafe guide", "https://example.com/coffee-boston"),
            entry("Brave result page", "https://search.brave.com/coffee"),
            entry("Roasters", "https://example.com/roasters"),
            entry("Best espresso", "https://example.org/espresso"),
            entry("Neighborhood picks", "https://example.net/picks"),
        ];

        let results = normalize_results(&items, 4);
        assert!(results.len() <= 4);
        assert!(results.iter().all(|r| !r.link.contains("brave.com")));
    }

    #[test]
    fn preserves_provider_order() {
        let items = vec![
            entry("First", "https://example.com/1"),
            entry("Second", "https://example.com/2"),
            entry("Third", "https://example.com/3"),
        ];

        let results = normalize_results(&items, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link, "https://example.com/1");
        assert_eq!(results[1].link, "https://example.com/2");
    }

    #[test]
    fn accepts_link_field_alias() {
        let items = vec![json!({ "title": "Alias", "link": "https://example.com/alias" })];

        let results = normalize_results(&items, 4);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].link, "https://example.com/alias");
    }
}

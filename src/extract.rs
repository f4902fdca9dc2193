use reqwest::Client;
use scraper::{Html, Selector};

/// Elements whose text never belongs in extracted page content.
const EXCLUDED_TAGS: [&str; 7] = ["script", "style", "head", "nav", "footer", "iframe", "img"];

/// Fetches one page and reduces it to normalized plain text.
///
/// Any fetch failure (network error, non-success status, undecodable body)
/// is a soft miss: the page contributes an empty string and the request
/// carries on without it.
pub async fn fetch_page_text(client: &Client, link: &str) -> String {
    let response = match client.get(link).send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!("Failed to fetch {}: {}", link, err);
            return String::new();
        }
    };

    if !response.status().is_success() {
        tracing::debug!("Skipping {}: status {}", link, response.status());
        return String::new();
    }

    match response.text().await {
        Ok(html) => extract_main_content(&html),
        Err(err) => {
            tracing::warn!("Failed to read body of {}: {}", link, err);
            String::new()
        }
    }
}

/// Strips non-content elements, keeps body text only, and collapses all
/// whitespace runs to single spaces.
pub fn extract_main_content(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").expect("body selector");
    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut pieces: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let excluded = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |element| EXCLUDED_TAGS.contains(&element.name()))
        });
        if !excluded {
            pieces.push(text);
        }
    }

    normalize_whitespace(&pieces.join(" "))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

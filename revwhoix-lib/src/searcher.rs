//! Reverse WHOIS search: availability probe and paginated fetch.
//!
//! This module provides the `ReverseWhoisSearcher`, which drives the
//! reverse WHOIS API one request at a time.

use crate::credentials::ApiKey;
use crate::error::RevWhoixError;
use crate::protocols::{ReverseWhoisClient, SearchTransport};
use crate::types::{SearchConfig, SearchMode, SearchRequest, SearchResponse};
use crate::utils::validate_keyword;
use std::ops::ControlFlow;

/// Runs reverse WHOIS searches for one API key.
///
/// The searcher handles:
/// - The preview query that tells whether any domains match
/// - The purchase query, following pagination cursors page by page
/// - Bounding pagination so a misbehaving API cannot loop forever
///
/// # Example
///
/// ```rust,no_run
/// use revwhoix_lib::{load_credential, default_credential_path, ReverseWhoisSearcher, SearchConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let api_key = load_credential(default_credential_path())?;
///     let searcher = ReverseWhoisSearcher::new(api_key, SearchConfig::default())?;
///
///     if searcher.probe("Acme Corp").await? {
///         let domains = searcher.fetch("Acme Corp", |d| println!("{}", d)).await?;
///         println!("{} domains", domains.len());
///     }
///     Ok(())
/// }
/// ```
pub struct ReverseWhoisSearcher<T = ReverseWhoisClient> {
    /// Search settings (page threshold, page bound, punycode...)
    config: SearchConfig,
    /// Key sent with every request
    api_key: ApiKey,
    /// Delivers requests to the API
    transport: T,
}

impl ReverseWhoisSearcher<ReverseWhoisClient> {
    /// Create a searcher that talks to the configured HTTP endpoint.
    pub fn new(api_key: ApiKey, config: SearchConfig) -> Result<Self, RevWhoixError> {
        let transport = ReverseWhoisClient::with_config(&config)?;
        Ok(Self::with_transport(api_key, config, transport))
    }
}

impl<T: SearchTransport> ReverseWhoisSearcher<T> {
    /// Create a searcher over an arbitrary transport.
    pub fn with_transport(api_key: ApiKey, config: SearchConfig, transport: T) -> Self {
        Self {
            config,
            api_key,
            transport,
        }
    }

    /// Ask the API how many domains match `keyword`, without fetching them.
    pub async fn preview_count(&self, keyword: &str) -> Result<u64, RevWhoixError> {
        let keyword = validate_keyword(keyword)?;
        let request = self.request(keyword, SearchMode::Preview);

        let response = self.transport.send(&request).await?;
        tracing::info!(keyword, count = response.domains_count, "preview complete");
        Ok(response.domains_count)
    }

    /// Whether any domain matches `keyword`.
    ///
    /// Sends exactly one preview request. When this returns `false` there is
    /// nothing to fetch.
    pub async fn probe(&self, keyword: &str) -> Result<bool, RevWhoixError> {
        Ok(self.preview_count(keyword).await? != 0)
    }

    /// Fetch every domain matching `keyword`.
    ///
    /// Each domain is passed to `sink` as soon as its page arrives, and the
    /// whole result set is returned once pagination ends. Domains keep the
    /// order the API returned them in; nothing is sorted or deduplicated.
    ///
    /// A page whose `domainsCount` reaches the configured page size is
    /// followed by another request carrying that page's cursor.
    ///
    /// # Errors
    ///
    /// Any transport, status or parse error ends the fetch immediately.
    /// `PaginationError` is returned when more than `max_pages` pages would be
    /// needed, or when the API hands back the cursor it was just given.
    pub async fn fetch<F>(&self, keyword: &str, mut sink: F) -> Result<Vec<String>, RevWhoixError>
    where
        F: FnMut(&str),
    {
        self.fetch_until(keyword, |domain| {
            sink(domain);
            ControlFlow::Continue(())
        })
        .await
    }

    /// Like [`fetch`](Self::fetch), but `sink` can end the search early.
    ///
    /// When `sink` returns `ControlFlow::Break`, no further domains are
    /// emitted and no further pages are requested. The domains collected up to
    /// and including the one that broke are returned.
    pub async fn fetch_until<F>(
        &self,
        keyword: &str,
        mut sink: F,
    ) -> Result<Vec<String>, RevWhoixError>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let keyword = validate_keyword(keyword)?;
        let mut request = self.request(keyword, SearchMode::Purchase);
        let mut domains = Vec::new();
        let mut pages = 0usize;

        loop {
            if pages >= self.config.max_pages {
                return Err(RevWhoixError::pagination(
                    pages,
                    format!(
                        "more results remain after the {}-page limit",
                        self.config.max_pages
                    ),
                ));
            }

            let SearchResponse {
                domains_count,
                domains_list,
                next_page_search_after,
            } = self.transport.send(&request).await?;
            pages += 1;

            tracing::debug!(
                page = pages,
                domains_count,
                received = domains_list.len(),
                "received page"
            );

            for domain in domains_list {
                let flow = sink(&domain);
                domains.push(domain);
                if flow.is_break() {
                    tracing::debug!(page = pages, "sink closed, stopping search");
                    return Ok(domains);
                }
            }

            if domains_count < self.config.page_size {
                break;
            }

            match next_page_search_after {
                Some(cursor) if request.search_after.as_ref() == Some(&cursor) => {
                    return Err(RevWhoixError::pagination(
                        pages,
                        format!("API returned the same cursor twice ({})", cursor),
                    ));
                }
                Some(cursor) => request.search_after = Some(cursor),
                None => {
                    tracing::warn!(
                        page = pages,
                        domains_count,
                        "full page without a next-page cursor, stopping"
                    );
                    break;
                }
            }
        }

        tracing::info!(keyword, pages, total = domains.len(), "search complete");
        Ok(domains)
    }

    /// Get the configuration for this searcher.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn request(&self, keyword: &str, mode: SearchMode) -> SearchRequest {
        SearchRequest::new(self.api_key.expose(), keyword, mode, &self.config)
    }
}

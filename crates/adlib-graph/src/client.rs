//! Authenticated Graph API client and pagination engine.

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use adlib_core::error::TransportError;
use adlib_core::{
    AccessToken, AdArchiveRecord, GraphUrl, Page, PageStream, QueryParams, QuerySpec, Result,
};

use crate::endpoints::ADS_ARCHIVE;
use crate::transport::{Transport, decode};

/// Page-size hint sent when the caller gives none. The API caps pages at 2000.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const TOKEN_PARAM: &str = "access_token";

/// A Graph API client bound to one access token.
#[derive(Debug, Clone)]
pub struct GraphClient {
    transport: Transport,
    token: AccessToken,
}

impl GraphClient {
    /// Create a client for `base` authenticating with `token`.
    pub fn new(base: GraphUrl, token: AccessToken) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(base)?,
            token,
        })
    }

    /// Number of high-usage warnings emitted by this client.
    pub fn quota_warnings(&self) -> usize {
        self.transport.quota_warnings()
    }

    /// Stream the pages of a list endpoint, following `paging.next`.
    ///
    /// Each request waits for the previous response: the next locator is
    /// only known once a page has arrived, and it is requested as given
    /// rather than rebuilt from `params`.
    pub fn pages<'a, T>(
        &'a self,
        path: &'a str,
        params: QueryParams,
    ) -> impl Stream<Item = Result<Page<T>>> + Send + 'a
    where
        T: DeserializeOwned + Send + 'a,
    {
        let mut params = params;
        if !params.contains("limit") {
            params.set("limit", DEFAULT_PAGE_SIZE.to_string());
        }

        try_stream! {
            let mut target = self.first_url(path, &params)?;
            let mut fetched = 0usize;

            loop {
                let raw = self.transport.get(target).await?;
                let page: Page<T> = decode(&raw, "page")?;
                fetched += 1;
                debug!(page = fetched, records = page.data.len(), "fetched page");

                let next = page.next_locator().map(str::to_owned);
                yield page;

                match next {
                    Some(locator) => target = self.continuation_url(&locator)?,
                    None => break,
                }
            }
        }
    }

    /// Fetch every page of a list endpoint, stopping at `limit` records (`0` = no limit).
    #[instrument(skip(self, params))]
    pub async fn fetch_all<T>(&self, path: &str, params: QueryParams, limit: usize) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        collect_pages(self.pages(path, params), limit).await
    }

    /// Search the Ad Library.
    ///
    /// The query is validated before any request is made.
    pub async fn search_ads(&self, spec: &QuerySpec, limit: usize) -> Result<Vec<AdArchiveRecord>> {
        let params = spec.build()?;
        self.fetch_all(ADS_ARCHIVE, params, limit).await
    }

    /// Fetch a single object by id.
    #[instrument(skip(self, fields))]
    pub async fn get_object<T: DeserializeOwned>(&self, id: &str, fields: &[&str]) -> Result<T> {
        let mut params = QueryParams::new();
        params.set("fields", fields.join(","));

        let url = self.first_url(id, &params)?;
        let raw = self.transport.get(url).await?;
        decode(&raw, "object")
    }

    fn first_url(&self, path: &str, params: &QueryParams) -> Result<Url> {
        let mut url = self.transport.url(path, params)?;
        url.query_pairs_mut()
            .append_pair(TOKEN_PARAM, self.token.as_str());
        Ok(url)
    }

    /// The server's next-page URL, used as-is.
    ///
    /// Only the token is added, and only if the locator lacks one.
    fn continuation_url(&self, locator: &str) -> Result<Url> {
        let mut url = Url::parse(locator).map_err(|e| TransportError::InvalidLocator {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;

        if !url.query_pairs().any(|(name, _)| name == TOKEN_PARAM) {
            url.query_pairs_mut()
                .append_pair(TOKEN_PARAM, self.token.as_str());
        }
        Ok(url)
    }
}

/// Accumulate records from `pages` in order until it ends or `limit` is reached.
///
/// Reaching the limit drops the stream, so no further page is requested.
/// Any error discards what was gathered so far.
pub async fn collect_pages<T, S>(pages: S, limit: usize) -> Result<Vec<T>>
where
    S: PageStream<T>,
{
    let mut pages = std::pin::pin!(pages);
    let mut records = Vec::new();

    while let Some(page) = pages.next().await {
        records.extend(page?.data);

        if limit > 0 && records.len() >= limit {
            records.truncate(limit);
            break;
        }
    }

    debug!(records = records.len(), "pagination finished");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn page(ids: std::ops::Range<u32>, has_next: bool) -> Result<Page<u32>> {
        Ok(Page {
            data: ids.collect(),
            paging: has_next.then(|| adlib_core::Paging {
                next: Some("https://graph.facebook.com/v23.0/ads_archive?after=x".to_string()),
                ..adlib_core::Paging::default()
            }),
        })
    }

    #[tokio::test]
    async fn collect_truncates_to_limit() {
        let pages = stream::iter(vec![page(0..40, true), page(40..80, true), page(80..120, false)]);
        let records = collect_pages(pages, 50).await.unwrap();
        assert_eq!(records, (0..50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn collect_unbounded_keeps_order() {
        let pages = stream::iter(vec![page(0..40, true), page(40..80, true), page(80..120, false)]);
        let records = collect_pages(pages, 0).await.unwrap();
        assert_eq!(records.len(), 120);
        assert_eq!(records, (0..120).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn error_discards_partial_results() {
        let pages = stream::iter(vec![
            page(0..40, true),
            Err(TransportError::Http {
                message: "reset".to_string(),
            }
            .into()),
        ]);
        assert!(collect_pages(pages, 0).await.is_err());
    }

    #[test]
    fn continuation_keeps_locator_and_adds_missing_token() {
        let client = GraphClient::new(GraphUrl::default(), AccessToken::new("tok")).unwrap();

        let url = client
            .continuation_url("https://graph.facebook.com/v23.0/ads_archive?after=abc&limit=100")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.facebook.com/v23.0/ads_archive?after=abc&limit=100&access_token=tok"
        );

        let url = client
            .continuation_url("https://graph.facebook.com/v23.0/ads_archive?access_token=srv&after=abc")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.facebook.com/v23.0/ads_archive?access_token=srv&after=abc"
        );
    }

    #[test]
    fn relative_locator_rejected() {
        let client = GraphClient::new(GraphUrl::default(), AccessToken::new("tok")).unwrap();
        assert!(client.continuation_url("/ads_archive?after=abc").is_err());
    }
}

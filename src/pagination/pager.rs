//! Paged fetches
//!
//! Pages are requested strictly in order: the URL of page N+1 is only known
//! once page N has been received.

use crate::connection::{ApiRequest, Connection};
use crate::error::{Error, Result};
use futures::stream::{self, Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::{debug, warn};
use url::Url;

/// Lazy walk over every page of a listing
///
/// Nothing is requested until [`next_page`](Self::next_page) is awaited.
/// [`restart`](Self::restart) starts over from the first URL.
pub struct PagedResult<'c, T> {
    connection: &'c mut dyn Connection,
    start: Url,
    next: Option<Url>,
    visited: HashSet<Url>,
    pages_fetched: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<'c, T: DeserializeOwned> PagedResult<'c, T> {
    /// Create a walk starting at `start`
    pub fn new(connection: &'c mut dyn Connection, start: Url) -> Self {
        Self {
            connection,
            next: Some(start.clone()),
            start,
            visited: HashSet::new(),
            pages_fetched: 0,
            _marker: PhantomData,
        }
    }

    /// Number of pages received since the last (re)start
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Check if no further page will be requested
    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    /// Start over from the first page
    pub fn restart(&mut self) {
        self.next = Some(self.start.clone());
        self.visited.clear();
        self.pages_fetched = 0;
    }

    /// Fetch the next page, `None` once the listing is exhausted
    ///
    /// After an error the walk is exhausted until restarted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        let response = self.connection.execute(ApiRequest::get(url.clone())).await?;
        let items: Vec<T> = response.json()?;
        self.pages_fetched += 1;
        self.visited.insert(url.clone());

        if let Some(next) = response.links().next {
            // Relative targets resolve against the page that carried them
            let next = url.join(&next)?;
            if self.visited.contains(&next) {
                warn!("Pagination loop detected at {}, stopping", next);
            } else {
                debug!("Following next page: {}", next);
                self.next = Some(next);
            }
        }

        Ok(Some(items))
    }

    /// Fetch every remaining page and concatenate them in order
    pub async fn collect(mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page);
        }
        debug!(
            "Fetched {} items over {} pages from {}",
            all.len(),
            self.pages_fetched,
            self.start
        );
        Ok(all)
    }

    /// Stream the remaining items one by one
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + 'c
    where
        T: 'c,
    {
        stream::try_unfold(self, |mut pages| async move {
            let page = pages.next_page().await?;
            Ok::<_, Error>(page.map(|page| (page, pages)))
        })
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<T, Error>)))
        .try_flatten()
    }
}

/// Fetch every page of the listing at `url`
pub async fn fetch_all<T: DeserializeOwned>(
    connection: &mut dyn Connection,
    url: Url,
) -> Result<Vec<T>> {
    PagedResult::new(connection, url).collect().await
}

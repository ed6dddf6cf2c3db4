//! Lazy cursors over paginated search endpoints
//!
//! A cursor holds at most one page. The next page is requested only after
//! the current one has been drained, and iteration stops when the server
//! returns no `next_page_token`. After an error the cursor is fused: every
//! later call yields `None`. Cursors are single pass; build a new one to
//! start over.

use super::client::TrackingClient;
use super::models::{SearchModelVersionsRequest, SearchRunsRequest};
use crate::domain::{ModelVersion, Result, Run};
use futures::stream::{self, Stream};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorState {
    Fresh,
    Next(String),
    Done,
}

/// Page buffer and continuation state shared by both cursors
#[derive(Debug)]
struct PageCursor<T> {
    page: VecDeque<T>,
    state: CursorState,
    pages_fetched: usize,
}

impl<T> PageCursor<T> {
    fn new() -> Self {
        Self {
            page: VecDeque::new(),
            state: CursorState::Fresh,
            pages_fetched: 0,
        }
    }

    fn pop(&mut self) -> Option<T> {
        self.page.pop_front()
    }

    /// `None` when exhausted, otherwise the token for the next request
    fn next_request(&self) -> Option<Option<String>> {
        match &self.state {
            CursorState::Fresh => Some(None),
            CursorState::Next(token) => Some(Some(token.clone())),
            CursorState::Done => None,
        }
    }

    fn load(&mut self, items: Vec<T>, next_page_token: Option<String>) {
        self.pages_fetched += 1;
        self.page = items.into();
        self.state = match next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => CursorState::Next(token),
            None => CursorState::Done,
        };
    }

    fn fuse(&mut self) {
        self.page.clear();
        self.state = CursorState::Done;
    }
}

/// Cursor over `runs/search` for one experiment
///
/// # Example
///
/// ```no_run
/// use mlmigrate::adapters::tracking::{RunViewType, TrackingClient};
/// use mlmigrate::config::EndpointConfig;
/// use mlmigrate::domain::ExperimentId;
///
/// # async fn example() -> mlmigrate::domain::Result<()> {
/// let client = TrackingClient::new(&EndpointConfig::new("http://localhost:5000", None))?;
/// let id = ExperimentId::new("1").unwrap();
/// let mut runs = client.search_runs(&id, None, RunViewType::ActiveOnly, 1000);
/// while let Some(run) = runs.next().await {
///     println!("{}", run?.id());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SearchRunsIterator {
    client: TrackingClient,
    request: SearchRunsRequest,
    cursor: PageCursor<Run>,
}

impl SearchRunsIterator {
    pub fn new(client: TrackingClient, request: SearchRunsRequest) -> Self {
        Self {
            client,
            request,
            cursor: PageCursor::new(),
        }
    }

    /// Next run, fetching the next page when the current one is drained
    pub async fn next(&mut self) -> Option<Result<Run>> {
        loop {
            if let Some(run) = self.cursor.pop() {
                return Some(Ok(run));
            }

            let page_token = self.cursor.next_request()?;
            let mut request = self.request.clone();
            request.page_token = page_token;

            match self.client.search_runs_page(&request).await {
                Ok(rsp) => {
                    tracing::debug!(
                        experiment_ids = ?self.request.experiment_ids,
                        page = self.cursor.pages_fetched + 1,
                        runs = rsp.runs.len(),
                        "Fetched runs page"
                    );
                    self.cursor.load(rsp.runs, rsp.next_page_token);
                }
                Err(e) => {
                    self.cursor.fuse();
                    return Some(Err(e));
                }
            }
        }
    }

    /// Number of pages requested so far
    pub fn pages_fetched(&self) -> usize {
        self.cursor.pages_fetched
    }

    /// Adapt into a `Stream`
    pub fn into_stream(self) -> impl Stream<Item = Result<Run>> {
        stream::unfold(self, |mut it| async move { it.next().await.map(|item| (item, it)) })
    }
}

/// Cursor over `model-versions/search` for one registered model
#[derive(Debug)]
pub struct SearchModelVersionsIterator {
    client: TrackingClient,
    request: SearchModelVersionsRequest,
    cursor: PageCursor<ModelVersion>,
}

impl SearchModelVersionsIterator {
    pub fn new(client: TrackingClient, request: SearchModelVersionsRequest) -> Self {
        Self {
            client,
            request,
            cursor: PageCursor::new(),
        }
    }

    pub async fn next(&mut self) -> Option<Result<ModelVersion>> {
        loop {
            if let Some(version) = self.cursor.pop() {
                return Some(Ok(version));
            }

            let page_token = self.cursor.next_request()?;
            let mut request = self.request.clone();
            request.page_token = page_token;

            match self.client.search_model_versions_page(&request).await {
                Ok(rsp) => self.cursor.load(rsp.model_versions, rsp.next_page_token),
                Err(e) => {
                    self.cursor.fuse();
                    return Some(Err(e));
                }
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<ModelVersion>> {
        stream::unfold(self, |mut it| async move { it.next().await.map(|item| (item, it)) })
    }
}

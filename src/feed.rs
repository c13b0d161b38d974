//! Timeline fetching with gating and stale-response protection.
//!
//! Every issued request gets a fresh generation. A completed fetch is only
//! applied when it is still the pending request and its view is still the
//! one on screen; anything else is dropped without touching the posts.

use tracing::{debug, warn};

use crate::api::{ApiError, BackendClient, Post};
use crate::catalog::{ConfigurationError, TimelineCatalog, ViewSelector};
use crate::session::Session;

pub const INITIAL_PAGE_SIZE: usize = 10;
pub const PAGE_SIZE_STEP: usize = 10;

/// How many posts "show more" has asked for so far. Never shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page_size: usize,
}

impl PaginationState {
    pub const fn new() -> Self {
        Self {
            page_size: INITIAL_PAGE_SIZE,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn grow(&mut self) -> usize {
        self.page_size += PAGE_SIZE_STEP;
        self.page_size
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub posts: Vec<Post>,
    pub pagination: PaginationState,
}

impl FeedState {
    pub fn page_size(&self) -> usize {
        self.pagination.page_size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub generation: u64,
    pub view: ViewSelector,
}

/// A request ready to go over the wire. Run it wherever suits the caller.
pub struct FetchJob {
    pub request: PendingRequest,
    client: BackendClient,
    endpoint: &'static str,
    limit: usize,
    credential: Option<String>,
}

impl FetchJob {
    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Overrides the page size for a one-off fetch.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub async fn run(self) -> FeedResult {
        let result = self
            .client
            .fetch_timeline(self.endpoint, self.limit, self.credential.as_deref())
            .await;
        FeedResult {
            request: self.request,
            result,
        }
    }
}

#[derive(Debug)]
pub struct FeedResult {
    pub request: PendingRequest,
    pub result: Result<Vec<Post>, ApiError>,
}

pub enum LoadOutcome {
    /// The view needs a login the session doesn't have; nothing was issued.
    Gated,
    Issued(FetchJob),
}

#[derive(Debug, PartialEq)]
pub enum ApplyOutcome {
    Applied { count: usize },
    /// Superseded request or a view that is no longer selected.
    Discarded,
    /// Fresh but failed; previous posts kept.
    Failed(ApiError),
}

pub struct FeedFetcher {
    client: BackendClient,
    catalog: TimelineCatalog,
    state: FeedState,
    pending: Option<PendingRequest>,
    generation: u64,
}

impl FeedFetcher {
    pub fn new(client: BackendClient, catalog: TimelineCatalog) -> Self {
        Self {
            client,
            catalog,
            state: FeedState::default(),
            pending: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn posts(&self) -> &[Post] {
        &self.state.posts
    }

    pub fn catalog(&self) -> &TimelineCatalog {
        &self.catalog
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// The only request whose response will still be applied.
    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    #[cfg(test)]
    pub fn seed_posts(&mut self, posts: Vec<Post>) {
        self.state.posts = posts;
    }

    /// Prepares the fetch for `view`, or reports that the view is gated.
    pub fn load(
        &mut self,
        view: ViewSelector,
        session: &Session,
    ) -> Result<LoadOutcome, ConfigurationError> {
        let descriptor = self.catalog.descriptor(view)?;
        if descriptor.requires_login && !session.is_authenticated() {
            debug!(%view, "timeline requires login, not fetching");
            return Ok(LoadOutcome::Gated);
        }

        self.generation += 1;
        let request = PendingRequest {
            generation: self.generation,
            view,
        };
        self.pending = Some(request);

        let credential = if descriptor.attach_credential {
            session.token().map(str::to_string)
        } else {
            None
        };
        debug!(%view, generation = request.generation, "issuing timeline request");
        Ok(LoadOutcome::Issued(FetchJob {
            request,
            client: self.client.clone(),
            endpoint: descriptor.endpoint,
            limit: self.state.page_size(),
            credential,
        }))
    }

    pub fn refresh(
        &mut self,
        view: ViewSelector,
        session: &Session,
    ) -> Result<LoadOutcome, ConfigurationError> {
        self.load(view, session)
    }

    pub fn load_more(
        &mut self,
        view: ViewSelector,
        session: &Session,
    ) -> Result<LoadOutcome, ConfigurationError> {
        let size = self.state.pagination.grow();
        debug!(%view, page_size = size, "growing page size");
        self.load(view, session)
    }

    /// Applies a completed fetch if it is still wanted.
    pub fn apply(&mut self, result: FeedResult, current_view: ViewSelector) -> ApplyOutcome {
        if self.pending != Some(result.request) {
            debug!(generation = result.request.generation, "discarding superseded response");
            return ApplyOutcome::Discarded;
        }
        self.pending = None;
        if result.request.view != current_view {
            debug!(view = %result.request.view, "discarding response for deselected view");
            return ApplyOutcome::Discarded;
        }

        match result.result {
            Ok(posts) => {
                let count = posts.len();
                self.state.posts = posts;
                ApplyOutcome::Applied { count }
            }
            Err(e) => {
                warn!(view = %result.request.view, error = %e, "timeline fetch failed, keeping previous posts");
                ApplyOutcome::Failed(e)
            }
        }
    }
}

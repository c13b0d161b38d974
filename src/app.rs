use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api::{BackendClient, Post};
use crate::callback::{self, CallbackEvent};
use crate::catalog::{ConfigurationError, TimelineCatalog, ViewSelector};
use crate::feed::{ApplyOutcome, FeedFetcher, FeedResult, FetchJob, LoadOutcome};
use crate::navigator::Navigator;
use crate::session::{Session, SessionError, SessionStatus, SharedSession};
use crate::theme::ResolvedTheme;
use crate::time::Clock;
use crate::viewer::ViewerSelection;

pub enum AsyncResult {
    Feed {
        task_id: u64,
        result: FeedResult,
    },
    Session {
        task_id: u64,
        /// Controller state right after the operation.
        session: Session,
        outcome: SessionOutcome,
    },
}

#[derive(Debug)]
pub enum SessionOutcome {
    LoginStarted(Result<String, SessionError>),
    Landed(Result<ViewSelector, SessionError>),
    LoggedOut(ViewSelector),
    LoginCancelled,
    IdentityResolved,
}

#[derive(Debug)]
pub struct TaskInfo {
    pub id: u64,
    pub description: String,
    pub started_at: Instant,
}

#[derive(Debug)]
pub struct LogEntry {
    pub message: String,
}

/// Debug panel state: task tracking and log messages.
#[derive(Debug, Default)]
pub struct DebugState {
    pub visible: bool,
    pub running_tasks: Vec<TaskInfo>,
    pub log: VecDeque<LogEntry>,
    next_task_id: u64,
}

impl DebugState {
    const MAX_LOG_ENTRIES: usize = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, msg: impl Into<String>) {
        self.log.push_back(LogEntry {
            message: msg.into(),
        });
        if self.log.len() > Self::MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
    }

    pub fn start_task(&mut self, description: impl Into<String>) -> u64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        let desc = description.into();
        self.log(format!("Started: {}", desc));
        self.running_tasks.push(TaskInfo {
            id,
            description: desc,
            started_at: Instant::now(),
        });
        id
    }

    pub fn end_task(&mut self, id: u64, outcome: &str) {
        if let Some(pos) = self.running_tasks.iter().position(|t| t.id == id) {
            let task = self.running_tasks.remove(pos);
            let elapsed = task.started_at.elapsed();
            self.log(format!("{} {}: {:.2?}", task.description, outcome, elapsed));
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

/// Spinner timing and the one-line flash shown in the status bar.
#[derive(Debug, Default)]
pub struct LoadState {
    pub loading: bool,
    pub loading_start: Option<Instant>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl LoadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loading(&mut self, loading: bool) {
        if loading && !self.loading {
            self.loading_start = Some(Instant::now());
        }
        self.loading = loading;
        // loading_start is kept after completion for the minimum spinner duration
    }

    pub fn should_show_spinner(&self) -> bool {
        const MIN_SPINNER_DURATION: std::time::Duration = std::time::Duration::from_millis(500);
        if let Some(start) = self.loading_start {
            self.loading || start.elapsed() < MIN_SPINNER_DURATION
        } else {
            false
        }
    }

    pub fn clear_flash(&mut self) {
        self.error = None;
        self.notice = None;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.notice = None;
        self.error = Some(msg.into());
    }

    pub fn set_notice(&mut self, msg: impl Into<String>) {
        self.notice = Some(msg.into());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    PageDown,
    PageUp,
    SelectView(ViewSelector),
    NextView,
    PrevView,
    Refresh,
    ShowMore,
    EnlargeMedia,
    DismissMedia,
    OpenExternal,
    Login,
    CancelLogin,
    Logout,
    ToggleHelp,
    ToggleDebug,
    Quit,
}

/// Long-lived collaborators handed to the app at startup.
pub struct Services {
    pub client: BackendClient,
    pub controller: SharedSession,
    pub navigator: Arc<dyn Navigator>,
    pub callback_port: u16,
}

pub struct App {
    pub view: ViewSelector,
    pub route: &'static str,
    /// Snapshot of the controller's session, refreshed by every session task.
    pub session: Session,
    pub feed: FeedFetcher,
    /// The view whose posts the feed currently holds.
    pub shown_view: Option<ViewSelector>,
    pub gated: bool,
    pub viewer: ViewerSelection,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub load: LoadState,
    pub should_quit: bool,
    pub show_help: bool,
    pub theme: ResolvedTheme,
    pub clock: Arc<dyn Clock>,
    // Async task management
    pub result_tx: mpsc::Sender<AsyncResult>,
    pub result_rx: mpsc::Receiver<AsyncResult>,
    pub callback_tx: mpsc::Sender<CallbackEvent>,
    pub callback_rx: mpsc::Receiver<CallbackEvent>,
    // Debug pane
    pub debug: DebugState,
    controller: SharedSession,
    navigator: Arc<dyn Navigator>,
    callback_port: u16,
    callback_cancel: Option<CancellationToken>,
}

impl App {
    pub fn new(theme: ResolvedTheme, services: Services, session: Session) -> Self {
        let (result_tx, result_rx) = mpsc::channel(16);
        let (callback_tx, callback_rx) = mpsc::channel(4);
        let view = default_view_for(&session);
        let feed = FeedFetcher::new(services.client, TimelineCatalog::new());
        let route = feed
            .catalog()
            .descriptor(view)
            .map(|d| d.route_path)
            .unwrap_or("/");
        Self {
            view,
            route,
            session,
            feed,
            shown_view: None,
            gated: false,
            viewer: ViewerSelection::new(),
            selected_index: 0,
            scroll_offset: 0,
            load: LoadState::new(),
            should_quit: false,
            show_help: false,
            theme,
            clock: crate::time::system_clock(),
            result_tx,
            result_rx,
            callback_tx,
            callback_rx,
            debug: DebugState::new(),
            controller: services.controller,
            navigator: services.navigator,
            callback_port: services.callback_port,
            callback_cancel: None,
        }
    }

    /// Selects the first view and, for a restored session, looks up the user.
    pub fn start(&mut self, requested: Option<ViewSelector>) {
        let view = requested.unwrap_or_else(|| default_view_for(&self.session));
        self.select_view(view);
        if self.session.is_authenticated() && self.session.user_name.is_none() {
            self.spawn_identity_refresh();
        }
    }

    /// Drains completed tasks and redirect landings without blocking.
    pub fn poll_async(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.handle_async_result(result);
        }
        while let Ok(event) = self.callback_rx.try_recv() {
            self.handle_callback(event);
        }
    }

    pub fn handle_async_result(&mut self, result: AsyncResult) {
        match result {
            AsyncResult::Feed { task_id, result } => self.apply_feed_result(task_id, result),
            AsyncResult::Session {
                task_id,
                session,
                outcome,
            } => {
                self.session = session;
                self.apply_session_outcome(task_id, outcome);
            }
        }
    }

    fn apply_feed_result(&mut self, task_id: u64, result: FeedResult) {
        let view = result.request.view;
        match self.feed.apply(result, self.view) {
            ApplyOutcome::Applied { count } => {
                self.debug.end_task(task_id, &format!("completed ({count} posts)"));
                self.shown_view = Some(view);
                self.clamp_selection();
            }
            ApplyOutcome::Discarded => self.debug.end_task(task_id, "discarded (stale)"),
            ApplyOutcome::Failed(e) => {
                self.debug.end_task(task_id, "failed");
                self.load.set_error(e.user_message());
            }
        }
        self.load.set_loading(self.feed.is_loading());
    }

    fn apply_session_outcome(&mut self, task_id: u64, outcome: SessionOutcome) {
        match outcome {
            SessionOutcome::LoginStarted(Ok(_)) => {
                self.debug.end_task(task_id, "browser opened");
                self.load
                    .set_notice("Finish logging in in your browser (Esc to cancel)");
            }
            SessionOutcome::LoginStarted(Err(e)) => {
                self.debug.end_task(task_id, "failed");
                self.stop_callback_listener();
                self.load.set_error(e.user_message());
            }
            SessionOutcome::Landed(Ok(view)) => {
                self.debug.end_task(task_id, "completed");
                // The listener shuts itself down once the browser has been redirected.
                self.callback_cancel = None;
                let who = self
                    .session
                    .handle()
                    .unwrap_or_else(|| "your account".to_string());
                self.select_view(view);
                self.load.set_notice(format!("Logged in as {who}"));
            }
            SessionOutcome::Landed(Err(e)) => {
                self.debug.end_task(task_id, "failed");
                self.callback_cancel = None;
                self.load.set_error(e.user_message());
            }
            SessionOutcome::LoggedOut(view) => {
                self.debug.end_task(task_id, "completed");
                self.select_view(view);
                self.load.set_notice("Logged out");
            }
            SessionOutcome::LoginCancelled => {
                self.debug.end_task(task_id, "completed");
                self.load.set_notice("Login cancelled");
            }
            SessionOutcome::IdentityResolved => self.debug.end_task(task_id, "completed"),
        }
    }

    pub fn update(&mut self, msg: Message) {
        self.load.clear_flash();

        match msg {
            Message::SelectNext => self.select_next(),
            Message::SelectPrev => self.select_prev(),
            Message::SelectFirst => self.select_first(),
            Message::SelectLast => self.select_last(),
            Message::PageDown => self.page_down(),
            Message::PageUp => self.page_up(),
            Message::SelectView(view) => self.select_view(view),
            Message::NextView => self.cycle_view(1),
            Message::PrevView => self.cycle_view(-1),
            Message::Refresh => self.refresh(),
            Message::ShowMore => self.show_more(),
            Message::EnlargeMedia => self.enlarge_media(),
            Message::DismissMedia => self.viewer.dismiss(),
            Message::OpenExternal => self.open_external(),
            Message::Login => self.login(),
            Message::CancelLogin => self.cancel_login(),
            Message::Logout => self.logout(),
            Message::ToggleHelp => self.show_help = !self.show_help,
            Message::ToggleDebug => self.debug.toggle(),
            Message::Quit => {
                self.stop_callback_listener();
                self.should_quit = true;
            }
        }
    }

    /// Routes to `view`, then gates and issues its fetch.
    pub fn select_view(&mut self, view: ViewSelector) {
        let route = match self.feed.catalog().descriptor(view) {
            Ok(descriptor) => descriptor.route_path,
            Err(e) => return self.configuration_error(e),
        };
        self.view = view;
        self.route = route;
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.viewer.dismiss();

        let outcome = self.feed.load(view, &self.session);
        self.dispatch_load(outcome, "Load");
    }

    fn refresh(&mut self) {
        let outcome = self.feed.refresh(self.view, &self.session);
        self.dispatch_load(outcome, "Refresh");
    }

    fn show_more(&mut self) {
        let outcome = self.feed.load_more(self.view, &self.session);
        self.debug
            .log(format!("Page size now {}", self.feed.state().page_size()));
        self.dispatch_load(outcome, "Load more");
    }

    fn cycle_view(&mut self, direction: i32) {
        let views = ViewSelector::all();
        let current_idx = views.iter().position(|&v| v == self.view).unwrap_or(0);
        let new_idx = (current_idx as i32 + direction).rem_euclid(views.len() as i32) as usize;
        self.select_view(views[new_idx]);
    }

    fn dispatch_load(&mut self, outcome: Result<LoadOutcome, ConfigurationError>, verb: &str) {
        match outcome {
            Ok(LoadOutcome::Gated) => {
                self.gated = true;
                self.debug
                    .log(format!("{} needs login, not fetched", self.view_label()));
            }
            Ok(LoadOutcome::Issued(job)) => {
                self.gated = false;
                self.spawn_fetch(job, verb);
            }
            Err(e) => self.configuration_error(e),
        }
        self.load.set_loading(self.feed.is_loading());
    }

    fn configuration_error(&mut self, err: ConfigurationError) {
        error!(error = %err, "timeline catalog is missing an entry");
        debug_assert!(false, "{err}");
        self.load.set_error(err.to_string());
    }

    pub fn view_label(&self) -> &'static str {
        self.feed.catalog().label(self.view)
    }

    /// Posts to draw: empty while gated or while another view's posts are held.
    pub fn visible_posts(&self) -> &[Post] {
        if self.gated || self.shown_view != Some(self.view) {
            &[]
        } else {
            self.feed.posts()
        }
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.visible_posts().get(self.selected_index)
    }

    fn item_count(&self) -> usize {
        self.visible_posts().len()
    }

    fn clamp_selection(&mut self) {
        let count = self.item_count();
        if count == 0 {
            self.selected_index = 0;
            self.scroll_offset = 0;
        } else if self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }

    fn select_next(&mut self) {
        let count = self.item_count();
        if count > 0 && self.selected_index < count - 1 {
            self.selected_index += 1;
        }
    }

    fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    fn select_first(&mut self) {
        self.selected_index = 0;
        self.scroll_offset = 0;
    }

    fn select_last(&mut self) {
        let count = self.item_count();
        if count > 0 {
            self.selected_index = count - 1;
        }
    }

    fn page_down(&mut self) {
        let count = self.item_count();
        if count > 0 {
            self.selected_index = (self.selected_index + 10).min(count - 1);
        }
    }

    fn page_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(10);
    }

    fn enlarge_media(&mut self) {
        match self.selected_post().and_then(Post::first_media).cloned() {
            Some(media) => self.viewer.select(media),
            None => self.load.set_notice("This post has no media"),
        }
    }

    /// Opens the enlarged media if any, otherwise the selected post.
    fn open_external(&mut self) {
        let url = match self.viewer.current() {
            Some(media) => Some(media.url.clone()),
            None => self
                .selected_post()
                .and_then(|p| p.url.clone().or_else(|| p.account.url.clone())),
        };
        let Some(url) = url else {
            self.load.set_notice("Nothing to open");
            return;
        };
        if let Err(e) = self.navigator.open_external(&url) {
            self.load
                .set_error(SessionError::Navigation(e.to_string()).user_message());
        }
    }

    fn login(&mut self) {
        match self.session.status {
            SessionStatus::Authenticated => {
                return self.load.set_notice("Already logged in");
            }
            SessionStatus::Authenticating => {
                return self.load.set_notice("Login already in progress");
            }
            SessionStatus::Anonymous => {}
        }
        self.session.status = SessionStatus::Authenticating;

        let cancel = CancellationToken::new();
        self.callback_cancel = Some(cancel.clone());
        let controller = self.controller.clone();
        let callback_tx = self.callback_tx.clone();
        let port = self.callback_port;
        let tx = self.result_tx.clone();
        let task_id = self.debug.start_task("Login");

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            let outcome = match callback::bind(port).await {
                Ok(listener) => {
                    callback::spawn(listener, callback_tx, cancel.clone());
                    ctl.request_login().await
                }
                Err(e) => Err(SessionError::CallbackUnavailable(e.to_string())),
            };
            if outcome.is_err() {
                cancel.cancel();
            }
            let session = ctl.session().clone();
            let _ = tx
                .send(AsyncResult::Session {
                    task_id,
                    session,
                    outcome: SessionOutcome::LoginStarted(outcome),
                })
                .await;
        });
    }

    fn cancel_login(&mut self) {
        if self.session.status != SessionStatus::Authenticating {
            return;
        }
        self.stop_callback_listener();
        let controller = self.controller.clone();
        let tx = self.result_tx.clone();
        let task_id = self.debug.start_task("Cancel login");

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            ctl.cancel_login();
            let session = ctl.session().clone();
            let _ = tx
                .send(AsyncResult::Session {
                    task_id,
                    session,
                    outcome: SessionOutcome::LoginCancelled,
                })
                .await;
        });
    }

    /// Finishes the round-trip once the browser lands on the callback route.
    pub fn handle_callback(&mut self, event: CallbackEvent) {
        info!(has_token = event.access_token.is_some(), "login redirect received");
        let controller = self.controller.clone();
        let tx = self.result_tx.clone();
        let task_id = self.debug.start_task("Complete login");

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            let outcome = ctl.handle_callback(event.access_token.as_deref()).await;
            let session = ctl.session().clone();
            let _ = tx
                .send(AsyncResult::Session {
                    task_id,
                    session,
                    outcome: SessionOutcome::Landed(outcome),
                })
                .await;
        });
    }

    fn logout(&mut self) {
        if !self.session.is_authenticated() {
            return self.load.set_notice("Not logged in");
        }
        let controller = self.controller.clone();
        let tx = self.result_tx.clone();
        let task_id = self.debug.start_task("Logout");

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            let view = ctl.logout().await;
            let session = ctl.session().clone();
            let _ = tx
                .send(AsyncResult::Session {
                    task_id,
                    session,
                    outcome: SessionOutcome::LoggedOut(view),
                })
                .await;
        });
    }

    fn spawn_identity_refresh(&mut self) {
        let controller = self.controller.clone();
        let tx = self.result_tx.clone();
        let task_id = self.debug.start_task("Resolve user");

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            ctl.refresh_identity().await;
            let session = ctl.session().clone();
            let _ = tx
                .send(AsyncResult::Session {
                    task_id,
                    session,
                    outcome: SessionOutcome::IdentityResolved,
                })
                .await;
        });
    }

    fn stop_callback_listener(&mut self) {
        if let Some(cancel) = self.callback_cancel.take() {
            cancel.cancel();
        }
    }

    /// Spawn an async task running a prepared timeline request.
    fn spawn_fetch(&mut self, job: FetchJob, verb: &str) {
        let tx = self.result_tx.clone();
        let label = self.feed.catalog().label(job.request.view);
        let task_id = self
            .debug
            .start_task(format!("{verb} {label} (limit {})", job.limit()));

        tokio::spawn(async move {
            let result = job.run().await;
            let _ = tx.send(AsyncResult::Feed { task_id, result }).await;
        });
    }
}

fn default_view_for(session: &Session) -> ViewSelector {
    if session.is_authenticated() {
        ViewSelector::default_authenticated()
    } else {
        ViewSelector::default_anonymous()
    }
}

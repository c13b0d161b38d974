//! Test data builders for app and view testing.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use crate::api::{Account, BackendClient, MediaAttachment, Post};
use crate::app::{App, Services};
use crate::catalog::ViewSelector;
use crate::navigator::RecordingNavigator;
use crate::session::{Session, SessionController, SessionStatus};
use crate::storage::MemoryTokenStore;
use crate::theme::{ThemeVariant, default_for_variant};
use crate::time::{Clock, fixed_clock};

/// Fixed timestamp for deterministic tests: 2023-11-15 00:00:00 UTC.
/// One day after the base timestamp used in sample data, so posts show "1d ago".
pub const TEST_NOW: i64 = 1700092800;
const BASE_TIME: i64 = 1700006400;

pub struct PostBuilder {
    id: Option<String>,
    username: String,
    display_name: String,
    content: String,
    media: Vec<MediaAttachment>,
    created_at: Option<i64>,
    url: Option<String>,
}

impl Default for PostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PostBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            username: "testuser".to_string(),
            display_name: "Test User".to_string(),
            content: "<p>Hello fediverse</p>".to_string(),
            media: vec![],
            created_at: Some(BASE_TIME),
            url: None,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    pub fn display_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    pub fn content(mut self, html: &str) -> Self {
        self.content = html.to_string();
        self
    }

    pub fn media(mut self, url: &str, description: Option<&str>) -> Self {
        self.media.push(MediaAttachment {
            url: url.to_string(),
            description: description.map(str::to_string),
        });
        self
    }

    pub fn created_at(mut self, unix: i64) -> Self {
        self.created_at = Some(unix);
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn build(self) -> Post {
        Post {
            id: self.id,
            account: Account {
                display_name: self.display_name,
                username: self.username,
                avatar: String::new(),
                url: None,
            },
            content: self.content,
            media_attachments: self.media,
            created_at: self
                .created_at
                .and_then(|t| Utc.timestamp_opt(t, 0).single()),
            url: self.url,
        }
    }
}

pub fn sample_posts() -> Vec<Post> {
    vec![
        PostBuilder::new()
            .id("1")
            .username("gargron")
            .display_name("Eugen")
            .content("<p>Mastodon 4.3 is out! Check the <a href=\"https://blog.joinmastodon.org\">release notes</a>.</p>")
            .url("https://mastodon.social/@gargron/1")
            .created_at(BASE_TIME)
            .build(),
        PostBuilder::new()
            .id("2")
            .username("rustlang")
            .display_name("Rust")
            .content("<p>Announcing Rust 1.83 &amp; friends</p>")
            .created_at(BASE_TIME - 3600)
            .build(),
        PostBuilder::new()
            .id("3")
            .username("photos")
            .display_name("")
            .content("<p>Sunset over the harbour</p>")
            .media("https://files.example/sunset.jpg", Some("An orange sunset"))
            .created_at(BASE_TIME - 7200)
            .build(),
        PostBuilder::new()
            .id("4")
            .username("news")
            .display_name("Daily News")
            .content("<p>Line one<br>Line two</p>")
            .created_at(BASE_TIME - 10800)
            .build(),
        PostBuilder::new()
            .id("5")
            .username("quiet")
            .display_name("Quiet Poster")
            .content("<p>...</p>")
            .created_at(BASE_TIME - 14400)
            .build(),
    ]
}

/// Timeline response body with one minimal post per username.
pub fn posts_json(usernames: &[&str]) -> Value {
    Value::Array(
        usernames
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "id": (i + 1).to_string(),
                    "account": {
                        "display_name": name.to_uppercase(),
                        "username": name,
                        "avatar": format!("https://files.example/{name}.png"),
                        "url": format!("https://social.example/@{name}")
                    },
                    "content": format!("<p>post by {name}</p>"),
                    "media_attachments": [],
                    "created_at": "2023-11-14T00:00:00.000Z"
                })
            })
            .collect(),
    )
}

pub fn anonymous_session() -> Session {
    Session::default()
}

pub fn authenticated_session(token: &str) -> Session {
    Session {
        token: Some(token.to_string()),
        status: SessionStatus::Authenticated,
        ..Session::default()
    }
}

pub struct TestAppBuilder {
    base_url: String,
    token: Option<String>,
    user_name: Option<String>,
    view: Option<ViewSelector>,
    posts: Vec<Post>,
    selected_index: usize,
    gated: bool,
    loading: bool,
    error: Option<String>,
    show_help: bool,
    enlarged: Option<MediaAttachment>,
    navigator: Arc<RecordingNavigator>,
    store: Option<Arc<MemoryTokenStore>>,
    clock: Arc<dyn Clock>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            // Nothing listens here; tests that need responses pass a mock server.
            base_url: "http://127.0.0.1:1".to_string(),
            token: None,
            user_name: None,
            view: None,
            posts: vec![],
            selected_index: 0,
            gated: false,
            loading: false,
            error: None,
            show_help: false,
            enlarged: None,
            navigator: Arc::new(RecordingNavigator::new()),
            store: None,
            clock: fixed_clock(TEST_NOW),
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn user_name(mut self, name: &str) -> Self {
        self.user_name = Some(name.to_string());
        self
    }

    pub fn view(mut self, view: ViewSelector) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_posts(mut self, posts: Vec<Post>) -> Self {
        self.posts = posts;
        self
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn loading(mut self) -> Self {
        self.loading = true;
        self
    }

    pub fn error(mut self, msg: &str) -> Self {
        self.error = Some(msg.to_string());
        self
    }

    pub fn show_help(mut self) -> Self {
        self.show_help = true;
        self
    }

    pub fn enlarged(mut self, url: &str, description: Option<&str>) -> Self {
        self.enlarged = Some(MediaAttachment {
            url: url.to_string(),
            description: description.map(str::to_string),
        });
        self
    }

    pub fn navigator(mut self, navigator: Arc<RecordingNavigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Shares `store` with the app's controller. Takes precedence over `token`
    /// for what the controller restores; the snapshot still follows `token`.
    pub fn store(mut self, store: Arc<MemoryTokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> App {
        let store = self.store.unwrap_or_else(|| {
            Arc::new(match &self.token {
                Some(token) => MemoryTokenStore::with_token(token),
                None => MemoryTokenStore::new(),
            })
        });
        let client = BackendClient::new(&self.base_url);
        let controller =
            SessionController::new(store, client.clone(), self.navigator.clone()).into_shared();
        let mut session = match &self.token {
            Some(token) => authenticated_session(token),
            None => anonymous_session(),
        };
        session.user_name = self.user_name;

        let services = Services {
            client,
            controller,
            navigator: self.navigator,
            callback_port: 0,
        };
        let mut app = App::new(default_for_variant(ThemeVariant::Dark), services, session);
        app.clock = self.clock;

        if let Some(view) = self.view {
            app.view = view;
            if let Ok(descriptor) = app.feed.catalog().descriptor(view) {
                app.route = descriptor.route_path;
            }
        }
        if !self.posts.is_empty() {
            app.feed.seed_posts(self.posts);
            app.shown_view = Some(app.view);
        }
        app.selected_index = self.selected_index;
        app.gated = self.gated;
        app.load.set_loading(self.loading);
        app.load.error = self.error;
        app.show_help = self.show_help;
        if let Some(media) = self.enlarged {
            app.viewer.select(media);
        }
        app
    }
}

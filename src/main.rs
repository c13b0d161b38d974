mod api;
mod app;
mod callback;
mod catalog;
mod cli;
mod event;
mod feed;
mod help;
mod keys;
mod logging;
mod navigator;
mod session;
mod settings;
mod storage;
mod theme;
mod time;
mod tui;
mod viewer;
mod views;

#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use api::{BackendClient, DEFAULT_BASE_URL, Post};
use app::{App, Services};
use catalog::{TimelineCatalog, ViewSelector};
use cli::{Cli, Commands};
use event::Event;
use feed::{FeedFetcher, LoadOutcome};
use navigator::{BrowserNavigator, Navigator};
use session::{Session, SessionController};
use settings::Settings;
use storage::{MemoryTokenStore, SqliteTokenStore, TokenStore};
use theme::{ResolvedTheme, ThemeVariant, default_for_variant, detect_terminal_theme};
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = settings::config_dir(cli.config_dir.as_ref());
    let settings = load_settings(config_dir.as_ref());

    // Dropping the guard flushes the log file, so it lives until main returns.
    let _log_guard = match &config_dir {
        Some(dir) => Some(logging::init(&settings::logs_dir(dir), cli.verbose)?),
        None => None,
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    if let Some(Commands::Config {
        base_url,
        callback_port,
        default_view,
        theme,
    }) = &cli.command
    {
        let update = SettingsUpdate {
            base_url: base_url.clone(),
            callback_port: *callback_port,
            default_view: default_view.clone(),
            theme: *theme,
        };
        return handle_config_command(settings, update, config_dir.as_ref());
    }

    let base_url = cli
        .base_url
        .clone()
        .or_else(|| settings.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let client = BackendClient::new(&base_url);
    let navigator: Arc<dyn Navigator> = Arc::new(BrowserNavigator);
    let store = open_store(config_dir.as_ref(), cli.ephemeral);
    let controller = SessionController::new(store, client.clone(), navigator.clone());

    match cli.command {
        Some(Commands::Login {
            token,
            callback_url,
        }) => {
            login_command(
                controller,
                token.as_deref(),
                callback_url.as_deref(),
                settings.callback_port(),
            )
            .await
        }
        Some(Commands::Logout) => logout_command(controller).await,
        Some(Commands::Status) => status_command(controller, &client).await,
        Some(Commands::Timeline { view, limit }) => {
            timeline_command(client, controller.session(), &view, limit).await
        }
        // Handled before the backend client is built.
        Some(Commands::Config { .. }) => Ok(()),
        None => {
            let start_view = cli
                .view
                .as_deref()
                .or(settings.default_view.as_deref())
                .map(resolve_view)
                .transpose()?;
            let theme = resolve_theme(cli.dark, cli.light, &settings);
            tracing::debug!(variant = ?theme.variant, "theme resolved");
            let session = controller.session().clone();
            let services = Services {
                client,
                controller: controller.into_shared(),
                navigator,
                callback_port: settings.callback_port(),
            };
            run_tui(theme, services, session, start_view).await
        }
    }
}

fn load_settings(config_dir: Option<&PathBuf>) -> Settings {
    config_dir
        .map(|dir| {
            let path = settings::settings_path(dir);
            Settings::load(&path).unwrap_or_else(|e| {
                eprintln!("Warning: {e:#}");
                Settings::default()
            })
        })
        .unwrap_or_default()
}

fn open_store(config_dir: Option<&PathBuf>, ephemeral: bool) -> Arc<dyn TokenStore> {
    if ephemeral {
        return Arc::new(MemoryTokenStore::new());
    }
    let Some(dir) = config_dir else {
        eprintln!("Could not determine config directory; login will not be remembered");
        return Arc::new(MemoryTokenStore::new());
    };
    match SqliteTokenStore::open(&settings::db_path(dir)) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Credential storage disabled: {e}");
            tracing::warn!(error = %e, "falling back to in-memory credential storage");
            Arc::new(MemoryTokenStore::new())
        }
    }
}

fn resolve_view(name_or_route: &str) -> Result<ViewSelector> {
    TimelineCatalog::new()
        .resolve(name_or_route)
        .with_context(|| format!("Cannot open view '{name_or_route}'"))
}

fn resolve_theme(dark: bool, light: bool, settings: &Settings) -> ResolvedTheme {
    // Priority: CLI flag > settings file > terminal detection
    let variant = if dark {
        ThemeVariant::Dark
    } else if light {
        ThemeVariant::Light
    } else if let Some(variant) = settings.theme {
        variant
    } else {
        detect_terminal_theme()
    };
    default_for_variant(variant)
}

async fn run_tui(
    theme: ResolvedTheme,
    services: Services,
    session: Session,
    start_view: Option<ViewSelector>,
) -> Result<()> {
    let mut terminal = tui::init()?;
    let mut app = App::new(theme, services, session);
    let mut events = EventHandler::new(250);

    app.start(start_view);

    let result = async {
        loop {
            terminal.draw(|frame| views::render(frame, &app))?;

            // Poll async results (non-blocking)
            app.poll_async();

            if app.should_quit {
                break;
            }

            match events.next().await? {
                Event::Key(key) => {
                    if let Some(msg) = keys::handle_key(key, &app) {
                        app.update(msg);
                    }
                }
                Event::Tick | Event::Resize => {}
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn login_command(
    mut controller: SessionController,
    token: Option<&str>,
    callback_url: Option<&str>,
    port: u16,
) -> Result<()> {
    if controller.session().is_authenticated() {
        println!("Already logged in. Run `mastoradar logout` first to switch accounts.");
        return Ok(());
    }

    if let Some(token) = token {
        controller.complete_login(token).await?;
        print_logged_in(controller.session());
        return Ok(());
    }

    if let Some(url) = callback_url {
        let token = callback::token_from_redirect_url(url)
            .with_context(|| format!("Not a valid redirect URL: {url}"))?;
        controller.handle_callback(token.as_deref()).await?;
        print_logged_in(controller.session());
        return Ok(());
    }

    let listener = callback::bind(port)
        .await
        .with_context(|| format!("Could not listen for the login redirect on port {port}"))?;
    let (tx, mut rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();
    let server = callback::spawn(listener, tx, cancel.clone());

    let url = match controller.request_login().await {
        Ok(url) => url,
        Err(e) => {
            cancel.cancel();
            return Err(e.into());
        }
    };
    println!("Opened the authorization page in your browser.");
    println!("If nothing happened, visit:\n  {url}");
    println!("Waiting for the redirect (Ctrl-C to cancel)...");

    let event = tokio::select! {
        event = rx.recv() => event,
        _ = tokio::signal::ctrl_c() => None,
    };
    let Some(event) = event else {
        controller.cancel_login();
        cancel.cancel();
        bail!("Login cancelled");
    };

    let landed = controller.handle_callback(event.access_token.as_deref()).await;
    // The listener stays up briefly so the browser can load the done page.
    if server.await.is_err() {
        tracing::warn!("callback listener task panicked");
    }
    landed?;
    print_logged_in(controller.session());
    Ok(())
}

fn print_logged_in(session: &Session) {
    match session.handle() {
        Some(handle) => println!("Logged in as {handle}"),
        None => println!("Logged in (user name could not be resolved)"),
    }
}

async fn logout_command(mut controller: SessionController) -> Result<()> {
    if !controller.session().is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    controller.logout().await;
    println!("Logged out.");
    Ok(())
}

async fn status_command(mut controller: SessionController, client: &BackendClient) -> Result<()> {
    controller.refresh_identity().await;
    let session = controller.session();
    println!("Backend: {}", client.base_url());
    if !session.is_authenticated() {
        println!("Status:  anonymous");
        return Ok(());
    }
    println!("Status:  logged in");
    match (&session.user_name, &session.display_name) {
        (Some(name), Some(display)) if !display.is_empty() => {
            println!("User:    {display} (@{name})")
        }
        (Some(name), _) => println!("User:    @{name}"),
        (None, _) => println!("User:    unknown (identity lookup failed)"),
    }
    if let Some(id) = &session.user_id {
        println!("User ID: {id}");
    }
    Ok(())
}

async fn timeline_command(
    client: BackendClient,
    session: &Session,
    name_or_route: &str,
    limit: Option<usize>,
) -> Result<()> {
    let view = resolve_view(name_or_route)?;
    let mut fetcher = FeedFetcher::new(client, TimelineCatalog::new());
    let label = fetcher.catalog().label(view);

    let job = match fetcher.load(view, session)? {
        LoadOutcome::Gated => {
            bail!("{label} needs a login. Run `mastoradar login` first.")
        }
        LoadOutcome::Issued(job) => match limit {
            Some(limit) => job.with_limit(limit),
            None => job,
        },
    };

    tracing::info!(endpoint = job.endpoint(), limit = job.limit(), "fetching timeline");
    let posts = job
        .run()
        .await
        .result
        .map_err(|e| anyhow!(e.user_message()))
        .with_context(|| format!("Failed to load {label}"))?;

    if posts.is_empty() {
        println!("No posts yet.");
    }
    for post in &posts {
        print_post(post);
    }
    Ok(())
}

fn print_post(post: &Post) {
    let mut header = format!("{} @{}", post.account.name(), post.account.username);
    if let Some(ts) = post.created_unix() {
        header.push_str(&format!(" · {}", time::format_relative(ts, Utc::now())));
    }
    if !post.media_attachments.is_empty() {
        header.push_str(&format!(" [{} media]", post.media_attachments.len()));
    }
    println!("{header}");
    for line in views::html::strip_html(&post.content).lines() {
        println!("  {line}");
    }
    if let Some(url) = &post.url {
        println!("  {url}");
    }
    println!();
}

struct SettingsUpdate {
    base_url: Option<String>,
    callback_port: Option<u16>,
    default_view: Option<String>,
    theme: Option<ThemeVariant>,
}

impl SettingsUpdate {
    fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.callback_port.is_none()
            && self.default_view.is_none()
            && self.theme.is_none()
    }
}

fn handle_config_command(
    mut settings: Settings,
    update: SettingsUpdate,
    config_dir: Option<&PathBuf>,
) -> Result<()> {
    let dir = config_dir.context("Could not determine config directory")?;
    let path = settings::settings_path(dir);

    if !update.is_empty() {
        if let Some(view) = &update.default_view {
            resolve_view(view)?;
            settings.default_view = Some(view.clone());
        }
        if let Some(url) = update.base_url {
            settings.base_url = Some(url);
        }
        if let Some(port) = update.callback_port {
            settings.callback_port = Some(port);
        }
        if let Some(theme) = update.theme {
            settings.theme = Some(theme);
        }
        settings.save(&path)?;
        println!("Saved {}", path.display());
    } else {
        println!("# {}", path.display());
    }

    let content = toml::to_string_pretty(&settings).context("Failed to serialize settings")?;
    print!("{content}");
    Ok(())
}

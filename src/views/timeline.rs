use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::api::Post;
use crate::app::App;
use crate::catalog::ViewSelector;
use crate::help::timeline_help;
use crate::keys::{global_keymap, timeline_keymap};
use crate::session::SessionStatus;
use crate::theme::ResolvedTheme;
use crate::time::format_relative;
use crate::views::common::{render_error, render_message};
use crate::views::html::strip_html;
use crate::views::spinner::spinner_frame;
use crate::views::status_bar::{Flash, StatusBar};

/// Content lines shown per post before truncating.
const MAX_CONTENT_LINES: usize = 4;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // View tabs
        Constraint::Min(0),    // Post list
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_view_tabs(frame, app, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_view_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let catalog = app.feed.catalog();
    let mut spans: Vec<Span> = ViewSelector::all()
        .iter()
        .enumerate()
        .flat_map(|(i, view)| {
            let style = if *view == app.view {
                theme.active_tab_style()
            } else {
                theme.dim_style()
            };
            vec![
                Span::styled(format!("[{}]", i + 1), theme.dim_style()),
                Span::styled(catalog.label(*view), style),
                Span::raw("  "),
            ]
        })
        .collect();

    if app.load.should_show_spinner() && !app.gated {
        spans.push(Span::styled(
            spinner_frame(app.load.loading_start),
            theme.spinner_style(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let label = app.view_label();

    if app.gated {
        let message = if app.session.status == SessionStatus::Authenticating {
            format!("{label} needs a login. Waiting for the browser to finish.")
        } else {
            format!("{label} needs a login. Press i to log in.")
        };
        render_message(frame, label, &message, theme, area);
        return;
    }

    let posts = app.visible_posts();
    if posts.is_empty() {
        match &app.load.error {
            Some(err) if !app.load.loading => render_error(frame, err, theme, area),
            _ if app.load.loading => render_message(frame, label, "Loading...", theme, area),
            _ => render_message(frame, label, "No posts yet.", theme, area),
        }
        return;
    }

    let content_width = area.width.saturating_sub(6) as usize;
    let now = app.clock.now();
    let items: Vec<ListItem> = posts
        .iter()
        .map(|post| post_to_list_item(post, theme, now, content_width))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(format!("{label} ({})", posts.len())),
        )
        .highlight_style(theme.selection_style())
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn post_to_list_item(
    post: &Post,
    theme: &ResolvedTheme,
    now: DateTime<Utc>,
    width: usize,
) -> ListItem<'static> {
    let mut header = vec![
        Span::styled(
            post.account.name().to_string(),
            Style::default()
                .fg(theme.post_author)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" @{}", post.account.username),
            Style::default().fg(theme.post_handle),
        ),
    ];
    if let Some(ts) = post.created_unix() {
        header.push(Span::styled(
            format!(" · {}", format_relative(ts, now)),
            Style::default().fg(theme.post_time),
        ));
    }
    match post.media_attachments.len() {
        0 => {}
        1 => header.push(Span::styled(
            " [media]",
            Style::default().fg(theme.post_media),
        )),
        n => header.push(Span::styled(
            format!(" [{n} media]"),
            Style::default().fg(theme.post_media),
        )),
    }

    let mut lines = vec![Line::from(header)];
    lines.extend(
        wrap_content(&strip_html(&post.content), width)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(theme.foreground)))),
    );
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn wrap_content(text: &str, width: usize) -> Vec<String> {
    let width = width.max(10);
    let mut lines: Vec<String> = text
        .lines()
        .flat_map(|para| textwrap::wrap(para, width))
        .map(|line| line.into_owned())
        .collect();
    if lines.len() > MAX_CONTENT_LINES {
        lines.truncate(MAX_CONTENT_LINES);
        if let Some(last) = lines.last_mut() {
            last.push_str(" …");
        }
    }
    lines
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let keymap = global_keymap().extend(timeline_keymap());
    let help_text = timeline_help().format(&keymap, area.width >= 120);
    let handle = app.session.handle();
    let user = match app.session.status {
        SessionStatus::Authenticated => handle.as_deref().unwrap_or("logged in"),
        SessionStatus::Authenticating => "logging in...",
        SessionStatus::Anonymous => "anonymous",
    };
    let flash = match (&app.load.error, &app.load.notice) {
        (Some(err), _) => Some(Flash::Error(err)),
        (None, Some(notice)) => Some(Flash::Notice(notice)),
        (None, None) => None,
    };

    let mut bar = StatusBar::new(&app.theme)
        .label(app.view_label())
        .route(app.route)
        .user(user)
        .help(&help_text)
        .flash(flash);
    if app.load.loading && !app.visible_posts().is_empty() {
        bar = bar.loading("refreshing");
    }
    let count = app.visible_posts().len();
    if count > 0 {
        bar = bar.position(app.selected_index + 1, count);
    }
    bar.render(frame, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PostBuilder, TestAppBuilder, sample_posts};
    use crate::views::tests::render_to_string;

    fn draw(app: &App) -> String {
        render_to_string(100, 30, |frame| {
            render(frame, app, frame.area());
        })
    }

    #[test]
    fn test_timeline_renders_posts() {
        let app = TestAppBuilder::new().with_posts(sample_posts()).build();
        let output = draw(&app);

        assert!(output.contains("[1]Home"));
        assert!(output.contains("[5]Live"));
        assert!(output.contains("Eugen @gargron · 1d ago"));
        assert!(output.contains("Mastodon 4.3 is out! Check the release notes."));
        assert!(output.contains("Announcing Rust 1.83 & friends"));
        assert!(output.contains("/explore"));
        assert!(output.contains("1/5"));
        assert!(output.contains("anonymous"));
    }

    #[test]
    fn test_status_bar_tracks_selection() {
        let app = TestAppBuilder::new()
            .with_posts(sample_posts())
            .selected(2)
            .build();
        let output = draw(&app);
        assert!(output.contains("3/5"));
        assert!(!output.contains("1/5"));
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let app = TestAppBuilder::new().with_posts(sample_posts()).build();
        let output = draw(&app);
        assert!(output.contains("photos @photos"));
        assert!(output.contains("[media]"));
    }

    #[test]
    fn test_gated_view_shows_login_hint() {
        let app = TestAppBuilder::new()
            .view(ViewSelector::Recommended)
            .gated()
            .build();
        let output = draw(&app);
        assert!(output.contains("Recommended needs a login. Press i to log in."));
    }

    #[test]
    fn test_error_without_posts_renders_error_block() {
        let app = TestAppBuilder::new()
            .error("Network error: Could not reach the backend.")
            .build();
        let output = draw(&app);
        assert!(output.contains("Error"));
        assert!(output.contains("Could not reach the backend"));
    }

    #[test]
    fn test_error_with_posts_keeps_list() {
        let app = TestAppBuilder::new()
            .with_posts(sample_posts())
            .error("Server error. Please try again later.")
            .build();
        let output = draw(&app);
        assert!(output.contains("@gargron"));
        assert!(output.contains("Server error"));
    }

    #[test]
    fn test_loading_placeholder() {
        let app = TestAppBuilder::new().loading().build();
        assert!(draw(&app).contains("Loading..."));
    }

    #[test]
    fn test_authenticated_user_in_status_bar() {
        let app = TestAppBuilder::new()
            .token("tok")
            .user_name("alice")
            .with_posts(vec![PostBuilder::new().build()])
            .build();
        let output = draw(&app);
        assert!(output.contains("@alice"));
        assert!(output.contains("Home ("));
    }

    #[test]
    fn test_long_content_is_truncated() {
        let long = format!("<p>{}</p>", "word ".repeat(200));
        let app = TestAppBuilder::new()
            .with_posts(vec![PostBuilder::new().content(&long).build()])
            .build();
        assert!(draw(&app).contains("…"));
    }
}

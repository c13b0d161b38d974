use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::theme::ResolvedTheme;

/// Lines above the task list: feed, session and the task count.
const HEADER_LINES: usize = 3;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .title(" Debug ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.foreground_dim));

    let mut lines = vec![feed_line(app), session_line(app)];

    let tasks = &app.debug.running_tasks;
    lines.push(field(
        theme,
        "Tasks",
        tasks.len().to_string(),
        if tasks.is_empty() {
            theme.foreground
        } else {
            theme.spinner
        },
    ));
    for task in tasks {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  [{}] ", task.id),
                Style::default().fg(theme.foreground_dim),
            ),
            Span::styled(task.description.as_str(), Style::default().fg(theme.foreground)),
            Span::styled(
                format!(" ({:.1?})", task.started_at.elapsed()),
                Style::default().fg(theme.post_time),
            ),
        ]));
    }

    // Newest log entries in whatever rows remain inside the border.
    let rows = area.height.saturating_sub(2) as usize;
    let room = rows.saturating_sub(HEADER_LINES + tasks.len());
    lines.extend(app.debug.log.iter().rev().take(room).map(|entry| {
        Line::from(Span::styled(
            format!("  {}", entry.message),
            Style::default().fg(theme.foreground_dim),
        ))
    }));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn feed_line(app: &App) -> Line<'static> {
    let theme = &app.theme;
    let catalog = app.feed.catalog();
    let (pending, color) = match app.feed.pending() {
        Some(request) => (
            format!(
                "#{} {} in flight",
                request.generation,
                catalog.label(request.view)
            ),
            theme.spinner,
        ),
        None => ("idle".to_string(), theme.foreground),
    };
    let shown = app
        .shown_view
        .map_or("nothing", |view| catalog.label(view));

    let mut line = field(theme, "Feed", pending, color);
    line.spans.push(Span::styled(
        format!("  page {}  showing {shown}", app.feed.state().page_size()),
        Style::default().fg(theme.foreground_dim),
    ));
    line
}

fn session_line(app: &App) -> Line<'static> {
    let session = &app.session;
    let who = session.handle().unwrap_or_default();
    field(
        &app.theme,
        "Session",
        format!("{:?} {who}", session.status).trim_end().to_string(),
        app.theme.foreground,
    )
}

fn field(theme: &ResolvedTheme, label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(theme.foreground_dim)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ViewSelector;
    use crate::test_utils::{TestAppBuilder, anonymous_session};
    use crate::views::tests::render_to_string;

    fn draw(app: &App) -> String {
        render_to_string(80, 12, |frame| {
            render(frame, app, frame.area());
        })
    }

    #[test]
    fn test_debug_pane_shows_tasks_and_log() {
        let mut app = TestAppBuilder::new().build();
        let done = app.debug.start_task("Load Explore (limit 10)");
        app.debug.end_task(done, "discarded (stale)");
        app.debug.start_task("Load Live (limit 10)");

        let output = draw(&app);

        assert!(output.contains("Tasks: 1"));
        assert!(output.contains("Load Live (limit 10)"));
        assert!(output.contains("discarded (stale)"));
    }

    #[test]
    fn test_debug_pane_shows_pending_request() {
        let mut app = TestAppBuilder::new().build();
        assert!(draw(&app).contains("Feed: idle"));

        app.feed
            .load(ViewSelector::Explore, &anonymous_session())
            .unwrap();
        app.feed
            .load(ViewSelector::Live, &anonymous_session())
            .unwrap();

        let output = draw(&app);
        assert!(output.contains("Feed: #2 Live in flight"));
        assert!(output.contains("page 10"));
        assert!(output.contains("showing nothing"));
    }

    #[test]
    fn test_debug_pane_shows_session() {
        let app = TestAppBuilder::new().token("tok").user_name("alice").build();
        assert!(draw(&app).contains("Session: Authenticated @alice"));

        let app = TestAppBuilder::new().build();
        assert!(draw(&app).contains("Session: Anonymous"));
    }
}

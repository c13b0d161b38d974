//! Overlay for the enlarged media item.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::views::common::{centered_rect, dim_background};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(media) = app.viewer.current() else {
        return;
    };
    let theme = &app.theme;

    dim_background(frame, area);

    let mut lines = vec![
        Line::from(Span::styled(
            media.url.clone(),
            Style::default().fg(theme.post_media),
        )),
        Line::from(""),
    ];
    match media.description.as_deref().map(str::trim) {
        Some(description) if !description.is_empty() => {
            lines.push(Line::from(Span::styled(
                description.to_string(),
                Style::default().fg(theme.foreground),
            )));
        }
        _ => lines.push(Line::from(Span::styled("(no description)", theme.dim_style()))),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "o: open in browser   Esc: close",
        theme.dim_style(),
    )));

    let popup_width = area.width.saturating_sub(8).min(90);
    let popup_height = 10.min(area.height.saturating_sub(2));
    let popup_area = centered_rect(popup_width, popup_height, area);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title("Media")
                .title_style(theme.active_tab_style())
                .padding(Padding::horizontal(1)),
        ),
        popup_area,
    );
}

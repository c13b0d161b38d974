//! Help overlay view showing keybindings.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph},
};

use crate::app::App;
use crate::help::timeline_overlay_items;
use crate::keys::{global_keymap, timeline_keymap};
use crate::views::common::{centered_rect, dim_background};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if !app.show_help {
        return;
    }

    dim_background(frame, area);

    let theme = &app.theme;
    let keymap = global_keymap().extend(timeline_keymap());
    let formatted: Vec<(String, &str)> = timeline_overlay_items()
        .iter()
        .filter_map(|item| item.format_for_overlay(&keymap))
        .collect();

    let key_width = formatted.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let label_width = formatted.iter().map(|(_, l)| l.len()).max().unwrap_or(0);
    let content_width = key_width + 2 + label_width;
    let padding = 2;
    let popup_width = (content_width + 2 + padding * 2) as u16;
    let popup_height = (formatted.len() + 2 + 2) as u16;

    let popup_width = popup_width.min(area.width.saturating_sub(4));
    let popup_height = popup_height.min(area.height.saturating_sub(4));
    let popup_area = centered_rect(popup_width, popup_height, area);

    frame.render_widget(Clear, popup_area);

    let alt_row_style = Style::default().bg(theme.selection_bg);
    let lines: Vec<Line> = formatted
        .iter()
        .enumerate()
        .map(|(i, (keys, label))| {
            let base_style = if i % 2 == 1 {
                alt_row_style
            } else {
                Style::default()
            };
            let key_span = Span::styled(
                format!("{:>width$}", keys, width = key_width),
                theme.dim_style().patch(base_style),
            );
            let spacer = Span::styled("  ", base_style);
            let label_span = Span::styled(
                format!("{:<width$}", label, width = label_width),
                Style::default().fg(theme.foreground).patch(base_style),
            );
            Line::from(vec![key_span, spacer, label_span])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title("Help")
            .title_style(theme.active_tab_style())
            .padding(Padding::uniform(1)),
    );

    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestAppBuilder;
    use crate::views::tests::render_to_string;

    #[test]
    fn test_help_overlay_lists_bindings() {
        let app = TestAppBuilder::new().show_help().build();
        let output = render_to_string(80, 30, |frame| {
            render(frame, &app, frame.area());
        });

        assert!(output.contains("Help"));
        assert!(output.contains("show more posts"));
        assert!(output.contains("jump to view"));
        assert!(output.contains("log in"));
    }

    #[test]
    fn test_help_overlay_hidden_when_closed() {
        let app = TestAppBuilder::new().build();
        let output = render_to_string(80, 24, |frame| {
            render(frame, &app, frame.area());
        });
        assert!(output.trim().is_empty());
    }
}

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::ResolvedTheme;

/// A transient message shown at the right of the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash<'a> {
    Notice(&'a str),
    Error(&'a str),
}

/// Builder for the status bar.
///
/// Layout: `[Label] route | Position | User | Help ... Flash`
pub struct StatusBar<'a> {
    theme: &'a ResolvedTheme,
    label: &'a str,
    route: Option<&'a str>,
    loading_text: Option<&'a str>,
    position: Option<(usize, usize)>,
    user: Option<&'a str>,
    help_text: &'a str,
    flash: Option<Flash<'a>>,
}

impl<'a> StatusBar<'a> {
    pub fn new(theme: &'a ResolvedTheme) -> Self {
        Self {
            theme,
            label: "",
            route: None,
            loading_text: None,
            position: None,
            user: None,
            help_text: "",
            flash: None,
        }
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    pub fn route(mut self, route: &'a str) -> Self {
        self.route = Some(route);
        self
    }

    pub fn loading(mut self, text: &'a str) -> Self {
        self.loading_text = Some(text);
        self
    }

    pub fn position(mut self, current: usize, total: usize) -> Self {
        self.position = Some((current, total));
        self
    }

    pub fn user(mut self, user: &'a str) -> Self {
        self.user = Some(user);
        self
    }

    pub fn help(mut self, text: &'a str) -> Self {
        self.help_text = text;
        self
    }

    pub fn flash(mut self, flash: Option<Flash<'a>>) -> Self {
        self.flash = flash;
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let dim = Style::default().fg(self.theme.foreground_dim);
        let mut spans = vec![
            Span::styled(format!(" {} ", self.label), self.theme.status_bar_style()),
            Span::raw(" "),
        ];

        if let Some(route) = self.route {
            spans.push(Span::styled(route.to_string(), dim));
            spans.push(Span::raw(" | "));
        }

        if let Some(loading) = self.loading_text {
            spans.push(Span::styled(loading.to_string(), self.theme.spinner_style()));
            spans.push(Span::raw(" | "));
        }

        if let Some((current, total)) = self.position {
            spans.push(Span::styled(format!("{}/{}", current, total), dim));
            spans.push(Span::raw(" | "));
        }

        if let Some(user) = self.user {
            spans.push(Span::styled(
                user.to_string(),
                Style::default().fg(self.theme.post_handle),
            ));
            spans.push(Span::raw(" | "));
        }

        spans.push(Span::styled(self.help_text.to_string(), dim));

        let Some(flash) = self.flash else {
            frame.render_widget(Paragraph::new(Line::from(spans)), area);
            return;
        };

        let (text, style) = match flash {
            Flash::Notice(text) => (text, self.theme.success_style()),
            Flash::Error(text) => (text, self.theme.error_style()),
        };
        let flash_width = (text.width() as u16 + 1).min(area.width / 2);
        let chunks =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(flash_width)]).split(area);
        frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!("{text} "), style))),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{ThemeVariant, default_for_variant};
    use crate::views::tests::render_to_string;

    #[test]
    fn test_status_bar_full() {
        let theme = default_for_variant(ThemeVariant::Dark);
        let output = render_to_string(80, 1, |frame| {
            StatusBar::new(&theme)
                .label("Explore")
                .route("/explore")
                .position(5, 10)
                .user("@alice")
                .help("?:help")
                .render(frame, frame.area());
        });

        assert!(output.contains("Explore"));
        assert!(output.contains("/explore"));
        assert!(output.contains("5/10"));
        assert!(output.contains("@alice"));
        assert!(output.contains("?:help"));
    }

    #[test]
    fn test_status_bar_with_loading() {
        let theme = default_for_variant(ThemeVariant::Dark);
        let output = render_to_string(60, 1, |frame| {
            StatusBar::new(&theme)
                .label("Live")
                .loading("Loading...")
                .help("?:help")
                .render(frame, frame.area());
        });

        assert!(output.contains("Live"));
        assert!(output.contains("Loading"));
    }

    #[test]
    fn test_status_bar_flash_is_right_aligned() {
        let theme = default_for_variant(ThemeVariant::Dark);
        let output = render_to_string(60, 1, |frame| {
            StatusBar::new(&theme)
                .label("Home")
                .help("q:quit")
                .flash(Some(Flash::Error("Server error")))
                .render(frame, frame.area());
        });

        assert!(output.contains("q:quit"));
        assert!(output.trim_end().ends_with("Server error"));
    }
}

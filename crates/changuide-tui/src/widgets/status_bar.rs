use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Focus};
use crate::theme::GruvboxMaterial;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let focus_str = match app.focus {
            Focus::Featured => "Featured",
            Focus::Listing => "Channels",
            Focus::Genres => "Genres",
            Focus::Detail => "Detail",
        };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            format!(
                " {} | Channels: {} | Cached: {}",
                focus_str,
                app.pager.items().len(),
                app.hover.cache().len()
            )
        };

        let spinner = format!(" {} ", app.indicator.frame(app.ticks));
        let help_hint = " q:quit tab:panel j/k:move h/l:featured m:more a:add 0-5:rate ";
        let used = status_text.chars().count() + spinner.chars().count() + help_hint.len();
        let padding_len = (area.width as usize).saturating_sub(used);

        let status_color = if app.status_message.is_some() {
            GruvboxMaterial::YELLOW
        } else {
            GruvboxMaterial::FG0
        };

        let line = Line::from(vec![
            Span::styled(
                spinner,
                Style::default().fg(GruvboxMaterial::BLUE).bg(GruvboxMaterial::BG2),
            ),
            Span::styled(
                status_text,
                Style::default().fg(status_color).bg(GruvboxMaterial::BG2),
            ),
            Span::styled(" ".repeat(padding_len), Style::default().bg(GruvboxMaterial::BG2)),
            Span::styled(
                help_hint,
                Style::default()
                    .fg(GruvboxMaterial::GREY2)
                    .bg(GruvboxMaterial::BG2),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

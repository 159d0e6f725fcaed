use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use changuide_core::api::strip_tags;

use crate::app::{App, Focus};
use crate::queue::QueueBadge;
use crate::rating::rating_count_line;
use crate::theme::GruvboxMaterial;

use super::{star_spans, truncate_to_width};

pub struct DetailWidget;

impl DetailWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let Some(detail) = &app.detail else {
            return;
        };
        let is_focused = app.focus == Focus::Detail;
        let border_style = if is_focused {
            Style::default().fg(GruvboxMaterial::ACCENT)
        } else {
            Style::default().fg(GruvboxMaterial::GREY0)
        };
        let channel = &detail.channel;
        let panel = &detail.panel;

        let subscribe_style = if panel.is_updating() {
            Style::default().fg(GruvboxMaterial::GREY2)
        } else {
            Style::default()
                .fg(GruvboxMaterial::GREEN)
                .add_modifier(Modifier::BOLD)
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("[s] ", subscribe_style),
                Span::styled(panel.label(), subscribe_style),
                Span::raw("   "),
            ]),
            Line::from(star_spans(&detail.rating)),
        ];
        if let Some(count) = rating_count_line(channel) {
            lines.push(Line::from(Span::styled(count, Style::default().fg(GruvboxMaterial::GREY2))));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            strip_tags(&channel.description),
            Style::default().fg(GruvboxMaterial::FG0),
        )));
        lines.push(Line::default());

        let width = area.width.saturating_sub(16) as usize;
        for (i, (toggle, item)) in panel
            .items()
            .iter()
            .zip(channel.item.iter().filter(|item| item.id.is_some()))
            .enumerate()
        {
            let cursor = if i == detail.selected && is_focused { ">" } else { " " };
            let date = item
                .published()
                .map(|d| d.format("%Y-%m-%d ").to_string())
                .unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(cursor, Style::default().fg(GruvboxMaterial::ACCENT)),
                Self::badge(toggle.badge()),
                Span::styled(date, Style::default().fg(GruvboxMaterial::GREY0)),
                Span::styled(
                    truncate_to_width(&item.name, width),
                    Style::default().fg(GruvboxMaterial::FG0),
                ),
            ]));
        }

        let block = Block::default()
            .title(format!(" {} ", channel.name))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(GruvboxMaterial::BG0));
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn badge(badge: QueueBadge) -> Span<'static> {
        let color = match (badge.active, badge.dimmed, badge.label) {
            (_, true, _) => GruvboxMaterial::GREY0,
            (_, _, "Error") => GruvboxMaterial::RED,
            (false, _, _) => GruvboxMaterial::BLUE,
            (true, _, "Queued") => GruvboxMaterial::GREEN,
            _ => GruvboxMaterial::YELLOW,
        };
        Span::styled(format!(" [{:<11}] ", badge.label), Style::default().fg(color))
    }
}

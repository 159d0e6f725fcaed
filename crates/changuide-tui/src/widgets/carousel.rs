use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::carousel::CarouselConfigExt;
use crate::theme::GruvboxMaterial;

use super::truncate_to_width;

pub struct CarouselWidget;

impl CarouselWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let is_focused = app.focus == Focus::Featured;
        let border_style = if is_focused {
            Style::default().fg(GruvboxMaterial::ACCENT)
        } else {
            Style::default().fg(GruvboxMaterial::GREY0)
        };

        let manual = if app.carousel.is_manual() { "" } else { " [auto]" };
        let block = Block::default()
            .title(format!(" Featured{} ", manual))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(GruvboxMaterial::BG0));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if app.featured.is_empty() {
            let hint = Paragraph::new(Span::styled(
                "Loading featured channels...",
                Style::default().fg(GruvboxMaterial::GREY2),
            ));
            frame.render_widget(hint, inner);
            return;
        }

        let item_width = app.carousel.config().item_width_f64();
        let offset = app.carousel.offset();

        for index in app.carousel.visible_range() {
            let Some(channel) = app.featured.get(index) else {
                continue;
            };
            // card position relative to the strip, in columns
            let left = index as f64 * item_width - offset;
            let right = left + item_width;
            let clip_left = left.max(0.0).round() as u16;
            let clip_right = (right.round().max(0.0) as u16).min(inner.width);
            if clip_right <= clip_left + 2 {
                continue;
            }

            let card = Rect::new(inner.x + clip_left, inner.y, clip_right - clip_left, inner.height);
            let text_width = card.width.saturating_sub(2) as usize;
            let lines = vec![
                Line::from(Span::styled(
                    truncate_to_width(&channel.name, text_width),
                    Style::default()
                        .fg(GruvboxMaterial::YELLOW)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    channel.description.clone(),
                    Style::default().fg(GruvboxMaterial::FG0),
                )),
            ];
            let paragraph = Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::LEFT | Borders::RIGHT)
                        .border_style(Style::default().fg(GruvboxMaterial::BG2)),
                )
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, card);
        }
    }
}

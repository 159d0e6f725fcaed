use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::hover::Region;
use crate::theme::GruvboxMaterial;

use super::truncate_to_width;

pub struct ChannelListWidget;

impl ChannelListWidget {
    /// Draw the listing; returns the trigger area of every visible card
    pub fn render(frame: &mut Frame, area: Rect, app: &App) -> Vec<(Rect, Region)> {
        let is_focused = app.focus == Focus::Listing;
        let border_style = if is_focused {
            Style::default().fg(GruvboxMaterial::ACCENT)
        } else {
            Style::default().fg(GruvboxMaterial::GREY0)
        };

        let page = app
            .current_page_label()
            .map(|p| format!(" - page {}", p))
            .unwrap_or_default();
        let block = Block::default()
            .title(format!(" Channels ({}){} ", app.pager.items().len(), page))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(GruvboxMaterial::BG0));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let item_height = app.pager.config().item_height.max(1);
        let width = inner.width as usize;
        let mut lines: Vec<Line> = Vec::new();
        let mut triggers = Vec::new();

        for (i, item) in app.pager.items().iter().enumerate() {
            let selected = i == app.selected_item;
            let title_style = if selected && is_focused {
                Style::default()
                    .fg(GruvboxMaterial::FG0)
                    .bg(GruvboxMaterial::SELECTION)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(GruvboxMaterial::YELLOW)
            };
            let marker = if item.anchor.is_some() { "§" } else { " " };

            let mut card = vec![Line::from(vec![
                Span::styled(marker, Style::default().fg(GruvboxMaterial::GREY0)),
                Span::styled(truncate_to_width(&item.title, width.saturating_sub(1)), title_style),
            ])];
            let body: String = item.text.split_whitespace().collect::<Vec<_>>().join(" ");
            card.push(Line::from(Span::styled(
                format!(" {}", truncate_to_width(&body, width.saturating_sub(1))),
                Style::default().fg(GruvboxMaterial::GREY2),
            )));
            card.resize(item_height as usize, Line::default());
            lines.extend(card);

            if let Some(id) = item.channel_id {
                let top = i as u32 * item_height;
                if let Some(rect) = visible_rows(inner, app.list_scroll, top, item_height) {
                    triggers.push((rect, Region::Trigger(id)));
                }
            }
        }

        lines.push(Self::footer(app));

        let paragraph = Paragraph::new(lines).scroll((app.list_scroll.min(u32::from(u16::MAX)) as u16, 0));
        frame.render_widget(paragraph, inner);
        triggers
    }

    fn footer(app: &App) -> Line<'static> {
        if app.pager.is_loading() {
            return Line::from(Span::styled(
                " Loading more channels...",
                Style::default().fg(GruvboxMaterial::BLUE),
            ));
        }
        if app.pager.last_error().is_some() && app.pager.load_more_visible() {
            return Line::from(Span::styled(
                " Could not load more. [m] try again",
                Style::default().fg(GruvboxMaterial::RED),
            ));
        }
        if app.pager.load_more_visible() {
            return Line::from(Span::styled(
                " [m] load more",
                Style::default().fg(GruvboxMaterial::GREY2),
            ));
        }
        let pages = app
            .pager
            .paginator()
            .map(|p| {
                p.links
                    .iter()
                    .map(|l| if l.selected { format!("[{}]", l.label) } else { l.label.clone() })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        Line::from(Span::styled(format!(" {}", pages), Style::default().fg(GruvboxMaterial::GREY0)))
    }
}

/// Screen rows of a card spanning `top..top + height` content rows, if any are visible
fn visible_rows(inner: Rect, scroll: u32, top: u32, height: u32) -> Option<Rect> {
    let view_end = scroll + u32::from(inner.height);
    let start = top.max(scroll);
    let end = (top + height).min(view_end);
    if start >= end {
        return None;
    }
    Some(Rect::new(
        inner.x,
        inner.y + (start - scroll) as u16,
        inner.width,
        (end - start) as u16,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_rows_clips_to_viewport() {
        let inner = Rect::new(1, 1, 40, 10);
        assert_eq!(visible_rows(inner, 0, 0, 3), Some(Rect::new(1, 1, 40, 3)));
        assert_eq!(visible_rows(inner, 4, 3, 3), Some(Rect::new(1, 1, 40, 2)));
        assert_eq!(visible_rows(inner, 0, 9, 3), Some(Rect::new(1, 10, 40, 1)));
        assert_eq!(visible_rows(inner, 0, 12, 3), None);
    }
}

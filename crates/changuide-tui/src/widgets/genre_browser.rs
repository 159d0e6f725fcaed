use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::genre::GenreSlot;
use crate::theme::GruvboxMaterial;

use super::{star_spans, truncate_to_width};

pub struct GenreBrowserWidget;

impl GenreBrowserWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let is_focused = app.focus == Focus::Genres;
        let border_style = if is_focused {
            Style::default().fg(GruvboxMaterial::ACCENT)
        } else {
            Style::default().fg(GruvboxMaterial::GREY0)
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let selected = app.genres.selected();
        let items: Vec<ListItem> = app
            .genres
            .genres()
            .iter()
            .map(|genre| {
                let style = if Some(genre.as_str()) == selected {
                    Style::default()
                        .fg(GruvboxMaterial::YELLOW)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(GruvboxMaterial::FG0)
                };
                ListItem::new(Line::from(Span::styled(genre.clone(), style)))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Genres ")
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .style(Style::default().bg(GruvboxMaterial::BG0)),
            )
            .highlight_style(Style::default().bg(GruvboxMaterial::SELECTION));
        let mut state = ListState::default();
        if is_focused {
            state.select(Some(app.selected_genre));
        }
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let title = match app.genres.view_all_href() {
            Some(_) => format!(" {} - [v] view all ", selected.unwrap_or_default()),
            None => " Pick a genre ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(GruvboxMaterial::BG0));
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);

        let width = inner.width as usize;
        let mut lines = Vec::new();
        for (i, slot) in app.genres.slots().iter().enumerate() {
            let heading = if i < 2 { "Popular" } else { "Newest" };
            match slot {
                Some(slot) => lines.extend(Self::slot_lines(slot, heading, width)),
                None => lines.push(Line::from(Span::styled(
                    format!("{}: -", heading),
                    Style::default().fg(GruvboxMaterial::GREY0),
                ))),
            }
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn slot_lines(slot: &GenreSlot, heading: &str, width: usize) -> Vec<Line<'static>> {
        let hd = if slot.hi_def { " HD" } else { "" };
        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{}: ", heading), Style::default().fg(GruvboxMaterial::GREY2)),
            Span::styled(
                truncate_to_width(&slot.name, width.saturating_sub(heading.len() + 5)),
                Style::default().fg(GruvboxMaterial::YELLOW),
            ),
            Span::styled(hd, Style::default().fg(GruvboxMaterial::BLUE)),
        ])];

        let mut meta = Vec::new();
        if let Some(rating) = &slot.rating {
            meta.extend(star_spans(rating));
            meta.push(Span::raw(" "));
        }
        if let Some(subscribers) = slot.subscribers_line() {
            meta.push(Span::styled(subscribers, Style::default().fg(GruvboxMaterial::GREEN)));
        }
        if !meta.is_empty() {
            lines.push(Line::from(meta));
        }
        lines
    }
}

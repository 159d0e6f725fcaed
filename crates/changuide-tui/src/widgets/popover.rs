use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::hover::{PopoverView, Region, Side};
use crate::theme::GruvboxMaterial;

use super::star_spans;

const POPOVER_WIDTH: u16 = 48;
const POPOVER_HEIGHT: u16 = 16;

pub struct PopoverWidget;

impl PopoverWidget {
    /// Draw the visible popover beside its trigger; returns its area
    pub fn render(frame: &mut Frame, triggers: &[(Rect, Region)], app: &App) -> Option<(Rect, Region)> {
        let (id, view) = app.popover_view()?;
        let side = app.hover.popover(id)?.side;
        let trigger = triggers
            .iter()
            .find(|(_, region)| *region == Region::Trigger(id))
            .map(|(rect, _)| *rect)?;

        let area = place(trigger, side, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", view.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(GruvboxMaterial::ACCENT))
            .style(Style::default().bg(GruvboxMaterial::BG1));
        let paragraph = Paragraph::new(Self::lines(&view))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        Some((area, Region::Popover(id)))
    }

    fn lines(view: &PopoverView) -> Vec<Line<'static>> {
        let key = Style::default()
            .fg(GruvboxMaterial::GREEN)
            .add_modifier(Modifier::BOLD);
        let label = Style::default().fg(GruvboxMaterial::FG0);

        let mut actions = vec![Span::styled("[a]", key), Span::styled(" Add to Sidebar ", label)];
        for action in &view.actions[1..] {
            let hotkey = match action {
                crate::hover::PopoverAction::MoreDetails(_) => "[o]",
                _ => "[w]",
            };
            actions.push(Span::styled(hotkey, key));
            actions.push(Span::styled(format!(" {} ", action.label()), label));
        }

        let mut stars = star_spans(&view.rating);
        stars.push(Span::styled(
            format!("  {}  [0-5] rate", view.rating.title()),
            Style::default().fg(GruvboxMaterial::GREY2),
        ));

        let mut lines = vec![Line::from(actions), Line::from(stars)];
        if let Some(count) = &view.count_line {
            lines.push(Line::from(Span::styled(
                count.clone(),
                Style::default().fg(GruvboxMaterial::GREY2),
            )));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(view.description.clone(), label)));
        for extra in [view.genres_line(), view.tags_line()].into_iter().flatten() {
            lines.push(Line::from(Span::styled(
                extra,
                Style::default().fg(GruvboxMaterial::BLUE),
            )));
        }
        lines
    }
}

/// Open beside the middle of the trigger, away from the nearer screen edge
fn place(trigger: Rect, side: Side, screen: Rect) -> Rect {
    let width = POPOVER_WIDTH.min(screen.width);
    let height = POPOVER_HEIGHT.min(screen.height);
    let anchor = trigger.x + trigger.width / 2;
    let x = match side {
        Side::Left => anchor.min(screen.width.saturating_sub(width)),
        Side::Right => anchor.saturating_sub(width),
    };
    let y = (trigger.y + trigger.height).min(screen.height.saturating_sub(height));
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_by_side() {
        let screen = Rect::new(0, 0, 120, 40);
        let trigger = Rect::new(0, 5, 60, 3);
        assert_eq!(place(trigger, Side::Left, screen).x, 30);
        assert_eq!(place(trigger, Side::Right, screen).x, 0);
        assert_eq!(place(trigger, Side::Left, screen).y, 8);

        let low = Rect::new(0, 38, 60, 2);
        assert_eq!(place(low, Side::Left, screen).y, 24);
    }
}

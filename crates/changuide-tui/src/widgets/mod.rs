mod carousel;
mod channel_list;
mod detail;
mod genre_browser;
mod popover;
mod status_bar;

pub use carousel::CarouselWidget;
pub use channel_list::ChannelListWidget;
pub use detail::DetailWidget;
pub use genre_browser::GenreBrowserWidget;
pub use popover::PopoverWidget;
pub use status_bar::StatusBarWidget;

use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::rating::{StarFill, StarRating};
use crate::theme::GruvboxMaterial;

/// Cut `text` to at most `width` terminal columns, marking the cut with an ellipsis
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            if width > 0 {
                // make room for the ellipsis
                while used + 1 > width {
                    match out.pop() {
                        Some(last) => used -= last.width().unwrap_or(0),
                        None => break,
                    }
                }
                out.push('…');
            }
            return out;
        }
        used += w;
        out.push(c);
    }
    out
}

pub(crate) fn star_spans(rating: &StarRating) -> Vec<Span<'static>> {
    rating
        .stars()
        .iter()
        .map(|fill| match fill {
            StarFill::Full => Span::styled("★", Style::default().fg(GruvboxMaterial::YELLOW)),
            StarFill::Hover => Span::styled("★", Style::default().fg(GruvboxMaterial::ORANGE)),
            StarFill::Partial(p) if *p >= 50 => {
                Span::styled("⯪", Style::default().fg(GruvboxMaterial::YELLOW))
            }
            StarFill::Partial(_) | StarFill::Empty => {
                Span::styled("☆", Style::default().fg(GruvboxMaterial::GREY0))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}

//! Listing page fragment parsing
//!
//! Listing pages carry their results in `<ul class="scrolling">` lists and a
//! `<ul class="paginator">` control whose entry after the selected one links
//! to the next page. Result cards and paginator entries are flat `<li>`
//! elements, so a handful of regular expressions is enough to pull them out.

use std::sync::OnceLock;

use regex::Regex;

use super::models::{ListItem, PageFragment, PageLink, Paginator};
use crate::{Error, Result};

/// Width used when flattening card HTML to text
const CARD_TEXT_WIDTH: usize = 80;

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"))
}

fn body_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<body[^>]*>(.*)</body\s*>").expect("valid regex"))
}

fn list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<ul\b[^>]*class\s*=\s*"([^"]*)"[^>]*>(.*?)</ul\s*>"#).expect("valid regex")
    })
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<li\b([^>]*)>(.*?)</li\s*>").expect("valid regex"))
}

fn class_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)class\s*=\s*"([^"]*)""#).expect("valid regex"))
}

fn hover_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bhover_(\d+)\b").expect("valid regex"))
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h4[^>]*>(.*?)</h4\s*>").expect("valid regex"))
}

fn anchor_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)<a\b[^>]*\bname\s*=\s*"(\d+)""#).expect("valid regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*\bhref\s*=\s*"([^"]*)"[^>]*>(.*?)</a\s*>"#).expect("valid regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

/// Remove all markup from a snippet
pub fn strip_tags(html: &str) -> String {
    tag_re().replace_all(html, "").into_owned()
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)&(#[0-9]+|#x[0-9a-f]+|amp|quot|apos|lt|gt|nbsp);").expect("valid regex")
    })
}

/// Decode character references in one pass, so `&amp;lt;` stays `&lt;`
fn decode_entities(text: &str) -> String {
    entity_re()
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name.to_ascii_lowercase().as_str() {
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "nbsp" => Some(' '),
                other => {
                    let code = match other.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => other[1..].parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn has_class(classes: &str, name: &str) -> bool {
    classes.split_whitespace().any(|c| c == name)
}

fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), CARD_TEXT_WIDTH)
        .unwrap_or_else(|_| strip_tags(html))
        .trim()
        .to_string()
}

/// Parse a listing page (full document or fragment)
///
/// Returns `Error::Malformed` when the page has no result list at all.
/// A page without a paginator, or whose selected entry is last, has no
/// next page.
pub fn parse_page_fragment(html: &str) -> Result<PageFragment> {
    let cleaned = script_re().replace_all(html, "");
    let body = body_re()
        .captures(&cleaned)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| cleaned.to_string());

    let mut found_list = false;
    let mut items = Vec::new();
    let mut paginator = None;

    for caps in list_re().captures_iter(&body) {
        let classes = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let inner = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        if has_class(classes, "scrolling") {
            found_list = true;
            items.extend(parse_items(inner));
        } else if paginator.is_none()
            && (has_class(classes, "paginator") || has_class(classes, "paginator2"))
        {
            paginator = Some(parse_paginator(inner));
        }
    }

    if !found_list {
        return Err(Error::Malformed(
            "listing page has no result list".to_string(),
        ));
    }

    let next_page_url = paginator
        .as_ref()
        .and_then(|p| p.next_href())
        .map(str::to_string);

    tracing::debug!(
        items = items.len(),
        has_next = next_page_url.is_some(),
        "Parsed listing page"
    );

    Ok(PageFragment {
        items,
        paginator,
        next_page_url,
    })
}

fn parse_items(list_html: &str) -> Vec<ListItem> {
    item_re()
        .captures_iter(list_html)
        .filter_map(|caps| {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let inner = caps.get(2).map(|m| m.as_str()).unwrap_or("");

            let li_classes = class_attr_re()
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .unwrap_or("");
            if has_class(li_classes, "tip") {
                return None;
            }

            Some(parse_item(inner))
        })
        .collect()
}

fn parse_item(inner: &str) -> ListItem {
    let channel_id = hover_id_re()
        .captures(inner)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());

    let title = heading_re()
        .captures(inner)
        .and_then(|c| c.get(1))
        .or_else(|| link_re().captures(inner).and_then(|c| c.get(2)))
        .map(|m| decode_entities(strip_tags(m.as_str()).trim()))
        .unwrap_or_default();

    let anchor = anchor_name_re()
        .captures(inner)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());

    ListItem {
        channel_id,
        title,
        text: html_to_text(inner),
        anchor,
    }
}

fn parse_paginator(list_html: &str) -> Paginator {
    let links = item_re()
        .captures_iter(list_html)
        .map(|caps| {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let inner = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let selected = class_attr_re()
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| has_class(m.as_str(), "selected"))
                .unwrap_or(false);
            let href = link_re()
                .captures(inner)
                .and_then(|c| c.get(1))
                .map(|m| decode_entities(m.as_str()));

            PageLink {
                label: decode_entities(strip_tags(inner).trim()),
                href,
                selected,
            }
        })
        .collect();

    Paginator { links }
}

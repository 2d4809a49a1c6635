//! Extraction from scheduler HTML pages
//!
//! Only two fragments are needed: the room color legend on the scheduler view
//! and the description field on a booking page. Tags are located with regular
//! expressions; element extents are found by counting nested open and close
//! tags of the same name, so an element's text covers its whole subtree.

use hallmaster_common::models::EMPTY_DESCRIPTION;
use hallmaster_common::{Error, Result, RoomDirectoryEntry};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

static ROOM_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bid\s*=\s*["']RoomColorList["']"#).expect("valid regex"));

/// Any open, close or self-closing tag: (slash, name, attributes, self-close)
static TAG_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9-]*)([^>]*?)(/?)>").expect("valid regex")
});

static ONCLICK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bonclick\s*=").expect("valid regex"));

static SET_ROOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"setRoom\(\s*(\d+)\s*\)").expect("valid regex"));

static BACKGROUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)background-color\s*:\s*(#[a-f0-9]+)\s*!important\s*;").expect("valid regex")
});

static DESCRIPTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<label\b[^>]*\bfor\s*=\s*["']Description["'][^>]*>"#).expect("valid regex")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));

/// Elements that never have a closing tag
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_opening(tag: &Captures) -> bool {
    let name = tag[2].to_ascii_lowercase();
    tag[1].is_empty() && tag[4].is_empty() && !VOID_ELEMENTS.contains(&name.as_str())
}

fn tag_end(tag: &Captures) -> usize {
    tag.get(0).map_or(0, |m| m.end())
}

/// Inner markup of the `name` element whose opening tag ends at `content_start`
///
/// Runs to the end of `html` when the element is never closed.
fn inner_markup<'h>(html: &'h str, name: &str, content_start: usize) -> &'h str {
    let mut depth = 1usize;

    for tag in TAG_TOKEN.captures_iter(&html[content_start..]) {
        if !tag[2].eq_ignore_ascii_case(name) {
            continue;
        }
        if !tag[1].is_empty() {
            depth -= 1;
            if depth == 0 {
                let end = content_start + tag.get(0).map_or(0, |m| m.start());
                return &html[content_start..end];
            }
        } else if is_opening(&tag) {
            depth += 1;
        }
    }

    &html[content_start..]
}

/// Inner markup of the innermost element still open at `position`
///
/// The whole document when `position` is at top level.
fn enclosing_markup(html: &str, position: usize) -> &str {
    let mut open: Vec<(String, usize)> = Vec::new();

    for tag in TAG_TOKEN.captures_iter(&html[..position]) {
        let name = tag[2].to_ascii_lowercase();
        if !tag[1].is_empty() {
            if let Some(index) = open.iter().rposition(|(n, _)| *n == name) {
                open.truncate(index);
            }
        } else if is_opening(&tag) {
            open.push((name, tag_end(&tag)));
        }
    }

    match open.pop() {
        Some((name, content_start)) => inner_markup(html, &name, content_start),
        None => html,
    }
}

/// Extract the room legend from the scheduler view page
///
/// Every element inside the `RoomColorList` container whose `onclick` calls
/// `setRoom(<id>)` is a room; its style carries the color and its text the
/// room name.
///
/// # Errors
/// `Validation` if the legend is missing, or a room entry has no color.
pub fn parse_room_directory(html: &str) -> Result<Vec<RoomDirectoryEntry>> {
    let missing = || Error::Validation("Scheduler page has no RoomColorList element".to_string());

    let anchor = ROOM_LIST.find(html).ok_or_else(missing)?;
    let tag_start = html[..anchor.start()].rfind('<').ok_or_else(missing)?;
    let container = TAG_TOKEN
        .captures(&html[tag_start..])
        .filter(|tag| tag.get(0).map_or(false, |m| m.start() == 0))
        .ok_or_else(missing)?;
    let legend = inner_markup(html, &container[2], tag_start + tag_end(&container));

    let mut rooms = Vec::new();

    for tag in TAG_TOKEN.captures_iter(legend) {
        if !tag[1].is_empty() {
            continue;
        }
        let attributes = &tag[3];
        if !ONCLICK.is_match(attributes) {
            continue;
        }
        let Some(id) = SET_ROOM.captures(attributes) else {
            continue;
        };
        let id: u32 = id[1]
            .parse()
            .map_err(|e| Error::Validation(format!("Room id '{}' out of range: {}", &id[1], e)))?;

        let color_key = BACKGROUND
            .captures(attributes)
            .map(|c| c[1].to_string())
            .ok_or_else(|| Error::Validation(format!("Room {} has no background color", id)))?;

        let name = if is_opening(&tag) {
            element_text(inner_markup(legend, &tag[2], tag_end(&tag)))
        } else {
            String::new()
        };
        debug!(room_id = id, name = %name, color = %color_key, "Found room legend entry");

        rooms.push(RoomDirectoryEntry {
            id,
            name,
            color_key,
        });
    }

    Ok(rooms)
}

/// Extract the description text from a booking page
///
/// The text of the first `div` inside the `Description` label's parent,
/// trimmed. Pages without the label yield [`EMPTY_DESCRIPTION`].
pub fn parse_description(html: &str) -> String {
    let Some(label) = DESCRIPTION_LABEL.find(html) else {
        return EMPTY_DESCRIPTION.to_string();
    };

    let parent = enclosing_markup(html, label.start());
    let value = TAG_TOKEN
        .captures_iter(parent)
        .find(|tag| is_opening(tag) && tag[2].eq_ignore_ascii_case("div"));

    match value {
        Some(div) => element_text(inner_markup(parent, "div", tag_end(&div))),
        None => {
            debug!("Description label without a value element");
            EMPTY_DESCRIPTION.to_string()
        }
    }
}

/// Text content of a markup fragment: tags removed, entities decoded, trimmed
pub fn element_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    ENTITY
        .replace_all(&stripped, |caps: &Captures| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .trim()
        .to_string()
}

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

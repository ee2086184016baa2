// src/extract/fields.rs

//! Field extractors: small deterministic mappings from nodes to values.

use crate::dom::{Node, collapse_whitespace};
use crate::models::{HorseRecord, PrizeRecord, RowMarkers};

/// Rendered text of an optional node.
pub fn text_of(node: Option<Node<'_>>) -> Option<String> {
    node.map(|n| n.text())
}

/// Split the finishing position from the draw annotation rendered inside it.
///
/// With both texts present the draw text is removed from the position text,
/// and the draw loses its parentheses. With only one present it is taken
/// as is.
pub fn split_position_draw(
    position: Option<&str>,
    draw: Option<&str>,
) -> (Option<String>, Option<String>) {
    match (position, draw) {
        (Some(position), Some(draw)) => {
            let position = if draw.is_empty() {
                position.trim().to_string()
            } else {
                position.replace(draw, "").trim().to_string()
            };
            let draw = draw.replace(['(', ')'], "").trim().to_string();
            (Some(position), Some(draw))
        }
        (position, draw) => (
            position.map(|p| p.trim().to_string()),
            draw.map(|d| d.trim().to_string()),
        ),
    }
}

/// Remove each child's own text from `full`, once per child, in order.
///
/// Child text follows the bare name, so the last occurrence is the one
/// removed. Empty child texts are skipped.
pub fn strip_child_texts<'s>(full: &str, children: impl IntoIterator<Item = &'s str>) -> String {
    let mut text = full.to_string();
    for child in children {
        if child.is_empty() {
            continue;
        }
        if let Some(at) = text.rfind(child) {
            text.replace_range(at..at + child.len(), "");
        }
    }
    collapse_whitespace(&text)
}

/// Horse name with the text of its element children (titles, flags) removed.
pub fn clean_name(name: Node<'_>) -> String {
    let children: Vec<String> = name.children().iter().map(|c| c.text()).collect();
    strip_child_texts(&name.text(), children.iter().map(String::as_str))
}

/// Pair whitespace tokens as `label amount label amount ...`.
///
/// A trailing unpaired token is dropped.
pub fn parse_prize(text: &str) -> PrizeRecord {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut prize = PrizeRecord::new();
    for pair in tokens.chunks_exact(2) {
        prize.push(pair[0], pair[1]);
    }
    prize
}

/// Footnote item text without the titles of its embedded icons.
///
/// Icons sit two levels below the item.
pub fn clean_footnote(item: Node<'_>, icon_tag: &str) -> String {
    let icon_texts: Vec<String> = item
        .children()
        .iter()
        .flat_map(|child| child.children())
        .filter(|grandchild| grandchild.tag_name().eq_ignore_ascii_case(icon_tag))
        .map(|icon| icon.text())
        .collect();
    strip_all(&item.text(), &icon_texts)
}

/// Newline-joined footnote block, `None` when the page has no footnotes.
pub fn footnote_block(items: &[Node<'_>], icon_tag: &str) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|item| clean_footnote(*item, icon_tag))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Route a rating cell to its field by the marker attribute value.
///
/// Unknown or missing markers leave the record untouched.
pub fn apply_rating(horse: &mut HorseRecord, markers: &RowMarkers, ending: Option<&str>, text: String) {
    let Some(ending) = ending else {
        return;
    };
    let slot = if ending == markers.official_rating {
        &mut horse.official_rating
    } else if ending == markers.topspeed {
        &mut horse.topspeed
    } else if ending == markers.racing_post_rating {
        &mut horse.racing_post_rating
    } else if ending == markers.master_rating {
        &mut horse.master_rating
    } else {
        return;
    };
    *slot = Some(text);
}

/// Which part of the carried weight a span of the weight cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightPart {
    Stones,
    ExtraWeight,
    HeadGear,
    Pounds,
}

/// Classify a weight cell span by its class or data marker.
pub fn weight_part(span: Node<'_>, markers: &RowMarkers) -> Option<WeightPart> {
    if span.has_class_marker(&markers.stones) {
        Some(WeightPart::Stones)
    } else if span.has_class_marker(&markers.extra_weight) {
        Some(WeightPart::ExtraWeight)
    } else if span.has_class_marker(&markers.head_gear) {
        Some(WeightPart::HeadGear)
    } else if span.attr(&markers.pounds_attr) == Some(markers.pounds_value.as_str()) {
        Some(WeightPart::Pounds)
    } else {
        None
    }
}

/// Whom a human wrapper names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanRole {
    Jockey,
    Trainer,
}

pub fn human_role(wrapper: Node<'_>, markers: &RowMarkers) -> Option<HumanRole> {
    let prefix = wrapper.attr(&markers.human_prefix_attr)?;
    if prefix.contains(markers.jockey_prefix.as_str()) {
        Some(HumanRole::Jockey)
    } else if prefix.contains(markers.trainer_prefix.as_str()) {
        Some(HumanRole::Trainer)
    } else {
        None
    }
}

fn strip_all(full: &str, parts: &[String]) -> String {
    let mut text = full.to_string();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        text = text.replace(part.as_str(), "");
    }
    collapse_whitespace(&text)
}

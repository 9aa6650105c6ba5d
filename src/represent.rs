//! `text|tag` serialization of merged units.
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::{labels::Labels, merge::Unit};

/// Every URL is written as this single unit.
pub const URL_UNIT: &str = "%%URL|X";
/// Tag of units without entity type nor part-of-speech.
pub const UNKNOWN_TAG: &str = "?";
pub const JOINER: &str = "_";

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Output tag of a unit: mapped entity type, then part-of-speech, then [UNKNOWN_TAG].
pub fn tag<'a>(unit: &'a Unit, labels: &'a Labels) -> &'a str {
    match labels.get(&unit.ent_type) {
        Some(tag) if !tag.is_empty() => tag,
        _ if !unit.pos.is_empty() => unit.pos.as_str(),
        _ => UNKNOWN_TAG,
    }
}

/// Represent a single unit as `text|tag`.
pub fn represent(unit: &Unit, labels: &Labels) -> String {
    if unit.like_url {
        return URL_UNIT.to_string();
    }

    let text = WHITESPACE.replace_all(&unit.text, JOINER);
    format!("{}|{}", text, tag(unit, labels))
}

/// Represent a sentence, skipping whitespace units.
/// Returns [None] if nothing is left.
pub fn represent_sentence(units: &[Unit], labels: &Labels) -> Option<String> {
    let line = units
        .iter()
        .filter(|unit| !unit.is_blank())
        .map(|unit| represent(unit, labels))
        .join(" ");

    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Represent a document: one line per non-empty sentence, each ending with a newline.
pub fn represent_document(sentences: &[Vec<Unit>], labels: &Labels) -> String {
    let mut out = String::new();
    for line in sentences
        .iter()
        .filter_map(|units| represent_sentence(units, labels))
    {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

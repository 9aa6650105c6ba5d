//! Span merging.
//!
//! Collapses multi-token spans of a [Sentence] into single units, in two passes:
//!
//! 1. Entities whose label is in the [Labels] table are merged. Their unit keeps the
//!    entity label as entity type, so that it is written with the mapped tag.
//! 2. Optionally, noun chunks are computed on the result of the first pass,
//!    left-trimmed and merged. Their unit takes the entity type of the chunk's head.
//!
//! Noun chunks are computed from the dependency parse, on the already merged stream:
//! a merged entity is a single unit there and cannot be split by a chunk.
//!
//! ```text
//! The/det quick/amod fox/nsubj   -->   The|DET quick_fox|NOUN
//! ```
use std::cmp::Reverse;

use itertools::Itertools;

use crate::{
    annotation::{lexeme::like_url, Document, Sentence, Span, SpanKind, Token},
    labels::Labels,
    represent,
};

/// Dependency labels of noun chunk heads.
const NP_DEPS: [&str; 10] = [
    "oprd",
    "nsubj",
    "dobj",
    "nsubjpass",
    "pcomp",
    "pobj",
    "dative",
    "appos",
    "attr",
    "ROOT",
];

/// Leading tokens with these labels are kept when trimming noun chunks.
const KEEP_DEPS: [&str; 3] = ["advmod", "amod", "compound"];

const CONJ: &str = "conj";

/// A unit of the merged stream: either an original token or a collapsed span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unit {
    /// Text of the unit. Merged spans keep their inner whitespace.
    pub text: String,
    pub whitespace: String,
    pub pos: String,
    pub tag: String,
    pub dep: String,
    /// Index of the head in the merged stream.
    pub head: usize,
    pub ent_type: String,
    pub is_space: bool,
    pub like_url: bool,
}

impl Unit {
    /// Build the unit of the `idx`-th token of a sentence of `len` tokens.
    /// Missing or out of range heads make the token a root.
    fn from_token(token: &Token, idx: usize, len: usize) -> Self {
        Self {
            text: token.text.clone(),
            whitespace: token.whitespace.clone(),
            pos: token.pos.clone(),
            tag: token.tag.clone(),
            dep: token.dep.clone(),
            head: token.head.filter(|h| *h < len).unwrap_or(idx),
            ent_type: token.ent_type.clone(),
            is_space: token.is_space,
            like_url: token.like_url,
        }
    }

    /// Whitespace-only units are never written.
    pub fn is_blank(&self) -> bool {
        self.is_space || self.text.trim().is_empty()
    }
}

fn dep_is(dep: &str, labels: &[&str]) -> bool {
    labels.iter().any(|label| dep.eq_ignore_ascii_case(label))
}

pub struct Merger<'a> {
    labels: &'a Labels,
    noun_chunks: bool,
}

impl<'a> Merger<'a> {
    pub fn new(labels: &'a Labels, noun_chunks: bool) -> Self {
        Self {
            labels,
            noun_chunks,
        }
    }

    /// Merge a sentence.
    pub fn merge_sentence(&self, sentence: &Sentence) -> Vec<Unit> {
        let len = sentence.tokens.len();
        let mut units: Vec<Unit> = sentence
            .tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| Unit::from_token(token, idx, len))
            .collect();

        let entities = sentence
            .entities
            .iter()
            .filter(|e| self.labels.contains(&e.label))
            .map(Span::from)
            .collect();
        merge_spans(&mut units, entities);

        if self.noun_chunks {
            let chunks = noun_chunks(&units)
                .into_iter()
                .map(|chunk| trim(&units, chunk))
                .collect();
            merge_spans(&mut units, chunks);
        }

        units
    }

    /// Merge every sentence of a document.
    pub fn merge(&self, doc: &Document) -> Vec<Vec<Unit>> {
        doc.sentences
            .iter()
            .map(|sentence| self.merge_sentence(sentence))
            .collect()
    }

    /// Merge and serialize a document.
    ///
    /// Returns one line per non-empty sentence, each terminated by a newline,
    /// or an empty string if nothing is left.
    pub fn transform(&self, doc: &Document) -> String {
        represent::represent_document(&self.merge(doc), self.labels)
    }
}

/// Drop empty, out of range and overlapping spans.
/// Overlaps are resolved by keeping the leftmost (then longest) span.
fn valid_spans(spans: Vec<Span>, len: usize) -> Vec<Span> {
    let mut kept: Vec<Span> = Vec::with_capacity(spans.len());
    let spans = spans
        .into_iter()
        .filter(|s| !s.is_empty() && s.end <= len)
        .sorted_by_key(|s| (s.start, Reverse(s.end)));

    for span in spans {
        match kept.last() {
            Some(last) if span.start < last.end => continue,
            _ => kept.push(span),
        }
    }
    kept
}

/// Merge non-overlapping spans, right to left so that indices stay valid.
fn merge_spans(units: &mut Vec<Unit>, spans: Vec<Span>) {
    for span in valid_spans(spans, units.len()).iter().rev() {
        collapse(units, span);
    }
}

/// First unit of the span whose head is outside of it (or itself).
fn root(units: &[Unit], span: &Span) -> usize {
    span.range()
        .find(|&idx| {
            let head = units[idx].head;
            head == idx || !span.range().contains(&head)
        })
        .unwrap_or(span.start)
}

/// Collapse `span` into a single unit.
fn collapse(units: &mut Vec<Unit>, span: &Span) {
    let (start, end) = (span.start, span.end);
    let removed = span.len() - 1;
    let root_idx = root(units, span);

    for unit in units.iter_mut() {
        if unit.head >= end {
            unit.head -= removed;
        } else if unit.head >= start {
            unit.head = start;
        }
    }

    let root = units[root_idx].clone();
    let parts = &units[span.range()];
    let text = parts
        .iter()
        .enumerate()
        .map(|(idx, unit)| {
            if idx + 1 == parts.len() {
                unit.text.clone()
            } else {
                format!("{}{}", unit.text, unit.whitespace)
            }
        })
        .collect::<String>();

    let like_url = if parts.len() == 1 {
        parts[0].like_url
    } else {
        like_url(&text)
    };

    let ent_type = match &span.kind {
        SpanKind::Entity(label) => label.clone(),
        SpanKind::NounChunk => root.ent_type.clone(),
    };

    let merged = Unit {
        whitespace: parts[parts.len() - 1].whitespace.clone(),
        is_space: parts.iter().all(|u| u.is_space),
        text,
        like_url,
        ent_type,
        pos: root.pos,
        tag: root.tag,
        dep: root.dep,
        head: root.head,
    };

    units.splice(span.range(), std::iter::once(merged));
}

/// Leftmost descendant of every unit.
fn left_edges(units: &[Unit]) -> Vec<usize> {
    let mut edges: Vec<usize> = (0..units.len()).collect();
    for idx in 0..units.len() {
        let mut current = idx;
        // bounded walk: malformed heads may form cycles
        for _ in 0..units.len() {
            let head = units[current].head;
            if head == current {
                break;
            }
            edges[head] = edges[head].min(idx);
            current = head;
        }
    }
    edges
}

/// Base noun phrases, from the dependency parse.
///
/// A noun (or proper noun, or pronoun) attached with one of the [NP_DEPS] labels,
/// or conjoined to such a noun, heads a chunk covering its whole left subtree.
/// Chunks never overlap.
pub fn noun_chunks(units: &[Unit]) -> Vec<Span> {
    let edges = left_edges(units);
    let mut chunks = Vec::new();
    let mut prev_end: Option<usize> = None;

    for (idx, unit) in units.iter().enumerate() {
        if !matches!(unit.pos.as_str(), "NOUN" | "PROPN" | "PRON") {
            continue;
        }

        let left = edges[idx];
        if prev_end.map_or(false, |end| left <= end) {
            continue;
        }

        let is_np = if dep_is(&unit.dep, &NP_DEPS) {
            true
        } else if dep_is(&unit.dep, &[CONJ]) {
            let mut head = unit.head;
            let mut steps = 0;
            while dep_is(&units[head].dep, &[CONJ]) && units[head].head < head && steps < units.len()
            {
                head = units[head].head;
                steps += 1;
            }
            dep_is(&units[head].dep, &NP_DEPS)
        } else {
            false
        };

        if is_np {
            prev_end = Some(idx);
            chunks.push(Span::noun_chunk(left, idx + 1));
        }
    }
    chunks
}

/// Drop leading units of a chunk while more than one unit remains and the
/// leading one is not a modifier/compound (determiners, possessives, quantifiers...).
pub fn trim(units: &[Unit], mut chunk: Span) -> Span {
    while chunk.len() > 1 && !dep_is(&units[chunk.start].dep, &KEEP_DEPS) {
        chunk.start += 1;
    }
    chunk
}

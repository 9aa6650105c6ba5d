//! Annotated documents.
//!
//! A [Document] is what an annotation backend returns for a single input line.
//! Indices (token heads, entity bounds) are local to their [Sentence], so no
//! span can cross a sentence boundary.
//!
//! Documents are (de)serializable so that external backends can send them as JSON:
//!
//! ```json
//! {"sentences": [{
//!     "tokens": [
//!         {"text": "Ada", "whitespace": " ", "pos": "PROPN", "tag": "NNP", "dep": "compound", "head": 1, "ent_type": "PERSON"},
//!         {"text": "Lovelace", "pos": "PROPN", "tag": "NNP", "dep": "ROOT", "head": 1, "ent_type": "PERSON"}
//!     ],
//!     "entities": [{"start": 0, "end": 2, "label": "PERSON"}]
//! }]}
//! ```
use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// Total number of tokens of the document.
    pub fn len(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>, entities: Vec<Entity>) -> Self {
        Self { tokens, entities }
    }

    /// Text of the sentence, trailing whitespace excluded.
    pub fn text(&self) -> String {
        span_text(&self.tokens)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Whitespace following the token in the original text.
    #[serde(default)]
    pub whitespace: String,
    /// Coarse part-of-speech (`NOUN`, `PROPN`, ...).
    #[serde(default)]
    pub pos: String,
    /// Fine-grained tag (`NN`, `NNP`, ...).
    #[serde(default)]
    pub tag: String,
    /// Dependency relation to the head.
    #[serde(default)]
    pub dep: String,
    /// Sentence-local index of the syntactic head. Roots point to themselves,
    /// missing heads are read as roots.
    #[serde(default)]
    pub head: Option<usize>,
    #[serde(default)]
    pub ent_type: String,
    #[serde(default)]
    pub is_space: bool,
    #[serde(default)]
    pub like_url: bool,
}

impl Token {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

/// Entity found by the backend, covering tokens `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Entity {
    pub fn new(start: usize, end: usize, label: &str) -> Self {
        Self {
            start,
            end,
            label: label.to_string(),
        }
    }
}

/// Contiguous token range `[start, end)` within a sentence, to be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Entity(String),
    NounChunk,
}

impl Span {
    pub fn noun_chunk(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind: SpanKind::NounChunk,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&Entity> for Span {
    fn from(e: &Entity) -> Self {
        Self {
            start: e.start,
            end: e.end,
            kind: SpanKind::Entity(e.label.clone()),
        }
    }
}

/// Text covered by a run of tokens: each token with its whitespace, the last one without.
pub fn span_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    if let Some((last, init)) = tokens.split_last() {
        for token in init {
            text.push_str(&token.text);
            text.push_str(&token.whitespace);
        }
        text.push_str(&last.text);
    }
    text
}

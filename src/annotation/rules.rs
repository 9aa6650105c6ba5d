//! Rule-based annotation backend.
//!
//! Does sentence segmentation and tokenization (UAX #29 boundaries), keeps URLs
//! as single tokens and tags spaces, numbers and punctuation.
//! There is no parser nor entity recognizer: other tokens get an empty part-of-speech,
//! and no entity/noun chunk merging ever happens with this backend.
//!
//! Useful to prepare plain tokenized corpora, or when no external model is available.
use rayon::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Error;

use super::{
    lexeme::{is_punct, like_num, like_url},
    Annotate, Document, Sentence, Token,
};

/// Characters that can wrap a URL without being part of it.
const URL_PREFIX: &[char] = &['(', '<', '"', '\''];
const URL_SUFFIX: &[char] = &['.', ',', ';', ':', '!', '?', ')', '>', '"', '\''];

pub struct Rules {
    pool: Option<rayon::ThreadPool>,
}

impl Rules {
    /// Create a backend annotating batches on `threads` threads.
    /// With a single thread, batches are annotated on the caller's thread.
    pub fn new(threads: usize) -> Result<Self, Error> {
        let pool = if threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self { pool })
    }

    /// Annotate a single line.
    ///
    /// Sentence boundaries falling inside a token (`?` in a URL query) are ignored.
    pub fn annotate_line(text: &str) -> Document {
        let mut bounds = text
            .split_sentence_bound_indices()
            .map(|(idx, _)| idx)
            .skip(1)
            .peekable();

        let mut sentences = Vec::new();
        let mut current = Vec::new();
        let mut offset = 0;
        for token in tokenize(text) {
            let mut boundary = false;
            while let Some(&bound) = bounds.peek() {
                if bound > offset {
                    break;
                }
                boundary |= bound == offset;
                bounds.next();
            }

            if boundary && !current.is_empty() {
                sentences.push(Sentence::new(std::mem::take(&mut current), Vec::new()));
            }

            offset += token.text.len() + token.whitespace.len();
            current.push(token);
        }

        if !current.is_empty() {
            sentences.push(Sentence::new(current, Vec::new()));
        }
        Document::new(sentences)
    }
}

impl Annotate for Rules {
    fn annotate(&mut self, texts: &[String]) -> Result<Vec<Document>, Error> {
        let docs = match &self.pool {
            Some(pool) => pool.install(|| {
                texts
                    .par_iter()
                    .map(|text| Self::annotate_line(text))
                    .collect()
            }),
            None => texts.iter().map(|text| Self::annotate_line(text)).collect(),
        };
        Ok(docs)
    }
}

/// Split a line into tokens.
///
/// Tokens cover the whole line: concatenating text and whitespace of every
/// token gives the line back.
///
/// A single space after a token is kept as its trailing whitespace,
/// any other whitespace becomes a space token.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let ws_len = rest.len() - rest.trim_start().len();
        if ws_len > 0 {
            let (ws, tail) = rest.split_at(ws_len);
            push_whitespace(&mut tokens, ws);
            rest = tail;
            continue;
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        push_chunk(&mut tokens, chunk);
        rest = tail;
    }
    tokens
}

fn push_whitespace(tokens: &mut Vec<Token>, ws: &str) {
    let ws = match tokens.last_mut() {
        Some(last) if !last.is_space && last.whitespace.is_empty() && ws.starts_with(' ') => {
            last.whitespace.push(' ');
            &ws[1..]
        }
        _ => ws,
    };

    if !ws.is_empty() {
        let mut token = Token::new(ws);
        token.is_space = true;
        token.pos = "SPACE".to_string();
        token.tag = "_SP".to_string();
        tokens.push(token);
    }
}

fn push_chunk(tokens: &mut Vec<Token>, chunk: &str) {
    let core = chunk.trim_start_matches(URL_PREFIX);
    let prefix = &chunk[..chunk.len() - core.len()];
    let url = core.trim_end_matches(URL_SUFFIX);
    let suffix = &core[url.len()..];

    if like_url(url) {
        push_words(tokens, prefix);
        let mut token = Token::new(url);
        token.like_url = true;
        token.pos = "X".to_string();
        tokens.push(token);
        push_words(tokens, suffix);
    } else {
        push_words(tokens, chunk);
    }
}

fn push_words(tokens: &mut Vec<Token>, text: &str) {
    for word in text.split_word_bounds() {
        tokens.push(lexical_token(word));
    }
}

fn lexical_token(text: &str) -> Token {
    let mut token = Token::new(text);
    if like_num(text) {
        token.pos = "NUM".to_string();
        token.tag = "CD".to_string();
    } else if is_punct(text) {
        token.pos = "PUNCT".to_string();
    }
    token
}

/*!
 * Sentence tokenization for the caption segmenter.
 *
 * The segmenter only needs an ordered list of sentences per paragraph, so the
 * tokenizer sits behind the `SentenceTokenizer` trait. `RuleTokenizer` is the
 * built-in implementation: it splits on terminal punctuation followed by
 * whitespace and knows about common abbreviations and initials.
 */

use anyhow::Result;
use std::collections::HashSet;

/// Common English abbreviations that end with a period but not a sentence
const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "st.", "jr.", "sr.", "vs.", "etc.",
    "e.g.", "i.e.", "mt.", "no.", "gen.", "col.", "capt.", "lt.", "sgt.", "rev.",
    "inc.", "ltd.", "co.", "approx.", "dept.", "fig.",
];

/// Characters that can end a sentence
const TERMINALS: &[char] = &['.', '!', '?', '…'];

/// Characters that may trail a terminal and still belong to the sentence
const CLOSERS: &[char] = &['"', '\'', '”', '’', ')', ']', '»'];

/// Splits a paragraph into an ordered list of sentences
pub trait SentenceTokenizer {
    /// Return the trimmed, non-empty sentences of `paragraph` in order
    fn sentences(&self, paragraph: &str) -> Result<Vec<String>>;
}

impl<F> SentenceTokenizer for F
where
    F: Fn(&str) -> Result<Vec<String>>,
{
    fn sentences(&self, paragraph: &str) -> Result<Vec<String>> {
        self(paragraph)
    }
}

/// Punctuation-driven sentence splitter
#[derive(Debug, Clone)]
pub struct RuleTokenizer {
    abbreviations: HashSet<String>,
}

impl Default for RuleTokenizer {
    fn default() -> Self {
        Self {
            abbreviations: DEFAULT_ABBREVIATIONS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl RuleTokenizer {
    /// Create a tokenizer with the default abbreviation list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add extra abbreviations; matching is case-insensitive and includes the period
    pub fn with_abbreviations<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for abbreviation in extra {
            self.abbreviations.insert(abbreviation.as_ref().to_lowercase());
        }
        self
    }

    /// Whether the word ending at a period is a known abbreviation
    fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.contains(&word.to_lowercase())
    }

    /// A single capital letter followed by a period, such as "J."
    fn is_initial(word: &str) -> bool {
        let mut chars = word.chars();
        matches!(
            (chars.next(), chars.next(), chars.next()),
            (Some(c), Some('.'), None) if c.is_uppercase()
        )
    }

    fn split(&self, paragraph: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
        let mut sentences = Vec::new();
        let mut sentence_start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (_, c) = chars[i];
            if !TERMINALS.contains(&c) {
                i += 1;
                continue;
            }

            let terminal_at = i;
            // Swallow runs like "?!" or "..." and any closing quotes
            let mut end = i + 1;
            while end < chars.len() && TERMINALS.contains(&chars[end].1) {
                end += 1;
            }
            while end < chars.len() && CLOSERS.contains(&chars[end].1) {
                end += 1;
            }

            let at_boundary = end >= chars.len() || chars[end].1.is_whitespace();
            if !at_boundary {
                i = end;
                continue;
            }

            let byte_end = chars.get(end).map(|&(b, _)| b).unwrap_or(paragraph.len());

            if c == '.' && end == terminal_at + 1 {
                let word_start = paragraph[..chars[terminal_at].0]
                    .rfind(char::is_whitespace)
                    .map(|b| b + 1)
                    .unwrap_or(0)
                    .max(sentence_start);
                let word = &paragraph[word_start..byte_end];
                if self.is_abbreviation(word) {
                    i = end;
                    continue;
                }
                // Only runs of initials ("J. R. Smith") hold a sentence together;
                // a lone "I." or "B." still ends one
                if Self::is_initial(word) {
                    let previous = paragraph[sentence_start..word_start].split_whitespace().next_back();
                    let next = paragraph[byte_end..].split_whitespace().next();
                    if previous.is_some_and(Self::is_initial) || next.is_some_and(Self::is_initial) {
                        i = end;
                        continue;
                    }
                }
            }

            // A lowercase continuation means the period was not a sentence end
            let next_visible = paragraph[byte_end..].trim_start().chars().next();
            if next_visible.is_some_and(|n| n.is_lowercase()) {
                i = end;
                continue;
            }

            let sentence = paragraph[sentence_start..byte_end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            sentence_start = byte_end;
            i = end;
        }

        let tail = paragraph[sentence_start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }

        sentences
    }
}

impl SentenceTokenizer for RuleTokenizer {
    fn sentences(&self, paragraph: &str) -> Result<Vec<String>> {
        Ok(self.split(paragraph))
    }
}

/*!
 * Caption segmentation.
 *
 * Splits raw narrative text into caption lines. Sentences are packed greedily
 * inside each paragraph until the next one would push the caption past the
 * character budget. Paragraph breaks always start a new caption and a sentence
 * is never split, even when it alone exceeds the budget.
 */

use log::{debug, warn};

use crate::errors::SegmentationError;
use crate::tokenizer::SentenceTokenizer;

/// Separator placed between sentences that share a caption
const SENTENCE_SEPARATOR: char = ' ';

/// Split text into paragraphs: one per input line, trimmed, blanks dropped
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Greedily pack sentences into captions of at most `max_characters` characters
///
/// Lengths are counted in characters, not bytes.
pub fn pack_sentences<S: AsRef<str>>(sentences: &[S], max_characters: usize) -> Vec<String> {
    let mut captions = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences {
        let sentence = sentence.as_ref().trim();
        if sentence.is_empty() {
            continue;
        }
        let sentence_len = sentence.chars().count();

        if current.is_empty() {
            current.push_str(sentence);
            current_len = sentence_len;
        } else if current_len + sentence_len + 1 > max_characters {
            captions.push(std::mem::take(&mut current));
            current.push_str(sentence);
            current_len = sentence_len;
        } else {
            current.push(SENTENCE_SEPARATOR);
            current.push_str(sentence);
            current_len += sentence_len + 1;
        }

        if current_len > max_characters {
            warn!(
                "Sentence of {} characters exceeds the {} character caption budget and is kept whole",
                sentence_len, max_characters
            );
        }
    }

    if !current.is_empty() {
        captions.push(current);
    }

    captions
}

/// Split narrative text into caption lines
///
/// Blank input yields an empty list. A tokenizer failure aborts the whole run
/// so no narrative content is silently dropped.
pub fn split_captions<T: SentenceTokenizer + ?Sized>(
    text: &str,
    max_characters: usize,
    tokenizer: &T,
) -> Result<Vec<String>, SegmentationError> {
    if max_characters == 0 {
        return Err(SegmentationError::InvalidConfig(
            "max_characters must be greater than zero".to_string(),
        ));
    }

    let mut captions = Vec::new();
    for (index, paragraph) in paragraphs(text).into_iter().enumerate() {
        let sentences = tokenizer.sentences(paragraph).map_err(|e| {
            SegmentationError::TokenizationFailure {
                paragraph: index,
                reason: e.to_string(),
            }
        })?;
        let packed = pack_sentences(&sentences, max_characters);
        debug!(
            "Paragraph {}: {} sentence(s) packed into {} caption(s)",
            index,
            sentences.len(),
            packed.len()
        );
        captions.extend(packed);
    }

    Ok(captions)
}

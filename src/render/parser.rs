//! Message text to [`Fragment`].
//!
//! Fenced blocks are located first, on the text that will actually be shown;
//! the prose between them then goes through the inline-code and line-break
//! pass. Fences become nodes in document order, so nothing produced for a
//! block can be touched by the prose pass.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::fragment::{Fragment, Node};
use super::lexer::tokenize;

const FENCE: &str = "```";

/// Where a long message may be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationMode {
    /// Cut at the threshold but never inside a fenced block.
    #[default]
    Boundary,
    /// Cut at exactly the threshold, before fences are recognised.
    Raw,
}

impl std::str::FromStr for TruncationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boundary" => Ok(Self::Boundary),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown truncation mode: {other}")),
        }
    }
}

/// A fenced block located in message text (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    /// Whole match, opening backticks through closing backticks.
    pub span: Range<usize>,
    pub language: Option<Range<usize>>,
    pub body: Range<usize>,
}

/// Locate fenced blocks: three backticks, optional word, newline, shortest
/// body, three backticks.
pub fn find_fences(text: &str) -> Vec<Fence> {
    let bytes = text.as_bytes();
    let mut fences = Vec::new();
    let mut search = 0;

    while let Some(off) = text[search..].find(FENCE) {
        let open = search + off;
        let lang_start = open + FENCE.len();
        let mut lang_end = lang_start;
        while bytes
            .get(lang_end)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            lang_end += 1;
        }
        if bytes.get(lang_end) != Some(&b'\n') {
            search = open + 1;
            continue;
        }

        let body_start = lang_end + 1;
        let Some(close_off) = text[body_start..].find(FENCE) else {
            // No closing fence anywhere after this point.
            break;
        };
        let close = body_start + close_off;
        fences.push(Fence {
            span: open..close + FENCE.len(),
            language: (lang_end > lang_start).then_some(lang_start..lang_end),
            body: body_start..close,
        });
        search = close + FENCE.len();
    }

    fences
}

/// Byte offset of the `n`th char, or `None` when the text is not longer than `n` chars.
fn char_offset(text: &str, n: usize) -> Option<usize> {
    text.char_indices().nth(n).map(|(i, _)| i)
}

/// Byte offset at which `text` should be cut, or `None` to show it whole.
pub fn truncation_cut(text: &str, threshold: usize, mode: TruncationMode) -> Option<usize> {
    let cut = char_offset(text, threshold)?;
    if mode == TruncationMode::Raw {
        return Some(cut);
    }

    let inside = find_fences(text)
        .into_iter()
        .find(|f| f.span.start < cut && cut < f.span.end);
    let Some(fence) = inside else {
        return Some(cut);
    };
    if text[..fence.span.start].trim().is_empty() {
        // Backing up would leave nothing visible; keep the block whole.
        trace!(
            component = "parser",
            operation = "truncation_cut",
            fence_end = fence.span.end,
            "Extending cut past leading fence"
        );
        Some(fence.span.end)
    } else {
        Some(fence.span.start)
    }
}

/// Parse displayable text into a fragment.
pub fn parse(text: &str) -> Fragment {
    parse_with_language(text, None)
}

/// Like [`parse`], but fences without a tag take `default_language`.
pub fn parse_with_language(text: &str, default_language: Option<&str>) -> Fragment {
    let default_language = default_language
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_ascii_lowercase);
    let mut fragment = Fragment::new();
    let mut prose_start = 0;

    for fence in find_fences(text) {
        push_prose(&mut fragment, &text[prose_start..fence.span.start]);

        let language = fence
            .language
            .map(|r| text[r].to_ascii_lowercase())
            .or_else(|| default_language.clone());
        let body = text[fence.body].trim_end();
        trace!(
            component = "parser",
            operation = "code_block",
            language = language.as_deref().unwrap_or(""),
            body_len = body.len(),
            "Extracted fenced block"
        );
        fragment.push(Node::CodeBlock {
            language,
            tokens: tokenize(body),
        });
        prose_start = fence.span.end;
    }
    push_prose(&mut fragment, &text[prose_start..]);

    fragment
}

/// Inline code spans and line breaks.
fn push_prose(fragment: &mut Fragment, text: &str) {
    let mut i = 0;
    while let Some(off) = text[i..].find('`') {
        let tick = i + off;
        push_lines(fragment, &text[i..tick]);
        match text[tick + 1..].find('`') {
            Some(0) => {
                push_lines(fragment, "`");
                i = tick + 1;
            }
            Some(len) => {
                let code = &text[tick + 1..tick + 1 + len];
                fragment.push(Node::InlineCode {
                    tokens: tokenize(code),
                });
                i = tick + 1 + len + 1;
            }
            None => {
                push_lines(fragment, &text[tick..]);
                return;
            }
        }
    }
    push_lines(fragment, &text[i..]);
}

fn push_lines(fragment: &mut Fragment, text: &str) {
    let mut lines = text.split('\n');
    if let Some(first) = lines.next() {
        fragment.push_text(first);
    }
    for line in lines {
        fragment.push(Node::Break);
        fragment.push_text(line);
    }
}

//! Inline content rendering for discussion messages.
//!
//! Turns an untrusted message (prose, fenced code blocks, inline code spans,
//! line breaks) into a structured, display-safe [`Fragment`] plus a flag
//! telling the caller whether to offer a "show more / show less" toggle.
//!
//! # Architecture
//!
//! ```text
//! render/
//! ├── mod.rs        # Renderer facade (this file)
//! ├── parser.rs     # Truncation, fence extraction, inline code, breaks
//! ├── lexer.rs      # Ordered-rule code tokenizer
//! ├── fragment.rs   # Structured output tree
//! ├── html.rs       # Fragment -> markup (escaping happens here)
//! └── escape.rs     # HTML escaping
//! ```
//!
//! # Usage
//!
//! ```rust
//! use leetmate_render::render::{Renderer, RenderOptions};
//!
//! let renderer = Renderer::new(RenderOptions::default());
//! let rendered = renderer.render(Some("Try `let x = 1;`"), false);
//! assert!(!rendered.is_truncatable);
//! assert!(rendered.to_html().contains("inline-code"));
//! ```
//!
//! The renderer is a pure function of `(text, expanded)`: it holds no state,
//! so one instance can be shared across threads.

pub mod escape;
pub mod fragment;
pub mod html;
pub mod lexer;
pub mod parser;

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, trace};

pub use escape::html_escape;
pub use fragment::{Fragment, Node, Token, TokenKind};
pub use html::{Palette, fragment_to_html};
pub use lexer::{KEYWORDS, tokenize};
pub use parser::TruncationMode;

/// Default collapse threshold, in characters.
pub const DEFAULT_TRUNCATE_THRESHOLD: usize = 300;

/// Marker appended to a collapsed message.
pub const DEFAULT_ELLIPSIS: &str = "...";

/// Options for rendering messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Messages longer than this many characters collapse unless expanded
    pub truncate_threshold: usize,

    /// Appended after the visible part of a collapsed message
    pub ellipsis: String,

    /// Where the collapse cut may fall
    pub truncation: TruncationMode,

    /// Token colours for markup output
    pub palette: Palette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            truncate_threshold: DEFAULT_TRUNCATE_THRESHOLD,
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
            truncation: TruncationMode::default(),
            palette: Palette::default(),
        }
    }
}

/// Result of rendering one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub fragment: Fragment,
    /// Original text exceeds the threshold; the caller should offer a toggle.
    pub is_truncatable: bool,
    #[serde(skip)]
    palette: Palette,
}

impl Rendered {
    fn empty(palette: &Palette) -> Self {
        Self {
            fragment: Fragment::new(),
            is_truncatable: false,
            palette: palette.clone(),
        }
    }

    /// Markup for the fragment.
    pub fn to_html(&self) -> String {
        fragment_to_html(&self.fragment, &self.palette)
    }
}

/// Stateless message renderer.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `text`, collapsed unless `expanded`.
    ///
    /// Absent or empty text gives an empty fragment. Never panics.
    pub fn render(&self, text: Option<&str>, expanded: bool) -> Rendered {
        self.render_with_language(text, expanded, None)
    }

    /// Like [`Renderer::render`], with a language class for fences that carry
    /// no tag of their own.
    pub fn render_with_language(
        &self,
        text: Option<&str>,
        expanded: bool,
        default_language: Option<&str>,
    ) -> Rendered {
        let started = Instant::now();
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Rendered::empty(&self.options.palette);
        };

        let cut = parser::truncation_cut(
            text,
            self.options.truncate_threshold,
            self.options.truncation,
        );
        let is_truncatable = cut.is_some();
        // A boundary cut can land at or past the last visible character, in
        // which case the collapsed view is the whole message.
        let hides_content = cut.is_some_and(|end| !text[end..].trim().is_empty());
        let visible = match cut {
            Some(end) if hides_content && !expanded => &text[..end],
            _ => text,
        };
        trace!(
            component = "renderer",
            operation = "render",
            text_len = text.len(),
            visible_len = visible.len(),
            expanded,
            is_truncatable,
            "Rendering message"
        );

        let mut fragment = parser::parse_with_language(visible, default_language);
        if hides_content && !expanded {
            fragment.push_text(&self.options.ellipsis);
        }

        debug!(
            component = "renderer",
            operation = "render_complete",
            duration_us = started.elapsed().as_micros(),
            nodes = fragment.nodes().len(),
            code_blocks = fragment.code_block_count(),
            "Message rendered"
        );

        Rendered {
            fragment,
            is_truncatable,
            palette: self.options.palette.clone(),
        }
    }
}

/// Render with default options.
pub fn render(text: Option<&str>, expanded: bool) -> Rendered {
    Renderer::default().render(text, expanded)
}

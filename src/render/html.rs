//! Fragment to HTML markup.
//!
//! This is the only place raw author text is turned into markup, and every
//! piece of it goes through [`push_escaped`] exactly once.

use serde::{Deserialize, Serialize};

use super::escape::push_escaped;
use super::fragment::{Fragment, Node, Token, TokenKind};

/// Token colours. Values are inserted into a `style` attribute, so
/// [`crate::config`] only accepts `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub comment: String,
    pub string: String,
    pub number: String,
    pub keyword: String,
    pub plain: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            comment: "#6b7280".to_string(),
            string: "#b45309".to_string(),
            number: "#16a34a".to_string(),
            keyword: "#2563eb".to_string(),
            plain: "#111827".to_string(),
        }
    }
}

impl Palette {
    pub fn color(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Comment => &self.comment,
            TokenKind::String => &self.string,
            TokenKind::Number => &self.number,
            TokenKind::Keyword => &self.keyword,
            TokenKind::Identifier | TokenKind::Plain => &self.plain,
        }
    }

    /// All entries with their field names, for validation.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("comment", self.comment.as_str()),
            ("string", self.string.as_str()),
            ("number", self.number.as_str()),
            ("keyword", self.keyword.as_str()),
            ("plain", self.plain.as_str()),
        ]
    }
}

/// Render a fragment to markup.
pub fn fragment_to_html(fragment: &Fragment, palette: &Palette) -> String {
    let mut out = String::with_capacity(fragment.nodes().len() * 64);
    for node in fragment.nodes() {
        match node {
            Node::Text { content } => push_escaped(&mut out, content),
            Node::Break => out.push_str("<br/>"),
            Node::InlineCode { tokens } => {
                out.push_str(r#"<code class="inline-code">"#);
                push_tokens(&mut out, tokens, palette, true);
                out.push_str("</code>");
            }
            Node::CodeBlock { language, tokens } => {
                out.push_str(r#"<pre class="code-block"><code"#);
                if let Some(lang) = language {
                    out.push_str(r#" class="language-"#);
                    push_escaped(&mut out, lang);
                    out.push('"');
                }
                out.push('>');
                push_tokens(&mut out, tokens, palette, false);
                out.push_str("</code></pre>");
            }
        }
    }
    out
}

fn push_tokens(out: &mut String, tokens: &[Token], palette: &Palette, inline: bool) {
    for token in tokens {
        if token.kind == TokenKind::Plain {
            push_code_text(out, &token.text, inline);
            continue;
        }
        out.push_str(r#"<span class="tok-"#);
        out.push_str(token.kind.style_class());
        out.push_str(r#"" style="color:"#);
        out.push_str(palette.color(token.kind));
        out.push_str(r#"">"#);
        push_code_text(out, &token.text, inline);
        out.push_str("</span>");
    }
}

/// Inline code is not inside `<pre>`, so its newlines need explicit breaks.
fn push_code_text(out: &mut String, text: &str, inline: bool) {
    if !inline {
        push_escaped(out, text);
        return;
    }
    let mut lines = text.split('\n');
    if let Some(first) = lines.next() {
        push_escaped(out, first);
    }
    for line in lines {
        out.push_str("<br/>");
        push_escaped(out, line);
    }
}

//! Structured render output.
//!
//! A [`Fragment`] is an ordered list of typed nodes holding *raw* author text.
//! Nothing in here is escaped; escaping happens once, when [`super::html`]
//! turns the tree into markup. Keeping the tree structured means fenced blocks
//! never travel through a text pass as placeholder strings.

use serde::Serialize;

/// Lexical category assigned by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// `// ...`, `# ...` or `/* ... */`
    Comment,
    /// Double, single or backtick quoted literal
    String,
    /// Integer or decimal literal
    Number,
    /// Identifier from the fixed keyword list
    Keyword,
    /// Any other identifier
    Identifier,
    /// Gap text between recognised tokens (whitespace, punctuation)
    Plain,
}

impl TokenKind {
    /// Semantic style class. Identifiers share the `plain` class with gaps.
    pub fn style_class(self) -> &'static str {
        match self {
            TokenKind::Comment => "comment",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier | TokenKind::Plain => "plain",
        }
    }
}

/// A classified run of code text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// One element of a rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Node {
    /// Prose run (raw text)
    Text { content: String },
    /// Single-backtick span, tokenized
    #[serde(rename = "code-inline")]
    InlineCode { tokens: Vec<Token> },
    /// Fenced block with optional lowercased language tag
    CodeBlock {
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        tokens: Vec<Token>,
    },
    /// Literal newline in prose
    Break,
}

/// Ordered node list produced for a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append prose, merging with a trailing text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text { content }) = self.nodes.last_mut() {
            content.push_str(text);
        } else {
            self.nodes.push(Node::Text {
                content: text.to_string(),
            });
        }
    }

    pub fn push(&mut self, node: Node) {
        match node {
            Node::Text { content } => self.push_text(&content),
            other => self.nodes.push(other),
        }
    }

    /// Number of fenced code blocks.
    pub fn code_block_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::CodeBlock { .. }))
            .count()
    }

    /// Raw text of the fragment with markup removed (breaks as newlines).
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text { content } => out.push_str(content),
                Node::InlineCode { tokens } | Node::CodeBlock { tokens, .. } => {
                    for t in tokens {
                        out.push_str(&t.text);
                    }
                }
                Node::Break => out.push('\n'),
            }
        }
        out
    }
}

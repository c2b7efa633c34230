//! Discussion thread rendering.
//!
//! A thread arrives as JSON lines, one message per line, in the shape the
//! group chat API returns. Messages are rendered in parallel and emitted either
//! as an HTML document (one `<article>` per message with a show more/less
//! toggle where needed) or as JSON lines.

use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::expansion::ExpansionState;
use crate::render::{Fragment, Renderer, html_escape};

/// Errors that can occur while loading a thread.
#[derive(Error, Debug)]
pub enum ThreadError {
    #[error("line {line}: invalid message JSON: {source}")]
    ParseLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: message id must not be empty")]
    EmptyId { line: usize },

    #[error("line {line}: duplicate message id {id:?}")]
    DuplicateId { line: usize, id: String },
}

/// One chat message. Accepts both snake_case and the API's camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default, alias = "threadId", skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, alias = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, alias = "authorName", skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, alias = "authorRole", skip_serializing_if = "Option::is_none")]
    pub author_role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Language class for fences in `content` that have no tag.
    #[serde(default, alias = "codeLanguage", skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
    /// RFC 3339
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Render result for one message, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedMessage {
    pub id: String,
    pub expanded: bool,
    pub is_truncatable: bool,
    pub html: String,
    pub fragment: Fragment,
}

/// Parse a JSONL thread. Blank lines are skipped; ids must be unique.
pub fn load_thread(input: &str) -> Result<Vec<ThreadMessage>, ThreadError> {
    let mut messages = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let msg: ThreadMessage =
            serde_json::from_str(raw).map_err(|source| ThreadError::ParseLine { line, source })?;
        if msg.id.trim().is_empty() {
            return Err(ThreadError::EmptyId { line });
        }
        if !seen.insert(msg.id.clone()) {
            return Err(ThreadError::DuplicateId { line, id: msg.id });
        }
        messages.push(msg);
    }

    debug!(
        component = "thread",
        operation = "load_thread",
        message_count = messages.len(),
        "Thread loaded"
    );
    Ok(messages)
}

/// Render every message; output order matches input order.
pub fn render_thread(
    renderer: &Renderer,
    messages: &[ThreadMessage],
    state: &ExpansionState,
) -> Vec<RenderedMessage> {
    let started = Instant::now();
    let rendered: Vec<RenderedMessage> = messages
        .par_iter()
        .map(|msg| {
            let expanded = state.is_expanded(&msg.id);
            let r = renderer.render_with_language(
                msg.content.as_deref(),
                expanded,
                msg.code_language.as_deref(),
            );
            RenderedMessage {
                id: msg.id.clone(),
                expanded,
                is_truncatable: r.is_truncatable,
                html: r.to_html(),
                fragment: r.fragment,
            }
        })
        .collect();

    info!(
        component = "thread",
        operation = "render_thread",
        message_count = rendered.len(),
        truncatable = rendered.iter().filter(|m| m.is_truncatable).count(),
        duration_ms = started.elapsed().as_millis(),
        "Thread rendered"
    );
    rendered
}

/// Format an RFC 3339 timestamp for display, falling back to the raw value.
pub fn format_timestamp(ts: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| ts.to_string())
}

/// CSS class for an author role (`MENTOR` -> `role-mentor`).
fn role_class(role: Option<&str>) -> String {
    let slug: String = role
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if slug.is_empty() {
        "role-member".to_string()
    } else {
        format!("role-{slug}")
    }
}

fn render_article(msg: &ThreadMessage, rendered: &RenderedMessage) -> String {
    let author = html_escape(msg.author_name.as_deref().unwrap_or("Member"));
    let role = msg
        .author_role
        .as_deref()
        .map(|r| format!(r#"<span class="message-role">{}</span>"#, html_escape(r)))
        .unwrap_or_default();
    let time = msg
        .created_at
        .as_deref()
        .map(|ts| {
            format!(
                r#"<time class="message-time" datetime="{}">{}</time>"#,
                html_escape(ts),
                html_escape(&format_timestamp(ts))
            )
        })
        .unwrap_or_default();
    let mut data_attrs = String::new();
    if let Some(thread) = msg.thread_id.as_deref() {
        data_attrs.push_str(&format!(r#" data-thread-id="{}""#, html_escape(thread)));
    }
    if let Some(parent) = msg.parent_id.as_deref() {
        data_attrs.push_str(&format!(r#" data-parent-id="{}""#, html_escape(parent)));
    }
    let toggle = if rendered.is_truncatable {
        format!(
            r#"
                <button type="button" class="message-toggle" data-message-id="{id}" aria-expanded="{expanded}">{label}</button>"#,
            id = html_escape(&msg.id),
            expanded = rendered.expanded,
            label = if rendered.expanded { "Show less" } else { "Show more" },
        )
    } else {
        String::new()
    };

    format!(
        r#"            <article class="message {role_class}{reply_class}" id="msg-{id}"{data_attrs}>
                <header class="message-header">
                    <span class="message-author">{author}</span>
                    {role}
                    {time}
                </header>
                <div class="message-content">{content}</div>{toggle}
            </article>"#,
        role_class = role_class(msg.author_role.as_deref()),
        reply_class = if msg.parent_id.is_some() { " message-reply" } else { "" },
        id = html_escape(&msg.id),
        data_attrs = data_attrs,
        author = author,
        role = role,
        time = time,
        content = rendered.html,
        toggle = toggle,
    )
}

/// Standalone HTML document for a rendered thread.
pub fn thread_to_html(messages: &[ThreadMessage], rendered: &[RenderedMessage]) -> String {
    let mut html = String::with_capacity(rendered.len() * 1500 + 256);
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Discussion</title>\n</head>\n<body>\n        <section class=\"thread-messages\">\n",
    );
    for (msg, r) in messages.iter().zip(rendered) {
        html.push_str(&render_article(msg, r));
        html.push('\n');
    }
    html.push_str("        </section>\n</body>\n</html>\n");
    html
}

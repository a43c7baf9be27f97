//! Markdown rendering: fenced code, tables, table of contents and syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashSet;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Paragraph text replaced by the generated table of contents
const TOC_MARKER: &str = "[TOC]";

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

/// A heading collected for the table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: usize,
    pub id: String,
    pub title: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("InspiredGitHub", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a code block
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(lang) = code_block.take() {
                        let highlighted = self.highlight_code(&code_block_content, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                event => events.push(event),
            }
        }

        let toc = assign_heading_ids(&mut events);
        let events = replace_toc_marker(events, &toc);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => add_line_numbers(&highlighted),
            Some(highlighted) => format!(r#"<div class="codehilite">{}</div>"#, highlighted),
            None => format!(
                r#"<div class="codehilite"><pre><code class="language-{}">{}</code></pre></div>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Give every heading an `id` anchor and return them in document order.
///
/// Explicit ids are kept; generated ones are slugs of the heading text,
/// suffixed `_1`, `_2`, ... when already taken.
fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    let mut used = HashSet::new();

    let mut i = 0;
    while i < events.len() {
        let (level, existing) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => {
                (*level as usize, id.as_ref().map(|id| id.to_string()))
            }
            _ => {
                i += 1;
                continue;
            }
        };

        let mut title = String::new();
        let mut end = i + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(text) | Event::Code(text) => title.push_str(text),
                _ => {}
            }
            end += 1;
        }

        let id = existing.unwrap_or_else(|| unique_anchor(&title, &used));
        used.insert(id.clone());

        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
            *slot = Some(CowStr::from(id.clone()));
        }

        toc.push(TocEntry { level, id, title });
        i = end + 1;
    }

    toc
}

fn unique_anchor(title: &str, used: &HashSet<String>) -> String {
    let mut base = slug::slugify(title);
    if base.is_empty() {
        base = "_".to_string();
    }
    if !used.contains(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(base)
}

/// Swap each paragraph consisting only of `[TOC]` for the rendered table of contents
fn replace_toc_marker<'a>(events: Vec<Event<'a>>, toc: &[TocEntry]) -> Vec<Event<'a>> {
    let mut output = Vec::with_capacity(events.len());
    let mut i = 0;

    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::Paragraph)) {
            if let Some(end) = toc_marker_end(&events, i) {
                output.push(Event::Html(CowStr::from(render_toc(toc))));
                i = end + 1;
                continue;
            }
        }
        output.push(events[i].clone());
        i += 1;
    }

    output
}

fn toc_marker_end(events: &[Event<'_>], start: usize) -> Option<usize> {
    let mut text = String::new();
    for (offset, event) in events[start + 1..].iter().enumerate() {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == TOC_MARKER).then_some(start + 1 + offset);
            }
            _ => return None,
        }
    }
    None
}

/// Render the collected headings as nested lists
fn render_toc(entries: &[TocEntry]) -> String {
    let mut html = String::from("<div class=\"toc\">\n");
    let mut open_levels: Vec<usize> = Vec::new();

    for entry in entries {
        while open_levels.last().is_some_and(|&level| level > entry.level) {
            html.push_str("</li>\n</ul>\n");
            open_levels.pop();
        }
        match open_levels.last() {
            Some(&level) if level == entry.level => html.push_str("</li>\n"),
            _ => {
                html.push_str("<ul>\n");
                open_levels.push(entry.level);
            }
        }
        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            html_escape(&entry.id),
            html_escape(&entry.title)
        ));
    }
    while open_levels.pop().is_some() {
        html.push_str("</li>\n</ul>\n");
    }

    html.push_str("</div>\n");
    html
}

/// Wrap highlighted code in a two-column line-number table
fn add_line_numbers(highlighted: &str) -> String {
    // syntect wraps the code in `<pre style=...>\n ... </pre>\n`
    let (open, body) = match highlighted.find('>') {
        Some(end) if highlighted.starts_with("<pre") => {
            (&highlighted[..=end], &highlighted[end + 1..])
        }
        _ => ("<pre>", highlighted),
    };
    let body = body.strip_prefix('\n').unwrap_or(body);
    let body = body.trim_end();
    let body = body.strip_suffix("</pre>").unwrap_or(body);

    let gutter = (1..=count_code_lines(body))
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<table class="codehilitetable"><tr><td class="linenos"><pre>{}</pre></td><td class="code"><div class="codehilite">{}{}</pre></div></td></tr></table>"#,
        gutter, open, body
    )
}

/// Lines of code in highlighted markup; a closing tag after the last newline is not a line
fn count_code_lines(body: &str) -> usize {
    let newlines = body.matches('\n').count();
    let tail = body.rsplit('\n').next().unwrap_or("");

    let mut in_tag = false;
    let tail_has_text = tail.chars().any(|c| match c {
        '<' => {
            in_tag = true;
            false
        }
        '>' => {
            in_tag = false;
            false
        }
        c => !in_tag && !c.is_whitespace(),
    });

    (newlines + usize::from(tail_has_text)).max(1)
}

/// Simple HTML escaping
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

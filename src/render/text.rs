//! Shared text plumbing for both emitters: line-oriented writers that know
//! about comment prefixes and indentation, and the description flattener
//! that turns prose trees into comment text.
//!
//! Blank lines are budgeted, not written: markers accumulate in
//! `pending_newlines` and flush (capped at one blank line) only when
//! non-blank content follows, so output never starts with a blank run and
//! never stacks duplicates.

use crate::model::{DescriptionNode, Link, LinkKind, ParagraphKind, TextStyle};

/// Sink the flattener writes through. Implementations own the character
/// buffering and the per-line decoration (comment prefixes, indent).
pub trait StubWriter {
    /// Write text; embedded newlines start fresh decorated lines.
    fn write(&mut self, s: &str);

    fn write_line(&mut self, s: &str) {
        self.write(s);
        self.write("\n");
    }
}

/// Accumulates Lua stub text. In comment mode every line is prefixed with
/// the `---` annotation marker.
pub struct LuaWriter {
    out: String,
    in_comment: bool,
    at_line_start: bool,
}

impl LuaWriter {
    pub fn new() -> Self {
        LuaWriter {
            out: String::new(),
            in_comment: false,
            at_line_start: true,
        }
    }

    pub fn enter_comment(&mut self) {
        self.in_comment = true;
    }

    pub fn exit_comment(&mut self) {
        self.in_comment = false;
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn segment(&mut self, s: &str) {
        if self.at_line_start {
            if self.in_comment {
                self.out.push_str("---");
            }
            self.at_line_start = false;
        }
        self.out.push_str(s);
    }
}

impl StubWriter for LuaWriter {
    fn write(&mut self, s: &str) {
        let mut lines = s.split('\n');
        if let Some(first) = lines.next() {
            self.segment(first);
        }
        for line in lines {
            self.out.push('\n');
            self.at_line_start = true;
            // eager: blank lines inside a comment still carry the marker,
            // keeping the annotation block attached
            self.segment(line);
        }
    }

    fn write_line(&mut self, s: &str) {
        self.write(s);
        self.out.push('\n');
        self.at_line_start = true;
    }
}

/// Accumulates TypeScript declaration text with two-space indentation. In
/// comment mode lines are decorated as JSDoc continuation lines and any
/// `*/` in content is defused.
pub struct TsWriter {
    out: String,
    indent: usize,
    in_comment: bool,
    at_line_start: bool,
}

impl TsWriter {
    pub fn new() -> Self {
        TsWriter {
            out: String::new(),
            indent: 0,
            in_comment: false,
            at_line_start: true,
        }
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub fn decrease_indent(&mut self) {
        debug_assert!(self.indent > 0);
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn enter_comment(&mut self) {
        self.finish_line();
        self.push_indent();
        self.out.push_str("/**\n");
        self.at_line_start = true;
        self.in_comment = true;
    }

    pub fn exit_comment(&mut self) {
        self.finish_line();
        self.in_comment = false;
        self.push_indent();
        self.out.push_str(" */\n");
        self.at_line_start = true;
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn finish_line(&mut self) {
        if !self.at_line_start {
            self.out.push('\n');
            self.at_line_start = true;
        }
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn segment(&mut self, s: &str) {
        if self.at_line_start {
            self.push_indent();
            if self.in_comment {
                self.out.push_str(" * ");
            }
            self.at_line_start = false;
        }
        if self.in_comment && s.contains("*/") {
            // a literal end-of-comment inside prose would cut the block short
            self.out.push_str(&s.replace("*/", "*\u{2060}/"));
        } else {
            self.out.push_str(s);
        }
    }
}

impl StubWriter for TsWriter {
    fn write(&mut self, s: &str) {
        let mut lines = s.split('\n');
        if let Some(first) = lines.next() {
            self.segment(first);
        }
        for line in lines {
            self.out.push('\n');
            self.at_line_start = true;
            self.segment(line);
        }
    }

    fn write_line(&mut self, s: &str) {
        self.write(s);
        self.out.push('\n');
        self.at_line_start = true;
    }
}

/// How the flattener renders cross-reference links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// Type links as `target` in backticks, external links as markdown.
    Lua,
    /// JSDoc `{@link target display}` inline tags.
    Ts,
}

/// Flattens a description tree into a writer.
///
/// Inline mode (parameter and return annotations) collapses every line
/// break into a single space instead of flushing newlines.
pub struct Flattener<'w, W: StubWriter> {
    writer: &'w mut W,
    link_style: LinkStyle,
    inline: bool,
    format_links: bool,
    pending_newlines: usize,
    /// Anything written yet? Gates leading blank runs.
    begun: bool,
    /// Set right after a structural prefix (`- `, admonition label) so the
    /// following content attaches to it instead of breaking away.
    suppress_breaks: bool,
}

impl<'w, W: StubWriter> Flattener<'w, W> {
    pub fn block(writer: &'w mut W, link_style: LinkStyle) -> Self {
        Flattener {
            writer,
            link_style,
            inline: false,
            format_links: true,
            pending_newlines: 0,
            begun: false,
            suppress_breaks: false,
        }
    }

    pub fn inline(writer: &'w mut W, link_style: LinkStyle) -> Self {
        Flattener {
            inline: true,
            ..Flattener::block(writer, link_style)
        }
    }

    pub fn write_description(&mut self, nodes: &[DescriptionNode]) {
        for node in nodes {
            match node {
                DescriptionNode::Text { style, content } => self.write_text(*style, content),
                DescriptionNode::Code(content) => self.emit(&format!("`{content}`")),
                DescriptionNode::Link(link) => self.write_link(link),
                DescriptionNode::List(items) => self.write_list(items),
                DescriptionNode::Paragraph { kind, children } => {
                    self.write_paragraph(*kind, children)
                }
                DescriptionNode::Admonition { kind, children } => {
                    self.request_break();
                    self.emit(&format!("**{}**: ", kind.label()));
                    self.suppress_breaks = true;
                    self.write_description(children);
                    self.suppress_breaks = false;
                }
            }
        }
    }

    fn write_text(&mut self, style: TextStyle, content: &str) {
        match style {
            TextStyle::Normal => self.write_normal_text(content),
            TextStyle::Bold => self.emit(&format!("**{content}**")),
            TextStyle::Italic => self.emit(&format!("***{content}***")),
            TextStyle::Header => {
                self.request_break();
                self.emit(&format!("**{content}**"));
                self.request_break();
            }
        }
    }

    /// Leading/trailing whitespace runs containing a newline become blank
    /// markers; pure-space runs are interword spacing and stay verbatim.
    fn write_normal_text(&mut self, content: &str) {
        let mut content = content;

        let trimmed = content.trim_start();
        let prefix = &content[..content.len() - trimmed.len()];
        if prefix.contains('\n') {
            self.pending_newlines += prefix.matches('\n').count();
            content = trimmed;
        }
        if content.is_empty() {
            return;
        }

        let trimmed = content.trim_end();
        let suffix = &content[trimmed.len()..];
        let mut trailing = 0;
        if suffix.contains('\n') {
            trailing = suffix.matches('\n').count();
            content = trimmed;
        }

        self.emit(content);
        self.pending_newlines += trailing;
    }

    fn write_link(&mut self, link: &Link) {
        let text = match self.link_style {
            LinkStyle::Lua => match link.kind {
                LinkKind::TypeLink if self.format_links => format!("`{}`", link.target),
                LinkKind::TypeLink => link.target.clone(),
                LinkKind::ExternalLink => format!("[{}]({})", link.display, link.target),
            },
            LinkStyle::Ts if self.format_links => {
                format!("{{@link {} {}}}", link.target, link.display)
            }
            LinkStyle::Ts => link.target.clone(),
        };
        self.emit(&text);
    }

    fn write_list(&mut self, items: &[Vec<DescriptionNode>]) {
        self.pending_newlines = self.pending_newlines.max(1);
        for (i, item) in items.iter().enumerate() {
            self.emit("- ");
            self.suppress_breaks = true;
            self.write_description(item);
            self.suppress_breaks = false;
            if i + 1 != items.len() {
                self.pending_newlines = self.pending_newlines.max(1);
            }
        }
    }

    fn write_paragraph(&mut self, kind: ParagraphKind, children: &[DescriptionNode]) {
        if self.inline || kind == ParagraphKind::Default {
            self.request_break();
            self.write_description(children);
            self.request_break();
            return;
        }

        // Fenced block; link markup would be noise inside it.
        self.request_break();
        self.emit("```");
        self.writer.write_line("");
        self.suppress_breaks = true;
        let saved = self.format_links;
        self.format_links = false;
        self.write_description(children);
        self.format_links = saved;
        self.suppress_breaks = false;
        self.pending_newlines = 1;
        self.emit("```");
        self.request_break();
    }

    /// Ask for a paragraph boundary: at most one blank line, merged with
    /// whatever is already pending.
    fn request_break(&mut self) {
        self.pending_newlines = self.pending_newlines.max(2);
    }

    /// Write content, flushing the newline budget first.
    fn emit(&mut self, s: &str) {
        self.flush();
        if self.inline {
            self.writer.write(&s.replace('\n', " "));
        } else {
            self.writer.write(s);
        }
        self.begun = true;
        self.suppress_breaks = false;
    }

    fn flush(&mut self) {
        if self.pending_newlines > 0 && self.begun && !self.suppress_breaks {
            if self.inline {
                self.writer.write(" ");
            } else {
                for _ in 0..self.pending_newlines.min(2) {
                    self.writer.write("\n");
                }
            }
        }
        self.pending_newlines = 0;
    }
}

/// Flatten a description to a single line of plain text (for annotation
/// tails like `@param` descriptions).
pub fn inline_text(nodes: &[DescriptionNode], link_style: LinkStyle) -> String {
    let mut writer = PlainWriter::default();
    Flattener::inline(&mut writer, link_style).write_description(nodes);
    writer.out
}

#[derive(Default)]
struct PlainWriter {
    out: String,
}

impl StubWriter for PlainWriter {
    fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }
}

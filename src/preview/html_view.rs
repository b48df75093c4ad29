//! HTML preview rendering
//!
//! egui cannot display HTML directly, so the converter output is reduced to
//! a list of styled blocks (headings, paragraphs, list items, code, rules)
//! and laid out with egui text jobs. Unknown tags are ignored and their text
//! kept.

use eframe::egui::{
    self, text::LayoutJob, Color32, FontFamily, FontId, RichText, Stroke, TextFormat, Ui,
};

// ─────────────────────────────────────────────────────────────────────────────
// Document model
// ─────────────────────────────────────────────────────────────────────────────

/// Inline style of a run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub link: bool,
    pub strike: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    /// List item with its marker (`•` or `3.`)
    ListItem(String),
    Code,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Nesting depth from lists and block quotes
    pub indent: usize,
    pub quoted: bool,
    pub spans: Vec<Span>,
}

impl Block {
    /// Plain text of the block.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Builder {
    blocks: Vec<Block>,
    kind: Option<BlockKind>,
    spans: Vec<Span>,
    bold: usize,
    italic: usize,
    code: usize,
    link: usize,
    strike: usize,
    /// Counter for each open list; `None` for unordered lists
    lists: Vec<Option<usize>>,
    quote_depth: usize,
    in_pre: bool,
    /// Inside `<script>`, `<style>` or `<head>`
    skipping: usize,
}

impl Builder {
    fn style(&self) -> SpanStyle {
        SpanStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            code: self.code > 0 || self.in_pre,
            link: self.link > 0,
            strike: self.strike > 0,
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.skipping > 0 {
            return;
        }
        let text = if self.in_pre {
            text.to_string()
        } else {
            collapse_whitespace(text, self.spans.is_empty())
        };
        if text.is_empty() {
            return;
        }

        let style = self.style();
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(&text),
            _ => self.spans.push(Span { text, style }),
        }
    }

    fn start(&mut self, kind: BlockKind) {
        self.flush();
        self.kind = Some(kind);
    }

    /// Finish the current block, dropping it if it holds only whitespace.
    fn flush(&mut self) {
        let kind = self.kind.take().unwrap_or(BlockKind::Paragraph);
        let mut spans = std::mem::take(&mut self.spans);

        if kind != BlockKind::Code {
            if let Some(last) = spans.last_mut() {
                let trimmed = last.text.trim_end().len();
                last.text.truncate(trimmed);
            }
        }
        if spans.iter().all(|s| s.text.trim().is_empty()) && kind != BlockKind::Rule {
            return;
        }

        self.blocks.push(Block {
            kind,
            indent: self.lists.len().saturating_sub(1) + self.quote_depth,
            quoted: self.quote_depth > 0,
            spans,
        });
    }

    fn open_tag(&mut self, name: &str) {
        match name {
            "script" | "style" | "head" | "title" => self.skipping += 1,
            h if is_heading(h) => {
                let level = h[1..].parse().unwrap_or(1);
                self.start(BlockKind::Heading(level));
            }
            "p" | "div" | "tr" | "dt" | "dd" => self.start(BlockKind::Paragraph),
            "pre" => {
                self.start(BlockKind::Code);
                self.in_pre = true;
            }
            "ul" => {
                self.flush();
                self.lists.push(None);
            }
            "ol" => {
                self.flush();
                self.lists.push(Some(0));
            }
            "li" => {
                let marker = match self.lists.last_mut() {
                    Some(Some(counter)) => {
                        *counter += 1;
                        format!("{}.", counter)
                    }
                    _ => "•".to_string(),
                };
                self.start(BlockKind::ListItem(marker));
            }
            "blockquote" => {
                self.flush();
                self.quote_depth += 1;
            }
            "hr" => {
                self.start(BlockKind::Rule);
                self.flush();
            }
            "br" => self.push_raw("\n"),
            "td" | "th" => self.push_raw("  "),
            "strong" | "b" => self.bold += 1,
            "em" | "i" => self.italic += 1,
            "code" | "kbd" | "tt" => self.code += 1,
            "a" => self.link += 1,
            "del" | "s" | "strike" => self.strike += 1,
            _ => {}
        }
    }

    fn close_tag(&mut self, name: &str) {
        match name {
            "script" | "style" | "head" | "title" => self.skipping = self.skipping.saturating_sub(1),
            h if is_heading(h) => self.flush(),
            "p" | "div" | "tr" | "li" | "dt" | "dd" => self.flush(),
            "pre" => {
                self.flush();
                self.in_pre = false;
            }
            "ul" | "ol" => {
                self.flush();
                self.lists.pop();
            }
            "blockquote" => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            "strong" | "b" => self.bold = self.bold.saturating_sub(1),
            "em" | "i" => self.italic = self.italic.saturating_sub(1),
            "code" | "kbd" | "tt" => self.code = self.code.saturating_sub(1),
            "a" => self.link = self.link.saturating_sub(1),
            "del" | "s" | "strike" => self.strike = self.strike.saturating_sub(1),
            _ => {}
        }
    }

    /// Append text without whitespace collapsing.
    fn push_raw(&mut self, text: &str) {
        if self.skipping > 0 {
            return;
        }
        let style = self.style();
        self.spans.push(Span {
            text: text.to_string(),
            style,
        });
    }
}

fn is_heading(name: &str) -> bool {
    name.len() == 2 && name.starts_with('h') && matches!(name.as_bytes()[1], b'1'..=b'6')
}

/// Collapse runs of whitespace to single spaces, HTML style.
fn collapse_whitespace(text: &str, at_block_start: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !(at_block_start && out.is_empty()) {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }
    if pending_space && !(at_block_start && out.is_empty()) {
        out.push(' ');
    }
    out
}

/// Decode the character references converters commonly emit.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after.find(';').filter(|&end| end <= 10).and_then(|end| {
            let name = &after[..end];
            let c = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "mdash" => Some('—'),
                "ndash" => Some('–'),
                "hellip" => Some('…'),
                "copy" => Some('©'),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse an HTML fragment or document into preview blocks.
pub fn parse_html(html: &str) -> Vec<Block> {
    let mut builder = Builder::default();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            builder.push_text(&decode_entities(rest));
            break;
        };
        if lt > 0 {
            builder.push_text(&decode_entities(&rest[..lt]));
        }
        rest = &rest[lt..];

        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.find("-->").map(|end| &comment[end + 3..]).unwrap_or("");
            continue;
        }

        let Some(gt) = rest.find('>') else {
            builder.push_text(&decode_entities(rest));
            break;
        };
        let tag = &rest[1..gt];
        rest = &rest[gt + 1..];

        let (closing, body) = match tag.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, tag),
        };
        let name = body
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if name.is_empty() || name.starts_with('!') || name.starts_with('?') {
            continue;
        }

        if closing {
            builder.close_tag(&name);
        } else if name == "img" {
            if let Some(alt) = attribute(body, "alt") {
                builder.italic += 1;
                builder.push_text(&format!("[{}]", decode_entities(&alt)));
                builder.italic -= 1;
            }
        } else {
            builder.open_tag(&name);
        }
    }

    builder.flush();
    builder.blocks
}

/// Value of a quoted attribute in a tag body.
fn attribute(tag_body: &str, name: &str) -> Option<String> {
    let needle = format!("{}=", name);
    let start = tag_body.find(&needle)? + needle.len();
    let value = &tag_body[start..];
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    value.find(quote).map(|end| value[..end].to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Lay out parsed blocks into the current UI.
pub fn show_blocks(ui: &mut Ui, blocks: &[Block], font_size: f32) {
    let text_color = ui.visuals().text_color();
    let link_color = ui.visuals().hyperlink_color;
    let code_bg = ui.visuals().code_bg_color;
    let weak = ui.visuals().weak_text_color();

    for block in blocks {
        let indent = block.indent as f32 * 16.0;
        match &block.kind {
            BlockKind::Rule => {
                ui.add_space(4.0);
                ui.separator();
                ui.add_space(4.0);
            }
            BlockKind::Code => {
                ui.add_space(4.0);
                egui::Frame::none()
                    .fill(code_bg)
                    .inner_margin(8.0)
                    .rounding(4.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(
                            RichText::new(block.text().trim_end_matches('\n'))
                                .font(FontId::monospace(font_size * 0.9))
                                .color(text_color),
                        );
                    });
                ui.add_space(4.0);
            }
            kind => {
                let size = match kind {
                    BlockKind::Heading(1) => font_size * 1.8,
                    BlockKind::Heading(2) => font_size * 1.5,
                    BlockKind::Heading(3) => font_size * 1.3,
                    BlockKind::Heading(4) => font_size * 1.15,
                    BlockKind::Heading(5) => font_size * 1.05,
                    _ => font_size,
                };
                let heading = matches!(kind, BlockKind::Heading(_));
                if heading {
                    ui.add_space(if size > font_size * 1.4 { 8.0 } else { 4.0 });
                }

                let mut job = LayoutJob::default();
                job.wrap.max_width = (ui.available_width() - indent).max(50.0);
                if let BlockKind::ListItem(marker) = kind {
                    job.append(
                        &format!("{} ", marker),
                        0.0,
                        TextFormat::simple(FontId::proportional(size), weak),
                    );
                }
                for span in &block.spans {
                    let format = span_format(
                        span.style,
                        size,
                        heading || span.style.bold,
                        text_color,
                        link_color,
                        code_bg,
                        block.quoted,
                        weak,
                    );
                    job.append(&span.text, 0.0, format);
                }

                ui.horizontal(|ui| {
                    ui.add_space(indent);
                    if block.quoted {
                        let (rect, _) = ui
                            .allocate_exact_size(egui::vec2(3.0, size), egui::Sense::hover());
                        ui.painter().rect_filled(rect, 0.0, weak);
                    }
                    ui.label(job);
                });
                ui.add_space(if heading { 2.0 } else { 6.0 });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn span_format(
    style: SpanStyle,
    size: f32,
    strong: bool,
    text_color: Color32,
    link_color: Color32,
    code_bg: Color32,
    quoted: bool,
    weak: Color32,
) -> TextFormat {
    let font_id = if style.code {
        FontId::new(size * 0.9, FontFamily::Monospace)
    } else {
        FontId::new(size, FontFamily::Proportional)
    };
    let color = if style.link {
        link_color
    } else if quoted {
        weak
    } else if strong {
        text_color.gamma_multiply(1.15)
    } else {
        text_color
    };

    TextFormat {
        font_id,
        color,
        italics: style.italic,
        background: if style.code { code_bg } else { Color32::TRANSPARENT },
        underline: if style.link {
            Stroke::new(1.0, link_color)
        } else {
            Stroke::NONE
        },
        strikethrough: if style.strike {
            Stroke::new(1.0, color)
        } else {
            Stroke::NONE
        },
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

/// Block layout for a captured DOM subtree.
///
/// Text uses a fixed 8x8 glyph cell: headings (`h1`, `h2`) and `.amount`
/// paragraphs are drawn at 2x, everything else at 1x. Blocks stack
/// vertically; the region is as tall as its content.

use crate::{Error, Result};
use scraper::{ElementRef, Html, Selector};

/// Glyph cell size in logical pixels at scale 1
pub const GLYPH: u32 = 8;
/// Extra space between wrapped lines, multiplied by the text scale
pub const LINE_GAP: u32 = 4;
const PADDING: u32 = 16;
const BLOCK_GAP: u32 = 6;
const BANNER_PAD: u32 = 12;
const RULE_MARGIN: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Title,
    Heading,
    Paragraph,
    /// Horizontal separator
    Rule,
    /// Filled band behind a group of blocks
    Banner,
}

/// How a text block is coloured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Strong,
    Body,
    Muted,
    /// Light text on a banner
    Inverse,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub rect: Rect,
    /// Wrapped text, one line per `\n`; empty for rules and banners
    pub text: String,
    pub elem_type: ElementType,
    pub scale: u32,
    pub tone: Tone,
}

/// Laid-out region: its size in logical pixels and the nodes in paint order
#[derive(Debug, Clone)]
pub struct RegionLayout {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<LayoutNode>,
}

/// Lay out the first element matching `selector`.
///
/// Returns `Ok(None)` when nothing matches or the matched subtree has no
/// visible text.
pub fn layout_region(
    document: &Html,
    selector: &str,
    width: u32,
) -> Result<Option<RegionLayout>> {
    let sel = Selector::parse(selector)
        .map_err(|e| Error::RenderError(format!("invalid selector {:?}: {:?}", selector, e)))?;
    let root = match document.select(&sel).next() {
        Some(root) => root,
        None => return Ok(None),
    };

    let mut flow = Flow { y: PADDING, width, nodes: Vec::new() };
    flow.walk(root, false);

    if flow.nodes.iter().all(|n| n.text.is_empty()) {
        return Ok(None);
    }

    Ok(Some(RegionLayout {
        width,
        height: flow.y + PADDING,
        nodes: flow.nodes,
    }))
}

/// Greedy word wrap to `chars_per_line` columns
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.chars().count() + word.chars().count() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

struct Flow {
    y: u32,
    width: u32,
    nodes: Vec<LayoutNode>,
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

impl Flow {
    fn walk(&mut self, el: ElementRef<'_>, inverse: bool) {
        let heading_tone = if inverse { Tone::Inverse } else { Tone::Strong };
        for child in el.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "hr" => self.rule(),
                "h1" | "h2" => self.text_block(child, ElementType::Title, 2, heading_tone),
                "h3" | "h4" | "h5" | "h6" => {
                    self.text_block(child, ElementType::Heading, 1, heading_tone)
                }
                "p" | "li" => {
                    let (scale, tone) = if inverse {
                        (1, Tone::Inverse)
                    } else if has_class(&child, "amount") {
                        (2, Tone::Strong)
                    } else if has_class(&child, "muted") {
                        (1, Tone::Muted)
                    } else {
                        (1, Tone::Body)
                    };
                    self.text_block(child, ElementType::Paragraph, scale, tone);
                }
                "button" | "script" | "style" | "template" => {}
                _ if has_class(&child, "banner") => self.banner(child),
                _ => self.walk(child, inverse),
            }
        }
    }

    fn text_block(&mut self, el: ElementRef<'_>, elem_type: ElementType, scale: u32, tone: Tone) {
        let raw = el.text().collect::<String>();
        let content_w = self.width.saturating_sub(PADDING * 2);
        let lines = wrap_text(&raw, (content_w / (GLYPH * scale)) as usize);
        if lines.is_empty() {
            return;
        }

        let count = lines.len() as u32;
        let height = count * GLYPH * scale + (count - 1) * LINE_GAP * scale;
        self.nodes.push(LayoutNode {
            rect: Rect { x: PADDING as i32, y: self.y as i32, width: content_w, height },
            text: lines.join("\n"),
            elem_type,
            scale,
            tone,
        });
        self.y += height + BLOCK_GAP;
    }

    fn rule(&mut self) {
        self.y += RULE_MARGIN.saturating_sub(BLOCK_GAP);
        self.nodes.push(LayoutNode {
            rect: Rect {
                x: PADDING as i32,
                y: self.y as i32,
                width: self.width.saturating_sub(PADDING * 2),
                height: 1,
            },
            text: String::new(),
            elem_type: ElementType::Rule,
            scale: 1,
            tone: Tone::Muted,
        });
        self.y += 1 + RULE_MARGIN;
    }

    fn banner(&mut self, el: ElementRef<'_>) {
        let top = self.y;
        let idx = self.nodes.len();
        self.nodes.push(LayoutNode {
            rect: Rect { x: 0, y: top as i32, width: self.width, height: 0 },
            text: String::new(),
            elem_type: ElementType::Banner,
            scale: 1,
            tone: Tone::Inverse,
        });

        self.y += BANNER_PAD;
        self.walk(el, true);
        self.y = self.y.saturating_sub(BLOCK_GAP) + BANNER_PAD;
        self.nodes[idx].rect.height = self.y - top;
        self.y += BLOCK_GAP * 2;
    }
}

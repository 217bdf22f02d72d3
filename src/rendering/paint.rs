/// Display list built from a region layout

use crate::rendering::layout::{ElementType, RegionLayout, Tone};
use crate::Rgba;

const BANNER: Rgba = (22, 163, 74, 255);
const RULE: Rgba = (229, 231, 235, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
}

pub fn tone_color(tone: Tone) -> Rgba {
    match tone {
        Tone::Strong => (17, 24, 39, 255),
        Tone::Body => (75, 85, 99, 255),
        Tone::Muted => (107, 114, 128, 255),
        Tone::Inverse => (255, 255, 255, 255),
    }
}

/// Commands in paint order, starting with a full-size background fill
pub fn display_list(layout: &RegionLayout, background: Rgba) -> Vec<PaintCommand> {
    let mut cmds = Vec::with_capacity(layout.nodes.len() + 1);
    cmds.push(PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: layout.width,
        height: layout.height,
        rgba: background,
    });

    for node in &layout.nodes {
        let r = &node.rect;
        match node.elem_type {
            ElementType::Banner | ElementType::Rule => cmds.push(PaintCommand::SolidRect {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                rgba: if node.elem_type == ElementType::Banner { BANNER } else { RULE },
            }),
            _ => cmds.push(PaintCommand::Text {
                x: r.x,
                y: r.y,
                text: node.text.clone(),
                scale: node.scale,
                rgba: tone_color(node.tone),
            }),
        }
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::layout_region;
    use scraper::Html;

    #[test]
    fn background_comes_first_then_nodes_in_order() {
        let doc = Html::parse_document(
            r#"<div id="r"><div class="banner"><h2>T</h2></div><hr><p>body</p></div>"#,
        );
        let layout = layout_region(&doc, "#r", 200).unwrap().unwrap();
        let cmds = display_list(&layout, crate::WHITE);

        match &cmds[0] {
            PaintCommand::SolidRect { width, height, rgba, .. } => {
                assert_eq!(*width, layout.width);
                assert_eq!(*height, layout.height);
                assert_eq!(*rgba, crate::WHITE);
            }
            _ => panic!("unexpected"),
        }
        assert!(matches!(cmds[1], PaintCommand::SolidRect { rgba: BANNER, .. }));
        assert!(matches!(&cmds[2], PaintCommand::Text { text, scale: 2, .. } if text == "T"));
        assert!(matches!(cmds[3], PaintCommand::SolidRect { rgba: RULE, height: 1, .. }));
        assert!(matches!(&cmds[4], PaintCommand::Text { text, .. } if text == "body"));
    }
}

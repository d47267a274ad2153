//! Flow layout: [`RenderedDocument`] → positioned draw operations.
//!
//! This is the rasteriser's view of a template. It walks the block tree top to
//! bottom, wraps text greedily by word, and emits a flat list of [`DrawOp`]s
//! on a [`Canvas`] whose width is fixed and whose height is whatever the
//! content needs. Coordinates are points with the origin at the top-left.
//!
//! Text is measured with fixed per-glyph advance estimates for the three
//! standard PDF families. They are close enough for the built-in fonts the
//! PDF painter uses, and they keep layout deterministic without loading any
//! font files.

use super::block::{palette, Align, Block, BoxStyle, FontFamily, Marker, Rgb, TextStyle};
use super::RenderedDocument;

/// Line height as a multiple of font size.
const LEADING: f32 = 1.45;
/// Vertical gap between bullet items.
const BULLET_GAP: f32 = 3.0;
/// Inner padding of a drawn chip (horizontal, vertical).
const CHIP_PAD: (f32, f32) = (4.0, 2.0);

/// Resolved font for a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontFace {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Rgb,
    },
    /// `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        face: FontFace,
        size: f32,
        color: Rgb,
    },
}

/// A laid-out page of unbounded height.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub background: Rgb,
    pub ops: Vec<DrawOp>,
}

/// Lay a rendered document out at the given width.
pub fn layout(doc: &RenderedDocument, width: f32) -> Canvas {
    let pad = doc.page.padding;
    let mut ops = Vec::new();
    let ctx = Ctx {
        family: doc.page.family,
    };
    let content = ctx.place(&doc.root, pad, pad, (width - 2.0 * pad).max(0.0), &mut ops);
    let natural = content + 2.0 * pad;
    let height = doc.page.min_height.map_or(natural, |min| natural.max(min));
    Canvas {
        width,
        height,
        background: palette::WHITE,
        ops,
    }
}

/// Estimated advance width of `text`.
pub fn text_width(text: &str, face: FontFace, size: f32) -> f32 {
    let em: f32 = match face.family {
        FontFamily::Mono => text.chars().count() as f32 * 0.6,
        FontFamily::Sans | FontFamily::Serif => text.chars().map(glyph_advance).sum(),
    };
    let family = if face.family == FontFamily::Serif { 0.95 } else { 1.0 };
    let weight = if face.bold && face.family != FontFamily::Mono {
        1.06
    } else {
        1.0
    };
    em * family * weight * size
}

fn glyph_advance(c: char) -> f32 {
    match c {
        ' ' => 0.28,
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.25,
        'f' | 't' | 'r' | '(' | ')' | '-' | '/' => 0.35,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        '0'..='9' => 0.56,
        c if c.is_uppercase() => 0.68,
        _ => 0.52,
    }
}

/// Greedy word wrap. Blank input yields no lines; a word wider than the
/// line gets a line of its own.
pub fn wrap(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if text_width(&candidate, face, size) <= max_width {
                line = candidate;
            } else {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

struct Ctx {
    family: FontFamily,
}

impl Ctx {
    fn face(&self, style: &TextStyle) -> FontFace {
        FontFace {
            family: style.family.unwrap_or(self.family),
            bold: style.bold,
            italic: style.italic,
        }
    }

    /// Place `block` at (x, y) within `width`; returns the height used.
    fn place(&self, block: &Block, x: f32, y: f32, width: f32, ops: &mut Vec<DrawOp>) -> f32 {
        match block {
            Block::Text { text, style } => self.text(text, style, x, y, width, ops),

            Block::Split {
                left,
                left_style,
                right,
                right_style,
            } => {
                let right = right_style.display(right);
                let right_face = self.face(right_style);
                let right_w = text_width(&right, right_face, right_style.size);
                let left_w = if right.is_empty() {
                    width
                } else {
                    (width - right_w - 8.0).max(width * 0.4)
                };
                let left_h = self.text(left, left_style, x, y, left_w, ops);
                let right_h = if right.is_empty() {
                    0.0
                } else {
                    let lh = right_style.size * LEADING;
                    ops.push(text_op(x + width - right_w, y, lh, right, right_face, right_style));
                    lh
                };
                left_h.max(right_h)
            }

            Block::Bullets {
                marker,
                items,
                style,
                indent,
            } => {
                let face = self.face(style);
                let lh = style.size * LEADING;
                let mut cursor = y;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        cursor += BULLET_GAP;
                    }
                    let mid = cursor + lh / 2.0;
                    let mx = x + indent * 0.4;
                    match marker {
                        Marker::Disc => ops.push(DrawOp::Circle {
                            cx: mx,
                            cy: mid,
                            r: style.size * 0.14,
                            fill: style.color,
                        }),
                        Marker::Square => {
                            let s = style.size * 0.26;
                            ops.push(DrawOp::Rect {
                                x: mx - s / 2.0,
                                y: mid - s / 2.0,
                                w: s,
                                h: s,
                                fill: Some(style.color),
                                stroke: None,
                            })
                        }
                        Marker::Chevron => {
                            let s = style.size * 0.2;
                            let color = palette::BLUE_400;
                            ops.push(DrawOp::Line {
                                x1: mx - s / 2.0,
                                y1: mid - s,
                                x2: mx + s / 2.0,
                                y2: mid,
                                width: 0.9,
                                color,
                            });
                            ops.push(DrawOp::Line {
                                x1: mx + s / 2.0,
                                y1: mid,
                                x2: mx - s / 2.0,
                                y2: mid + s,
                                width: 0.9,
                                color,
                            });
                        }
                    }
                    let lines = wrap(&style.display(item), face, style.size, width - indent);
                    // An empty bullet still takes a line.
                    let count = lines.len().max(1);
                    for (n, line) in lines.into_iter().enumerate() {
                        ops.push(text_op(x + indent, cursor + n as f32 * lh, lh, line, face, style));
                    }
                    cursor += count as f32 * lh;
                }
                cursor - y
            }

            Block::Chips {
                items,
                style,
                fill,
                border,
                gap,
            } => {
                let face = self.face(style);
                let lh = style.size * LEADING;
                let drawn = fill.is_some() || border.is_some();
                let (px, py) = if drawn { CHIP_PAD } else { (0.0, 0.0) };
                let chip_h = lh + 2.0 * py;

                // Break into rows first so a centred row can be offset as a whole.
                let mut rows: Vec<Vec<(String, f32)>> = vec![Vec::new()];
                let mut row_w = 0.0;
                for item in items.iter().filter(|item| !item.is_empty()) {
                    let text = style.display(item);
                    let w = text_width(&text, face, style.size) + 2.0 * px;
                    let needed = if row_w > 0.0 { row_w + gap + w } else { w };
                    if needed > width && row_w > 0.0 {
                        rows.push(Vec::new());
                        row_w = w;
                    } else {
                        row_w = needed;
                    }
                    if let Some(row) = rows.last_mut() {
                        row.push((text, w));
                    }
                }
                rows.retain(|row| !row.is_empty());

                let mut cursor = y;
                for (r, row) in rows.iter().enumerate() {
                    if r > 0 {
                        cursor += gap;
                    }
                    let total: f32 =
                        row.iter().map(|(_, w)| w).sum::<f32>() + gap * (row.len() - 1) as f32;
                    let mut cx = match style.align {
                        Align::Left => x,
                        Align::Center => x + (width - total).max(0.0) / 2.0,
                        Align::Right => x + (width - total).max(0.0),
                    };
                    for (text, w) in row {
                        if drawn {
                            ops.push(DrawOp::Rect {
                                x: cx,
                                y: cursor,
                                w: *w,
                                h: chip_h,
                                fill: *fill,
                                stroke: *border,
                            });
                        }
                        ops.push(text_op(cx + px, cursor + py, lh, text.clone(), face, style));
                        cx += w + gap;
                    }
                    cursor += chip_h;
                }
                cursor - y
            }

            Block::Rule { color, width: thickness } => {
                ops.push(DrawOp::Line {
                    x1: x,
                    y1: y + thickness / 2.0,
                    x2: x + width,
                    y2: y + thickness / 2.0,
                    width: *thickness,
                    color: *color,
                });
                *thickness
            }

            Block::Stack { gap, children } => {
                let mut cursor = y;
                let mut placed = 0;
                for child in children {
                    let top = if placed > 0 { cursor + gap } else { cursor };
                    let h = self.place(child, x, top, width, ops);
                    if h > 0.0 {
                        cursor = top + h;
                        placed += 1;
                    }
                }
                cursor - y
            }

            Block::Columns { gap, columns } => {
                if columns.is_empty() {
                    return 0.0;
                }
                let usable = (width - gap * (columns.len() - 1) as f32).max(0.0);
                let mut cx = x;
                let mut tallest: f32 = 0.0;
                for column in columns {
                    let w = usable * f32::from(column.span) / 12.0;
                    tallest = tallest.max(self.place(&column.block, cx, y, w, ops));
                    cx += w + gap;
                }
                tallest
            }

            Block::Panel { style, child } => self.panel(style, child, x, y, width, ops),

            Block::Notice { title, detail } => {
                let title_style = TextStyle::new(12.0).bold().color(palette::RED_500).center();
                let detail_style = TextStyle::new(10.5).center();
                let top = y + 12.0;
                let h1 = self.text(title, &title_style, x, top, width, ops);
                let h2 = self.text(detail, &detail_style, x, top + h1 + 6.0, width, ops);
                h1 + h2 + 6.0 + 24.0
            }
        }
    }

    fn text(
        &self,
        text: &str,
        style: &TextStyle,
        x: f32,
        y: f32,
        width: f32,
        ops: &mut Vec<DrawOp>,
    ) -> f32 {
        let face = self.face(style);
        let lh = style.size * LEADING;
        let lines = wrap(&style.display(text), face, style.size, width);
        let count = lines.len();
        for (n, line) in lines.into_iter().enumerate() {
            let w = text_width(&line, face, style.size);
            let lx = match style.align {
                Align::Left => x,
                Align::Center => x + (width - w).max(0.0) / 2.0,
                Align::Right => x + (width - w).max(0.0),
            };
            ops.push(text_op(lx, y + n as f32 * lh, lh, line, face, style));
        }
        count as f32 * lh
    }

    fn panel(
        &self,
        style: &BoxStyle,
        child: &Block,
        x: f32,
        y: f32,
        width: f32,
        ops: &mut Vec<DrawOp>,
    ) -> f32 {
        let p = style.padding;
        let border_left = style.border_left.map_or(0.0, |e| e.width);
        let border_bottom = style.border_bottom.map_or(0.0, |e| e.width);
        let start = ops.len();

        let inner_x = x + border_left + p.left;
        let inner_w = (width - border_left - p.left - p.right).max(0.0);
        let child_h = self.place(child, inner_x, y + p.top, inner_w, ops);
        let height = p.top + child_h + p.bottom + border_bottom;

        // Backgrounds go under the content that was just placed.
        let mut under = Vec::new();
        if let Some(fill) = style.fill {
            under.push(DrawOp::Rect {
                x,
                y,
                w: width,
                h: height,
                fill: Some(fill),
                stroke: None,
            });
        }
        if let Some(edge) = style.border_left {
            under.push(DrawOp::Rect {
                x,
                y,
                w: edge.width,
                h: height,
                fill: Some(edge.color),
                stroke: None,
            });
        }
        for (i, op) in under.into_iter().enumerate() {
            ops.insert(start + i, op);
        }

        if let Some(edge) = style.border_bottom {
            let ly = y + height - edge.width / 2.0;
            ops.push(DrawOp::Line {
                x1: x,
                y1: ly,
                x2: x + width,
                y2: ly,
                width: edge.width,
                color: edge.color,
            });
        }
        if let Some(color) = style.dot {
            ops.push(DrawOp::Circle {
                cx: x + border_left / 2.0,
                cy: y + 6.0,
                r: 3.0,
                fill: color,
            });
        }
        height
    }
}

fn text_op(x: f32, top: f32, line_height: f32, text: String, face: FontFace, style: &TextStyle) -> DrawOp {
    DrawOp::Text {
        x,
        y: top + (line_height - style.size) / 2.0 + style.size * 0.8,
        text,
        face,
        size: style.size,
        color: style.color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample;
    use crate::template::{render, RenderMode, Template, A4_HEIGHT_PT, A4_WIDTH_PT};

    const SANS: FontFace = FontFace {
        family: FontFamily::Sans,
        bold: false,
        italic: false,
    };

    fn texts(canvas: &Canvas) -> Vec<&str> {
        canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("one two three four five six seven", SANS, 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, SANS, 10.0) <= 60.0 || !line.contains(' '));
        }
        assert_eq!(lines.join(" "), "one two three four five six seven");
    }

    #[test]
    fn wrap_blank_is_empty() {
        assert!(wrap("   ", SANS, 10.0, 100.0).is_empty());
    }

    #[test]
    fn mono_is_fixed_pitch() {
        let mono = FontFace {
            family: FontFamily::Mono,
            ..SANS
        };
        assert_eq!(text_width("iiii", mono, 10.0), text_width("MMMM", mono, 10.0));
    }

    #[test]
    fn screen_mode_fills_one_page() {
        let record = crate::record::ResumeRecord::default();
        let doc = render(&record, &Template::AtsOptimized, RenderMode::Screen);
        let canvas = layout(&doc, A4_WIDTH_PT);
        assert_eq!(canvas.height, A4_HEIGHT_PT);

        let doc = render(&record, &Template::AtsOptimized, RenderMode::Print);
        assert!(layout(&doc, A4_WIDTH_PT).height < A4_HEIGHT_PT);
    }

    #[test]
    fn layout_is_deterministic_and_inside_width() {
        let record = sample();
        for template in Template::CATALOGUE.iter() {
            let doc = render(&record, template, RenderMode::Print);
            let a = layout(&doc, A4_WIDTH_PT);
            assert_eq!(a, layout(&doc, A4_WIDTH_PT));
            for op in &a.ops {
                if let DrawOp::Text { x, .. } = op {
                    assert!(*x >= 0.0 && *x < A4_WIDTH_PT, "{template}: x={x}");
                }
            }
        }
    }

    #[test]
    fn panel_fill_is_drawn_beneath_text() {
        let record = sample();
        let doc = render(&record, &Template::SoftwareEngineer, RenderMode::Screen);
        let canvas = layout(&doc, A4_WIDTH_PT);
        let fill = canvas
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::Rect { fill: Some(c), .. } if *c == palette::SLATE_50))
            .unwrap();
        let summary = canvas
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::Text { text, .. } if text == "SUMMARY"))
            .unwrap();
        assert!(fill < summary);
    }

    #[test]
    fn empty_bullet_takes_a_line() {
        let style = TextStyle::new(10.0);
        let block = Block::Bullets {
            marker: Marker::Disc,
            items: vec!["a".into(), String::new()],
            style,
            indent: 10.0,
        };
        let mut ops = Vec::new();
        let h = Ctx {
            family: FontFamily::Sans,
        }
        .place(&block, 0.0, 0.0, 200.0, &mut ops);
        assert!((h - (2.0 * 10.0 * LEADING + BULLET_GAP)).abs() < 1e-3, "h={h}");
        let circles = ops.iter().filter(|op| matches!(op, DrawOp::Circle { .. })).count();
        assert_eq!(circles, 2);
    }

    #[test]
    fn sample_text_reaches_canvas() {
        let doc = render(&sample(), &Template::EnhancedChronological, RenderMode::Print);
        let canvas = layout(&doc, A4_WIDTH_PT);
        let all = texts(&canvas).join(" ");
        assert!(all.contains("Alex Morgan"));
        assert!(all.contains("PROFESSIONAL SUMMARY"));
    }
}

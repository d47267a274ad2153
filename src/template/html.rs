//! HTML serialisation of a rendered document, for on-screen preview.
//!
//! The output is a standalone page with inline styles only. Print mode adds an
//! `@page` rule for A4 and asks the browser not to split boxes marked
//! keep-together.

use super::block::{Align, Block, BoxStyle, FontFamily, Marker, TextStyle};
use super::{RenderMode, RenderedDocument, A4_WIDTH_PT};
use quick_xml::escape::escape;
use std::fmt::Write;

/// Serialise `doc` as a complete HTML document.
pub fn to_html(doc: &RenderedDocument) -> String {
    let mut body = String::new();
    write_block(&mut body, &doc.root);

    let page = &doc.page;
    let mut page_css = format!(
        "width:{A4_WIDTH_PT}pt;box-sizing:border-box;background:#fff;color:#1e293b;\
font-family:{};line-height:1.45;padding:{}pt;",
        family_css(page.family),
        page.padding
    );
    if let Some(min) = page.min_height {
        let _ = write!(page_css, "min-height:{min}pt;");
    }
    if page.shadow {
        page_css.push_str("box-shadow:0 10px 15px -3px rgba(0,0,0,.1);margin:24pt auto;");
    }

    let print_css = match doc.mode {
        RenderMode::Print => "@page{size:A4;margin:0}.keep{break-inside:avoid}",
        RenderMode::Screen => "body{background:#f1f5f9}",
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title}</title>\n<style>body{{margin:0}}ul{{margin:0;padding:0}}{print_css}</style>\n\
</head>\n<body>\n<div class=\"page\" data-template=\"{id}\" style=\"{page_css}\">\n{body}</div>\n</body>\n</html>\n",
        title = escape(doc.template.display_name()),
        id = escape(doc.template.id()),
    )
}

fn family_css(family: FontFamily) -> &'static str {
    match family {
        FontFamily::Sans => "Helvetica,Arial,sans-serif",
        FontFamily::Serif => "Georgia,'Times New Roman',serif",
        FontFamily::Mono => "'Courier New',Courier,monospace",
    }
}

fn text_css(style: &TextStyle) -> String {
    let mut css = format!("font-size:{}pt;color:{};", style.size, style.color.hex());
    if style.bold {
        css.push_str("font-weight:700;");
    }
    if style.italic {
        css.push_str("font-style:italic;");
    }
    if style.uppercase {
        css.push_str("text-transform:uppercase;");
    }
    match style.align {
        Align::Left => {}
        Align::Center => css.push_str("text-align:center;"),
        Align::Right => css.push_str("text-align:right;"),
    }
    if let Some(family) = style.family {
        let _ = write!(css, "font-family:{};", family_css(family));
    }
    css
}

fn box_css(style: &BoxStyle) -> String {
    let p = style.padding;
    let mut css = format!(
        "padding:{}pt {}pt {}pt {}pt;",
        p.top, p.right, p.bottom, p.left
    );
    if let Some(fill) = style.fill {
        let _ = write!(css, "background:{};", fill.hex());
    }
    if let Some(edge) = style.border_left {
        let _ = write!(css, "border-left:{}pt solid {};", edge.width, edge.color.hex());
    }
    if let Some(edge) = style.border_bottom {
        let _ = write!(css, "border-bottom:{}pt solid {};", edge.width, edge.color.hex());
    }
    if style.dot.is_some() {
        css.push_str("position:relative;");
    }
    css
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Text { text, style } => {
            let _ = writeln!(out, "<div style=\"{}\">{}</div>", text_css(style), escape(text.as_str()));
        }
        Block::Split {
            left,
            left_style,
            right,
            right_style,
        } => {
            let _ = writeln!(
                out,
                "<div style=\"display:flex;justify-content:space-between;align-items:baseline;gap:8pt\">\
<span style=\"{}\">{}</span><span style=\"{}white-space:nowrap\">{}</span></div>",
                text_css(left_style),
                escape(left.as_str()),
                text_css(right_style),
                escape(right.as_str())
            );
        }
        Block::Bullets {
            marker,
            items,
            style,
            indent,
        } => {
            let list_style = match marker {
                Marker::Disc => "disc",
                Marker::Square => "square",
                Marker::Chevron => "none",
            };
            let _ = writeln!(
                out,
                "<ul style=\"list-style:{list_style};margin-left:{indent}pt;{}\">",
                text_css(style)
            );
            for item in items {
                match marker {
                    Marker::Chevron => {
                        let _ = writeln!(
                            out,
                            "<li style=\"margin-bottom:3pt\"><span style=\"color:#60a5fa\">›</span> {}</li>",
                            escape(item.as_str())
                        );
                    }
                    _ => {
                        let _ = writeln!(out, "<li style=\"margin-bottom:3pt\">{}</li>", escape(item.as_str()));
                    }
                }
            }
            out.push_str("</ul>\n");
        }
        Block::Chips {
            items,
            style,
            fill,
            border,
            gap,
        } => {
            let justify = match style.align {
                Align::Left => "flex-start",
                Align::Center => "center",
                Align::Right => "flex-end",
            };
            let _ = writeln!(
                out,
                "<div style=\"display:flex;flex-wrap:wrap;gap:{gap}pt;justify-content:{justify}\">"
            );
            let mut chip_css = text_css(style);
            if let Some(fill) = fill {
                let _ = write!(chip_css, "background:{};padding:2pt 4pt;border-radius:3pt;", fill.hex());
            }
            if let Some(border) = border {
                let _ = write!(chip_css, "border:0.75pt solid {};", border.hex());
            }
            for item in items.iter().filter(|item| !item.is_empty()) {
                let _ = writeln!(out, "<span style=\"{chip_css}\">{}</span>", escape(item.as_str()));
            }
            out.push_str("</div>\n");
        }
        Block::Rule { color, width } => {
            let _ = writeln!(
                out,
                "<hr style=\"border:0;border-top:{width}pt solid {};margin:0\">",
                color.hex()
            );
        }
        Block::Stack { gap, children } => {
            let _ = writeln!(out, "<div style=\"display:flex;flex-direction:column;gap:{gap}pt\">");
            for child in children {
                write_block(out, child);
            }
            out.push_str("</div>\n");
        }
        Block::Columns { gap, columns } => {
            let _ = writeln!(
                out,
                "<div style=\"display:grid;grid-template-columns:repeat(12,minmax(0,1fr));gap:{gap}pt\">"
            );
            for column in columns {
                let _ = writeln!(out, "<div style=\"grid-column:span {}\">", column.span);
                write_block(out, &column.block);
                out.push_str("</div>\n");
            }
            out.push_str("</div>\n");
        }
        Block::Panel { style, child } => {
            let class = if style.keep_together { " class=\"keep\"" } else { "" };
            let _ = writeln!(out, "<div{class} style=\"{}\">", box_css(style));
            if let Some(dot) = style.dot {
                let _ = writeln!(
                    out,
                    "<span style=\"position:absolute;left:-4pt;top:4pt;width:6pt;height:6pt;\
border-radius:50%;background:{}\"></span>",
                    dot.hex()
                );
            }
            write_block(out, child);
            out.push_str("</div>\n");
        }
        Block::Notice { title, detail } => {
            let _ = writeln!(
                out,
                "<div style=\"padding:12pt;text-align:center\">\
<p style=\"color:#ef4444;font-weight:700\">{}</p><p>{}</p></div>",
                escape(title.as_str()),
                escape(detail.as_str())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample;
    use crate::template::{render, Template, NOT_IMPLEMENTED_TITLE};

    #[test]
    fn escapes_record_text() {
        let record = sample().with_full_name("Jo <script> & Co");
        let html = to_html(&render(&record, &Template::AtsOptimized, RenderMode::Screen));
        assert!(html.contains("Jo &lt;script&gt; &amp; Co"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn print_mode_adds_page_rule() {
        let record = sample();
        let print = to_html(&render(&record, &Template::SoftwareEngineer, RenderMode::Print));
        assert!(print.contains("@page{size:A4;margin:0}"));
        assert!(print.contains("class=\"keep\""));
        assert!(!print.contains("min-height"));

        let screen = to_html(&render(&record, &Template::SoftwareEngineer, RenderMode::Screen));
        assert!(screen.contains("min-height:841.89pt"));
        assert!(!screen.contains("@page"));
    }

    #[test]
    fn notice_is_visible() {
        let html = to_html(&render(&sample(), &Template::Functional, RenderMode::Screen));
        assert!(html.contains(NOT_IMPLEMENTED_TITLE));
        assert!(html.contains("data-template=\"functional\""));
    }
}

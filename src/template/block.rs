//! The rendered-document tree.
//!
//! A template turns a record into a tree of [`Block`]s. The tree is plain
//! data: it holds the record's text and how it should be arranged, but no
//! positions. [`super::html`] serialises it for the screen, and
//! [`super::layout`] flows it into positioned draw operations for export.
//!
//! All lengths are PDF points (1/72 inch).

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb`
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// The colours the built-in templates use.
pub mod palette {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const SLATE_50: Rgb = Rgb(248, 250, 252);
    pub const SLATE_100: Rgb = Rgb(241, 245, 249);
    pub const SLATE_200: Rgb = Rgb(226, 232, 240);
    pub const SLATE_300: Rgb = Rgb(203, 213, 225);
    pub const SLATE_400: Rgb = Rgb(148, 163, 184);
    pub const SLATE_500: Rgb = Rgb(100, 116, 139);
    pub const SLATE_600: Rgb = Rgb(71, 85, 105);
    pub const SLATE_700: Rgb = Rgb(51, 65, 85);
    pub const SLATE_800: Rgb = Rgb(30, 41, 59);
    pub const SLATE_900: Rgb = Rgb(15, 23, 42);
    pub const BLUE_400: Rgb = Rgb(96, 165, 250);
    pub const BLUE_600: Rgb = Rgb(37, 99, 235);
    pub const BLUE_700: Rgb = Rgb(29, 78, 216);
    pub const RED_500: Rgb = Rgb(239, 68, 68);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Typography for one run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub uppercase: bool,
    pub color: Rgb,
    pub align: Align,
    /// `None` inherits the document family.
    pub family: Option<FontFamily>,
}

impl TextStyle {
    pub const fn new(size: f32) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
            uppercase: false,
            color: palette::SLATE_800,
            align: Align::Left,
            family: None,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    pub const fn upper(self) -> Self {
        Self {
            uppercase: true,
            ..self
        }
    }

    pub const fn color(self, color: Rgb) -> Self {
        Self { color, ..self }
    }

    pub const fn center(self) -> Self {
        Self {
            align: Align::Center,
            ..self
        }
    }

    pub const fn right(self) -> Self {
        Self {
            align: Align::Right,
            ..self
        }
    }

    pub const fn family(self, family: FontFamily) -> Self {
        Self {
            family: Some(family),
            ..self
        }
    }

    /// The text as it should appear.
    pub fn display(&self, text: &str) -> String {
        if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }
}

/// Bullet glyph for a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Disc,
    Square,
    Chevron,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Insets {
    pub const fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub const fn bottom(v: f32) -> Self {
        Self {
            top: 0.0,
            right: 0.0,
            bottom: v,
            left: 0.0,
        }
    }

    pub const fn left(v: f32) -> Self {
        Self {
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: v,
        }
    }
}

/// A solid edge on one side of a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub width: f32,
    pub color: Rgb,
}

impl Edge {
    pub const fn new(width: f32, color: Rgb) -> Self {
        Self { width, color }
    }
}

/// Box decoration around a child block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxStyle {
    pub fill: Option<Rgb>,
    pub padding: Insets,
    pub border_left: Option<Edge>,
    pub border_bottom: Option<Edge>,
    /// Timeline marker centred on the left border.
    pub dot: Option<Rgb>,
    /// Print mode keeps this box on one page where possible.
    pub keep_together: bool,
}

/// One column of a 12-span grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub span: u8,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text {
        text: String,
        style: TextStyle,
    },
    /// Two runs on one line, pushed to opposite edges.
    Split {
        left: String,
        left_style: TextStyle,
        right: String,
        right_style: TextStyle,
    },
    Bullets {
        marker: Marker,
        items: Vec<String>,
        style: TextStyle,
        indent: f32,
    },
    /// Items flowed left to right, wrapping; optionally drawn as tags.
    Chips {
        items: Vec<String>,
        style: TextStyle,
        fill: Option<Rgb>,
        border: Option<Rgb>,
        gap: f32,
    },
    Rule {
        color: Rgb,
        width: f32,
    },
    Stack {
        gap: f32,
        children: Vec<Block>,
    },
    Columns {
        gap: f32,
        columns: Vec<Column>,
    },
    Panel {
        style: BoxStyle,
        child: Box<Block>,
    },
    /// Visible placeholder for a template with no layout.
    Notice {
        title: String,
        detail: String,
    },
}

impl Block {
    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Block::Text {
            text: text.into(),
            style,
        }
    }

    pub fn split(
        left: impl Into<String>,
        left_style: TextStyle,
        right: impl Into<String>,
        right_style: TextStyle,
    ) -> Self {
        Block::Split {
            left: left.into(),
            left_style,
            right: right.into(),
            right_style,
        }
    }

    pub fn stack(gap: f32, children: Vec<Block>) -> Self {
        Block::Stack { gap, children }
    }

    pub fn columns(gap: f32, columns: Vec<(u8, Block)>) -> Self {
        Block::Columns {
            gap,
            columns: columns
                .into_iter()
                .map(|(span, block)| Column { span, block })
                .collect(),
        }
    }

    pub fn panel(style: BoxStyle, child: Block) -> Self {
        Block::Panel {
            style,
            child: Box::new(child),
        }
    }

    /// Every piece of text in document order, as displayed.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts(&self, out: &mut Vec<String>) {
        match self {
            Block::Text { text, style } => out.push(style.display(text)),
            Block::Split {
                left,
                left_style,
                right,
                right_style,
            } => {
                out.push(left_style.display(left));
                out.push(right_style.display(right));
            }
            Block::Bullets { items, style, .. } | Block::Chips { items, style, .. } => {
                out.extend(items.iter().map(|item| style.display(item)))
            }
            Block::Rule { .. } => {}
            Block::Stack { children, .. } => {
                children.iter().for_each(|child| child.collect_texts(out))
            }
            Block::Columns { columns, .. } => columns
                .iter()
                .for_each(|column| column.block.collect_texts(out)),
            Block::Panel { child, .. } => child.collect_texts(out),
            Block::Notice { title, detail } => {
                out.push(title.clone());
                out.push(detail.clone());
            }
        }
    }
}

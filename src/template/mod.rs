//! Template rendering: record + template selector → laid-out document.
//!
//! [`render`] is pure. It reads the record, picks the arrangement for the
//! selected [`Template`], and returns a [`RenderedDocument`] tree. The same
//! call serves the screen and print paths; [`RenderMode`] only changes page
//! padding, minimum height and pagination hints, never the content.
//!
//! ```text
//! ResumeRecord ──▶ render ──▶ RenderedDocument ──┬──▶ html   (preview)
//!                (layouts)        (Block tree)   └──▶ layout (Canvas for PDF export)
//! ```
//!
//! ## Dispatch
//!
//! Dispatch is an exhaustive `match` over [`Template`]. Catalogue entries with
//! no layout, and any identifier we do not recognise, fall through to a
//! visible "Template Not Implemented Yet" notice instead of quietly using a
//! different template.

pub mod block;
pub mod html;
pub mod layout;
mod layouts;

use crate::record::ResumeRecord;
use block::{Block, FontFamily};
use serde::{Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A4 width in points.
pub const A4_WIDTH_PT: f32 = 595.28;
/// A4 height in points.
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Title of the fallback shown for templates without a layout.
pub const NOT_IMPLEMENTED_TITLE: &str = "Template Not Implemented Yet";

/// Template catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Template {
    /// Two columns: experience on the left, a shaded sidebar on the right.
    #[default]
    SoftwareEngineer,
    /// Single serif column with a centred header.
    EnhancedChronological,
    /// Accent border header, timeline experience, expertise sidebar.
    StrategicHybrid,
    /// Monospace, no decoration; parses cleanly in applicant tracking systems.
    AtsOptimized,
    /// Dark header band, sidebar of skills and education.
    VisualStrategic,
    ReverseChronological,
    Functional,
    CombinedHybrid,
    /// An identifier outside the catalogue.
    Unrecognized(String),
}

impl Template {
    /// Every catalogue entry, in menu order.
    pub const CATALOGUE: [Template; 8] = [
        Template::SoftwareEngineer,
        Template::EnhancedChronological,
        Template::StrategicHybrid,
        Template::AtsOptimized,
        Template::VisualStrategic,
        Template::ReverseChronological,
        Template::Functional,
        Template::CombinedHybrid,
    ];

    /// Human-readable name, as shown in the template menu.
    pub fn display_name(&self) -> &str {
        match self {
            Template::SoftwareEngineer => "Software Engineer Chronological",
            Template::EnhancedChronological => "Enhanced Chronological",
            Template::StrategicHybrid => "Strategic Hybrid",
            Template::AtsOptimized => "ATS-Optimized",
            Template::VisualStrategic => "Visual-Strategic",
            Template::ReverseChronological => "Reverse-Chronological",
            Template::Functional => "Functional Skills-Focused",
            Template::CombinedHybrid => "Combined Hybrid",
            Template::Unrecognized(name) => name,
        }
    }

    /// Short identifier accepted on the command line.
    pub fn id(&self) -> &str {
        match self {
            Template::SoftwareEngineer => "software-engineer",
            Template::EnhancedChronological => "enhanced-chronological",
            Template::StrategicHybrid => "strategic-hybrid",
            Template::AtsOptimized => "ats-optimized",
            Template::VisualStrategic => "visual-strategic",
            Template::ReverseChronological => "reverse-chronological",
            Template::Functional => "functional",
            Template::CombinedHybrid => "combined-hybrid",
            Template::Unrecognized(name) => name,
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(
            self,
            Template::SoftwareEngineer
                | Template::EnhancedChronological
                | Template::StrategicHybrid
                | Template::AtsOptimized
                | Template::VisualStrategic
        )
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Never fails: anything outside the catalogue becomes [`Template::Unrecognized`].
impl FromStr for Template {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Ok(Template::CATALOGUE
            .iter()
            .find(|t| {
                t.id().eq_ignore_ascii_case(wanted) || t.display_name().eq_ignore_ascii_case(wanted)
            })
            .cloned()
            .unwrap_or_else(|| Template::Unrecognized(wanted.to_string())))
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

/// Interactive display or print/export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Screen,
    Print,
}

/// Page-level presentation, derived from the template and mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStyle {
    pub family: FontFamily,
    pub padding: f32,
    /// Screen mode fills at least one A4 page, like the on-screen preview.
    pub min_height: Option<f32>,
    pub shadow: bool,
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub template: Template,
    pub mode: RenderMode,
    pub page: PageStyle,
    pub root: Block,
}

impl RenderedDocument {
    pub fn texts(&self) -> Vec<String> {
        self.root.texts()
    }
}

/// Render a record under a template.
pub fn render(record: &ResumeRecord, template: &Template, mode: RenderMode) -> RenderedDocument {
    let (family, root) = match template {
        Template::SoftwareEngineer => (FontFamily::Sans, layouts::software_engineer(record)),
        Template::EnhancedChronological => {
            (FontFamily::Serif, layouts::enhanced_chronological(record))
        }
        Template::StrategicHybrid => (FontFamily::Sans, layouts::strategic_hybrid(record)),
        Template::AtsOptimized => (FontFamily::Mono, layouts::ats_optimized(record)),
        Template::VisualStrategic => (FontFamily::Sans, layouts::visual_strategic(record)),
        Template::ReverseChronological
        | Template::Functional
        | Template::CombinedHybrid
        | Template::Unrecognized(_) => (FontFamily::Sans, layouts::not_implemented(template)),
    };

    // The dark header band runs to the page edge in both modes.
    let edge_to_edge = matches!(template, Template::VisualStrategic);
    let page = match mode {
        RenderMode::Screen => PageStyle {
            family,
            padding: if edge_to_edge { 0.0 } else { 24.0 },
            min_height: Some(A4_HEIGHT_PT),
            shadow: true,
        },
        RenderMode::Print => PageStyle {
            family,
            padding: 0.0,
            min_height: None,
            shadow: false,
        },
    };

    RenderedDocument {
        template: template.clone(),
        mode,
        page,
        root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample;

    const IMPLEMENTED: [Template; 5] = [
        Template::SoftwareEngineer,
        Template::EnhancedChronological,
        Template::StrategicHybrid,
        Template::AtsOptimized,
        Template::VisualStrategic,
    ];

    #[test]
    fn render_is_idempotent() {
        let record = sample();
        for template in Template::CATALOGUE.iter() {
            for mode in [RenderMode::Screen, RenderMode::Print] {
                assert_eq!(
                    render(&record, template, mode),
                    render(&record, template, mode),
                    "{template} / {mode:?}"
                );
            }
        }
    }

    #[test]
    fn print_mode_keeps_content() {
        let record = sample();
        for template in IMPLEMENTED.iter() {
            let screen = render(&record, template, RenderMode::Screen);
            let print = render(&record, template, RenderMode::Print);
            assert_eq!(screen.root, print.root, "{template}");
            assert_ne!(screen.page, print.page, "{template}");
        }
    }

    #[test]
    fn every_layout_shows_skills_bullets_and_education() {
        let record = sample();
        for template in IMPLEMENTED.iter() {
            let texts = render(&record, template, RenderMode::Screen).texts();
            let joined = texts.join("\n");
            assert!(joined.contains("User Research"), "{template} lost a skill");
            assert!(
                joined.contains(&record.experience[1].description[2]),
                "{template} lost a bullet"
            );
            assert!(joined.contains("University of Texas at Austin"), "{template}");
            assert!(joined.contains("alex.morgan@example.com"), "{template}");
        }
    }

    #[test]
    fn unimplemented_templates_show_notice() {
        let record = sample();
        for template in [
            Template::ReverseChronological,
            Template::Functional,
            Template::CombinedHybrid,
            Template::Unrecognized("Fancy".into()),
        ] {
            let texts = render(&record, &template, RenderMode::Screen).texts();
            assert_eq!(texts[0], NOT_IMPLEMENTED_TITLE, "{template}");
            assert!(!texts.iter().any(|t| t.contains("Alex Morgan")));
        }
    }

    #[test]
    fn parse_accepts_ids_and_display_names() {
        assert_eq!(
            "ats-optimized".parse::<Template>().unwrap(),
            Template::AtsOptimized
        );
        assert_eq!(
            "Strategic Hybrid".parse::<Template>().unwrap(),
            Template::StrategicHybrid
        );
        assert_eq!(
            "functional skills-focused".parse::<Template>().unwrap(),
            Template::Functional
        );
        assert_eq!(
            "glossy".parse::<Template>().unwrap(),
            Template::Unrecognized("glossy".into())
        );
    }

    #[test]
    fn catalogue_has_five_layouts() {
        let implemented = Template::CATALOGUE
            .iter()
            .filter(|t| t.is_implemented())
            .count();
        assert_eq!(implemented, 5);
        assert_eq!(Template::default(), Template::SoftwareEngineer);
    }

    #[test]
    fn empty_record_renders() {
        let record = ResumeRecord::default();
        for template in IMPLEMENTED.iter() {
            let doc = render(&record, template, RenderMode::Print);
            let canvas = layout::layout(&doc, A4_WIDTH_PT);
            assert!(canvas.height >= 0.0);
        }
    }
}

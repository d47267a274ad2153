//! The five built-in arrangements, plus the not-implemented notice.
//!
//! Sizes follow a 12 pt base: 9 pt small print, 10.5 pt body, 27 pt names.

use super::block::palette::*;
use super::block::{Block, BoxStyle, Edge, FontFamily, Insets, Marker, TextStyle};
use super::{Template, NOT_IMPLEMENTED_TITLE};
use crate::record::{Education, Experience, ResumeRecord};

const XS: f32 = 9.0;
const SM: f32 = 10.5;
const BASE: f32 = 12.0;
const LG: f32 = 13.5;
const XL: f32 = 15.0;

fn keep(child: Block) -> Block {
    Block::panel(
        BoxStyle {
            keep_together: true,
            ..BoxStyle::default()
        },
        child,
    )
}

/// Heading with a rule under it.
fn ruled_heading(text: &str, style: TextStyle, rule: Edge, gap: f32) -> Block {
    Block::panel(
        BoxStyle {
            padding: Insets::bottom(gap),
            border_bottom: Some(rule),
            ..BoxStyle::default()
        },
        Block::text(text, style),
    )
}

fn bullets(marker: Marker, items: &[String], style: TextStyle, indent: f32) -> Block {
    Block::Bullets {
        marker,
        items: items.to_vec(),
        style,
        indent,
    }
}

fn contact_row(record: &ResumeRecord, style: TextStyle) -> Block {
    Block::Chips {
        items: record
            .contact_values()
            .into_iter()
            .map(String::from)
            .collect(),
        style,
        fill: None,
        border: None,
        gap: 12.0,
    }
}

/// School, degree, dates stacked.
fn education_entry(edu: &Education, school: TextStyle, degree: TextStyle, dates: TextStyle) -> Block {
    Block::stack(
        1.5,
        vec![
            Block::text(&edu.school, school),
            Block::text(&edu.degree, degree),
            Block::text(&edu.dates, dates),
        ],
    )
}

// ── Software Engineer Chronological ──────────────────────────────────────

pub(super) fn software_engineer(record: &ResumeRecord) -> Block {
    let header = Block::panel(
        BoxStyle {
            padding: Insets::bottom(12.0),
            border_bottom: Some(Edge::new(1.5, SLATE_800)),
            ..BoxStyle::default()
        },
        Block::stack(
            4.0,
            vec![
                Block::text(&record.full_name, TextStyle::new(27.0).bold().upper()),
                Block::text(&record.job_title, TextStyle::new(XL).color(SLATE_600)),
                contact_row(record, TextStyle::new(XS)),
            ],
        ),
    );

    let entries = record.experience.iter().map(|exp| {
        keep(Block::stack(
            3.0,
            vec![
                Block::split(
                    &exp.role,
                    TextStyle::new(BASE).bold(),
                    &exp.dates,
                    TextStyle::new(XS).family(FontFamily::Mono),
                ),
                Block::split(
                    &exp.company,
                    TextStyle::new(SM).italic().color(SLATE_600),
                    exp.location.as_deref().unwrap_or_default(),
                    TextStyle::new(SM).italic().color(SLATE_600),
                ),
                bullets(Marker::Disc, &exp.description, TextStyle::new(XS).color(SLATE_700), 12.0),
            ],
        ))
    });

    let experience = Block::stack(
        9.0,
        vec![
            ruled_heading(
                "Experience",
                TextStyle::new(LG).bold().upper(),
                Edge::new(0.75, SLATE_300),
                2.0,
            ),
            Block::stack(12.0, entries.collect()),
        ],
    );

    let side_heading = |text: &str| {
        ruled_heading(
            text,
            TextStyle::new(BASE).bold().upper(),
            Edge::new(0.75, SLATE_300),
            2.0,
        )
    };

    let sidebar = Block::panel(
        BoxStyle {
            fill: Some(SLATE_50),
            padding: Insets::all(12.0),
            ..BoxStyle::default()
        },
        Block::stack(
            18.0,
            vec![
                keep(Block::stack(
                    9.0,
                    vec![
                        side_heading("Summary"),
                        Block::text(&record.summary, TextStyle::new(XS).italic().color(SLATE_600)),
                    ],
                )),
                keep(Block::stack(
                    9.0,
                    vec![
                        side_heading("Skills"),
                        Block::Chips {
                            items: record.skills.clone(),
                            style: TextStyle::new(XS),
                            fill: Some(WHITE),
                            border: Some(SLATE_200),
                            gap: 6.0,
                        },
                    ],
                )),
                keep(Block::stack(
                    9.0,
                    vec![
                        side_heading("Education"),
                        Block::stack(
                            9.0,
                            record
                                .education
                                .iter()
                                .map(|edu| {
                                    education_entry(
                                        edu,
                                        TextStyle::new(SM).bold(),
                                        TextStyle::new(XS),
                                        TextStyle::new(XS).color(SLATE_500),
                                    )
                                })
                                .collect(),
                        ),
                    ],
                )),
            ],
        ),
    );

    Block::columns(
        24.0,
        vec![
            (8, Block::stack(18.0, vec![header, experience])),
            (4, sidebar),
        ],
    )
}

// ── Enhanced Chronological ───────────────────────────────────────────────

pub(super) fn enhanced_chronological(record: &ResumeRecord) -> Block {
    let heading = TextStyle::new(SM).bold().upper().color(SLATE_500);
    let ruled = |text: &str| ruled_heading(text, heading, Edge::new(0.75, SLATE_200), 3.0);

    let header = Block::panel(
        BoxStyle {
            padding: Insets::bottom(18.0),
            border_bottom: Some(Edge::new(0.75, SLATE_200)),
            ..BoxStyle::default()
        },
        Block::stack(
            6.0,
            vec![
                Block::text(
                    &record.full_name,
                    TextStyle::new(22.5).bold().color(SLATE_900).center(),
                ),
                Block::text(&record.job_title, TextStyle::new(LG).color(SLATE_600).center()),
                contact_row(record, TextStyle::new(XS).center()),
            ],
        ),
    );

    let summary = keep(Block::stack(
        9.0,
        vec![
            Block::text("Professional Summary", heading),
            Block::text(&record.summary, TextStyle::new(SM)),
        ],
    ));

    let entries = record.experience.iter().map(|exp| {
        keep(Block::stack(
            6.0,
            vec![
                Block::split(
                    format!("{}, {}", exp.role, exp.company),
                    TextStyle::new(BASE).bold().color(SLATE_900),
                    &exp.dates,
                    TextStyle::new(BASE).color(SLATE_500),
                ),
                bullets(Marker::Square, &exp.description, TextStyle::new(SM).color(SLATE_700), 12.0),
            ],
        ))
    });
    let experience = Block::stack(9.0, vec![ruled("Experience"), Block::stack(15.0, entries.collect())]);

    let education = keep(Block::stack(
        9.0,
        vec![
            ruled("Education"),
            Block::stack(
                6.0,
                record
                    .education
                    .iter()
                    .map(|edu| {
                        education_entry(
                            edu,
                            TextStyle::new(BASE).bold(),
                            TextStyle::new(SM),
                            TextStyle::new(XS).color(SLATE_500),
                        )
                    })
                    .collect(),
            ),
        ],
    ));
    let skills = keep(Block::stack(
        9.0,
        vec![
            ruled("Technical Skills"),
            Block::text(record.skills.join(" • "), TextStyle::new(SM)),
        ],
    ));

    Block::stack(
        18.0,
        vec![
            header,
            summary,
            experience,
            Block::columns(18.0, vec![(6, education), (6, skills)]),
        ],
    )
}

// ── ATS-Optimized ────────────────────────────────────────────────────────

pub(super) fn ats_optimized(record: &ResumeRecord) -> Block {
    let heading = |text: &str| {
        ruled_heading(
            text,
            TextStyle::new(BASE).bold().upper().color(BLACK),
            Edge::new(0.75, BLACK),
            1.5,
        )
    };
    let body = TextStyle::new(XS).color(BLACK);

    let c = &record.contact;
    let contact_line = [c.location.as_deref(), c.phone.as_deref(), Some(c.email.as_str())]
        .into_iter()
        .flatten()
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");
    let mut header = vec![
        Block::text(&record.full_name, TextStyle::new(18.0).bold().upper().color(BLACK)),
        Block::text(contact_line, body),
    ];
    if let Some(linkedin) = c.linkedin.as_deref().filter(|v| !v.is_empty()) {
        header.push(Block::text(linkedin, body));
    }

    let entries = record.experience.iter().map(|exp| {
        keep(Block::stack(
            3.0,
            vec![
                Block::split(
                    &exp.company,
                    TextStyle::new(SM).bold().color(BLACK),
                    &exp.dates,
                    TextStyle::new(SM).bold().color(BLACK),
                ),
                Block::text(&exp.role, TextStyle::new(SM).italic().color(BLACK)),
                bullets(Marker::Disc, &exp.description, body, 15.0),
            ],
        ))
    });

    let education = record.education.iter().map(|edu: &Education| {
        Block::text(format!("{}, {} ({})", edu.school, edu.degree, edu.dates), body)
    });

    Block::stack(
        18.0,
        vec![
            Block::stack(4.5, header),
            keep(Block::stack(
                6.0,
                vec![heading("Summary"), Block::text(&record.summary, body)],
            )),
            keep(Block::stack(
                6.0,
                vec![heading("Skills"), Block::text(record.skills.join(", "), body)],
            )),
            Block::stack(
                6.0,
                vec![heading("Work Experience"), Block::stack(12.0, entries.collect())],
            ),
            keep(Block::stack(
                6.0,
                vec![heading("Education"), Block::stack(6.0, education.collect())],
            )),
        ],
    )
}

// ── Strategic Hybrid ─────────────────────────────────────────────────────

fn timeline_entry(exp: &Experience) -> Block {
    Block::panel(
        BoxStyle {
            padding: Insets::left(12.0),
            border_left: Some(Edge::new(1.5, SLATE_200)),
            dot: Some(BLUE_600),
            keep_together: true,
            ..BoxStyle::default()
        },
        Block::stack(
            3.0,
            vec![
                Block::text(&exp.role, TextStyle::new(BASE).bold()),
                Block::text(
                    format!("{} | {}", exp.company, exp.dates),
                    TextStyle::new(SM).color(BLUE_600),
                ),
                bullets(Marker::Chevron, &exp.description, TextStyle::new(SM).color(SLATE_600), 9.0),
            ],
        ),
    )
}

pub(super) fn strategic_hybrid(record: &ResumeRecord) -> Block {
    let heading = TextStyle::new(BASE).bold().upper().color(BLUE_700);

    let c = &record.contact;
    let mut contact = Vec::new();
    if !c.email.is_empty() {
        contact.push(c.email.clone());
    }
    if let Some(phone) = c.phone.as_deref().filter(|v| !v.is_empty()) {
        contact.push(format!("• {phone}"));
    }
    if c.linkedin.as_deref().is_some_and(|v| !v.is_empty()) {
        contact.push("• LinkedIn".to_string());
    }

    let header = Block::panel(
        BoxStyle {
            padding: Insets::left(18.0),
            border_left: Some(Edge::new(3.0, BLUE_600)),
            ..BoxStyle::default()
        },
        Block::stack(
            4.0,
            vec![
                Block::text(&record.full_name, TextStyle::new(27.0).bold().color(SLATE_900)),
                Block::text(&record.job_title, TextStyle::new(XL).color(BLUE_600)),
                Block::Chips {
                    items: contact,
                    style: TextStyle::new(SM).color(SLATE_500),
                    fill: None,
                    border: None,
                    gap: 12.0,
                },
            ],
        ),
    );

    let main = Block::stack(
        24.0,
        vec![
            keep(Block::stack(
                12.0,
                vec![
                    Block::text("Professional Profile", heading),
                    Block::text(&record.summary, TextStyle::new(SM).color(SLATE_700)),
                ],
            )),
            Block::stack(
                12.0,
                vec![
                    Block::text("Experience", heading),
                    Block::stack(18.0, record.experience.iter().map(timeline_entry).collect()),
                ],
            ),
        ],
    );

    let expertise = Block::panel(
        BoxStyle {
            fill: Some(SLATE_50),
            padding: Insets::all(12.0),
            keep_together: true,
            ..BoxStyle::default()
        },
        Block::stack(
            12.0,
            vec![
                Block::text("Expertise", heading),
                Block::stack(
                    6.0,
                    record
                        .skills
                        .iter()
                        .map(|skill| {
                            ruled_heading(
                                skill,
                                TextStyle::new(SM).color(SLATE_700),
                                Edge::new(0.75, SLATE_200),
                                3.0,
                            )
                        })
                        .collect(),
                ),
            ],
        ),
    );

    let education = keep(Block::stack(
        12.0,
        vec![
            Block::text("Education", heading),
            Block::stack(
                12.0,
                record
                    .education
                    .iter()
                    .map(|edu| {
                        education_entry(
                            edu,
                            TextStyle::new(BASE).bold(),
                            TextStyle::new(SM).color(SLATE_600),
                            TextStyle::new(XS).color(SLATE_400),
                        )
                    })
                    .collect(),
            ),
        ],
    ));

    Block::stack(
        24.0,
        vec![
            header,
            Block::columns(
                24.0,
                vec![(8, main), (4, Block::stack(24.0, vec![expertise, education]))],
            ),
        ],
    )
}

// ── Visual-Strategic ─────────────────────────────────────────────────────

pub(super) fn visual_strategic(record: &ResumeRecord) -> Block {
    let c = &record.contact;
    let contact: Vec<Block> = [Some(c.email.as_str()), c.phone.as_deref(), c.location.as_deref()]
        .into_iter()
        .flatten()
        .filter(|v| !v.is_empty())
        .map(|v| Block::text(v, TextStyle::new(SM).color(SLATE_400).right()))
        .collect();

    let band = Block::panel(
        BoxStyle {
            fill: Some(SLATE_800),
            padding: Insets::all(30.0),
            ..BoxStyle::default()
        },
        Block::columns(
            12.0,
            vec![
                (
                    7,
                    Block::stack(
                        6.0,
                        vec![
                            Block::text(&record.full_name, TextStyle::new(27.0).bold().color(WHITE)),
                            Block::text(&record.job_title, TextStyle::new(XL).color(SLATE_300)),
                        ],
                    ),
                ),
                (5, Block::stack(3.0, contact)),
            ],
        ),
    );

    let side_heading = TextStyle::new(SM).bold().upper().color(SLATE_800);
    let sidebar = Block::stack(
        24.0,
        vec![
            keep(Block::stack(
                9.0,
                vec![
                    Block::text("Skills", side_heading),
                    Block::Chips {
                        items: record.skills.clone(),
                        style: TextStyle::new(XS).bold().color(SLATE_700),
                        fill: Some(SLATE_100),
                        border: None,
                        gap: 3.0,
                    },
                ],
            )),
            keep(Block::stack(
                9.0,
                vec![
                    Block::text("Education", side_heading),
                    Block::stack(
                        9.0,
                        record
                            .education
                            .iter()
                            .map(|edu| {
                                education_entry(
                                    edu,
                                    TextStyle::new(SM).bold(),
                                    TextStyle::new(XS).color(SLATE_600),
                                    TextStyle::new(XS).color(SLATE_400),
                                )
                            })
                            .collect(),
                    ),
                ],
            )),
        ],
    );

    let profile = Block::panel(
        BoxStyle {
            fill: Some(SLATE_50),
            padding: Insets::all(12.0),
            border_left: Some(Edge::new(3.0, SLATE_800)),
            keep_together: true,
            ..BoxStyle::default()
        },
        Block::stack(
            6.0,
            vec![
                Block::text("Profile", TextStyle::new(BASE).bold()),
                Block::text(&record.summary, TextStyle::new(SM).italic().color(SLATE_600)),
            ],
        ),
    );

    let entries = record.experience.iter().map(|exp| {
        keep(Block::stack(
            6.0,
            vec![
                Block::split(
                    &exp.role,
                    TextStyle::new(LG).bold(),
                    &exp.dates,
                    TextStyle::new(XS).bold().color(SLATE_400),
                ),
                Block::text(&exp.company, TextStyle::new(SM).color(SLATE_600)),
                bullets(Marker::Disc, &exp.description, TextStyle::new(SM).color(SLATE_600), 12.0),
            ],
        ))
    });
    let experience = Block::stack(
        12.0,
        vec![
            ruled_heading(
                "Experience",
                TextStyle::new(18.0).color(SLATE_400),
                Edge::new(0.75, SLATE_200),
                6.0,
            ),
            Block::stack(24.0, entries.collect()),
        ],
    );

    Block::stack(
        0.0,
        vec![
            band,
            Block::panel(
                BoxStyle {
                    padding: Insets::all(30.0),
                    ..BoxStyle::default()
                },
                Block::columns(
                    24.0,
                    vec![(4, sidebar), (8, Block::stack(18.0, vec![profile, experience]))],
                ),
            ),
        ],
    )
}

// ── Fallback ─────────────────────────────────────────────────────────────

pub(super) fn not_implemented(template: &Template) -> Block {
    Block::Notice {
        title: NOT_IMPLEMENTED_TITLE.to_string(),
        detail: format!("No layout is available for \"{}\".", template.display_name()),
    }
}

//! The Resume Record: the one domain entity every other module reads.
//!
//! A record is a plain value. Nothing in the crate mutates a record that
//! another reader can see; every change goes through one of the `with_*`
//! methods, which consume the old value and hand back a new one. The session
//! keeps the current record behind an `Arc` and swaps the pointer, so a reader
//! holding the previous `Arc` (an export snapshot, say) keeps a consistent view.
//!
//! Field names on the wire are camelCase because that is what the extraction
//! prompt asks the model to produce.

use serde::{Deserialize, Deserializer, Serialize};

/// Structured resume content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_title: String,
    pub contact: Contact,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Display order is insertion order; duplicates are allowed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    /// Only present when the extraction returned it. Templates and exports ignore it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
}

/// Contact block. `email` is the only required key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dates: String,
    /// Bullet points, one entry per line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dates: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Models emit `null` for empty lists often enough that it is worth
/// accepting; the record itself never holds a null list.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Copy-with-change ─────────────────────────────────────────────────────

impl ResumeRecord {
    pub fn with_full_name(self, full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..self
        }
    }

    pub fn with_job_title(self, job_title: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            ..self
        }
    }

    pub fn with_summary(self, summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..self
        }
    }

    pub fn with_contact(self, contact: Contact) -> Self {
        Self { contact, ..self }
    }

    pub fn with_skills(self, skills: Vec<String>) -> Self {
        Self { skills, ..self }
    }

    pub fn with_experience(self, experience: Vec<Experience>) -> Self {
        Self { experience, ..self }
    }

    pub fn with_education(self, education: Vec<Education>) -> Self {
        Self { education, ..self }
    }

    pub fn with_projects(self, projects: Option<Vec<Project>>) -> Self {
        Self { projects, ..self }
    }

    /// Contact values in header order, skipping absent and empty ones.
    pub fn contact_values(&self) -> Vec<&str> {
        let c = &self.contact;
        [
            Some(c.email.as_str()),
            c.phone.as_deref(),
            c.location.as_deref(),
            c.linkedin.as_deref(),
            c.website.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|v| !v.is_empty())
        .collect()
    }
}

impl Contact {
    pub fn with_email(self, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..self
        }
    }

    pub fn with_phone(self, phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            ..self
        }
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..self
        }
    }

    pub fn with_linkedin(self, linkedin: impl Into<String>) -> Self {
        Self {
            linkedin: Some(linkedin.into()),
            ..self
        }
    }

    pub fn with_website(self, website: impl Into<String>) -> Self {
        Self {
            website: Some(website.into()),
            ..self
        }
    }
}

impl Experience {
    /// Entry appended by "add position".
    pub fn placeholder() -> Self {
        Self {
            role: "New Role".into(),
            company: "Company".into(),
            location: None,
            dates: "2023-Present".into(),
            description: vec!["Did cool things".into()],
        }
    }

    /// The bullet list as one editable blob, one line per bullet.
    pub fn description_text(&self) -> String {
        self.description.join("\n")
    }
}

impl Education {
    /// Entry appended by "add education".
    pub fn placeholder() -> Self {
        Self {
            degree: "New Degree".into(),
            school: "School".into(),
            location: None,
            dates: "2019 - 2023".into(),
        }
    }
}

impl Project {
    /// Entry appended by "add project".
    pub fn placeholder() -> Self {
        Self {
            name: "New Project".into(),
            description: "What it does".into(),
            link: None,
        }
    }
}

/// Placeholder text appended by "add skill".
pub const NEW_SKILL: &str = "New Skill";

/// Built-in record for demos and tests; loading it never calls the model.
pub fn sample() -> ResumeRecord {
    ResumeRecord {
        full_name: "Alex Morgan".into(),
        job_title: "Senior Product Manager".into(),
        contact: Contact {
            email: "alex.morgan@example.com".into(),
            phone: Some("(555) 123-4567".into()),
            location: Some("San Francisco, CA".into()),
            linkedin: Some("linkedin.com/in/alexmorgan".into()),
            website: None,
        },
        summary: "Results-driven Product Manager with 7+ years of experience leading \
cross-functional teams to build scalable software solutions. Proven track record of \
increasing user retention by 30% and driving revenue growth through data-driven product \
strategies."
            .into(),
        skills: [
            "Product Strategy",
            "Agile Methodologies",
            "User Research",
            "Data Analysis (SQL, Python)",
            "Stakeholder Management",
            "Jira/Confluence",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        experience: vec![
            Experience {
                role: "Senior Product Manager".into(),
                company: "TechFlow Solutions".into(),
                location: Some("San Francisco, CA".into()),
                dates: "2021 - Present".into(),
                description: vec![
                    "Led the end-to-end launch of the company's flagship SaaS platform, acquiring 10k+ users in first 6 months.".into(),
                    "Implemented A/B testing frameworks that improved conversion rates by 25% year-over-year.".into(),
                    "Mentored 3 junior PMs and established internal best practices for roadmap planning.".into(),
                ],
            },
            Experience {
                role: "Product Manager".into(),
                company: "Innovate Corp".into(),
                location: Some("Austin, TX".into()),
                dates: "2018 - 2021".into(),
                description: vec![
                    "Managed a cross-functional team of 15 engineers and designers to deliver mobile app features.".into(),
                    "Reduced churn by 15% through targeted user engagement campaigns and feature optimization.".into(),
                    "Collaborated with sales to define go-to-market strategies for enterprise clients.".into(),
                ],
            },
        ],
        education: vec![
            Education {
                degree: "MBA".into(),
                school: "University of California, Berkeley".into(),
                location: None,
                dates: "2016 - 2018".into(),
            },
            Education {
                degree: "B.S. Computer Science".into(),
                school: "University of Texas at Austin".into(),
                location: None,
                dates: "2012 - 2016".into(),
            },
        ],
        projects: None,
    }
}

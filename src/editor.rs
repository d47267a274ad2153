//! Field-by-field editing of a [`ResumeRecord`].
//!
//! [`apply`] is a pure read-modify-write: it takes the current record and one
//! [`EditCommand`] and returns the next record. There is no validation beyond
//! index bounds, no trimming, and no undo. Values are stored verbatim,
//! including the empty string.
//!
//! The textual form parsed by [`EditCommand::from_str`] is what the CLI
//! accepts for `--edit`:
//!
//! ```text
//! fullName=Alex Morgan              scalar field
//! contact.website=alex.dev          contact field
//! skills+                           append "New Skill"
//! skills[2]=Rust                    replace one skill
//! skills[2]-                        remove one skill
//! experience+                       append a placeholder position
//! experience[0].role=Lead PM        replace one field of one entry
//! experience[0].description=a\nb    bullets, one per line (`\n` escapes a newline)
//! experience[1]-                    remove an entry
//! education[0].school=MIT           same shape for education and projects
//! ```

use crate::error::EditError;
use crate::record::{Education, Experience, Project, ResumeRecord, NEW_SKILL};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    FullName,
    JobTitle,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    Phone,
    Location,
    Linkedin,
    Website,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Role,
    Company,
    Dates,
    Location,
    /// Edited as one blob; each line becomes a bullet.
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Degree,
    School,
    Dates,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Description,
    Link,
}

/// One edit against the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    SetScalar { field: ScalarField, value: String },
    SetContact { field: ContactField, value: String },

    SetSkill { index: usize, value: String },
    AddSkill,
    RemoveSkill { index: usize },

    SetExperience { index: usize, field: ExperienceField, value: String },
    AddExperience,
    RemoveExperience { index: usize },

    SetEducation { index: usize, field: EducationField, value: String },
    AddEducation,
    RemoveEducation { index: usize },

    SetProject { index: usize, field: ProjectField, value: String },
    AddProject,
    RemoveProject { index: usize },
}

/// Apply one edit, returning the next record.
///
/// On error the caller keeps the record it passed in; nothing is half-applied.
pub fn apply(record: &ResumeRecord, command: &EditCommand) -> Result<ResumeRecord, EditError> {
    let current = record.clone();
    let next = match command {
        EditCommand::SetScalar { field, value } => match field {
            ScalarField::FullName => current.with_full_name(value.as_str()),
            ScalarField::JobTitle => current.with_job_title(value.as_str()),
            ScalarField::Summary => current.with_summary(value.as_str()),
        },
        EditCommand::SetContact { field, value } => {
            let contact = current.contact.clone();
            let contact = match field {
                ContactField::Email => contact.with_email(value.as_str()),
                ContactField::Phone => contact.with_phone(value.as_str()),
                ContactField::Location => contact.with_location(value.as_str()),
                ContactField::Linkedin => contact.with_linkedin(value.as_str()),
                ContactField::Website => contact.with_website(value.as_str()),
            };
            current.with_contact(contact)
        }

        EditCommand::SetSkill { index, value } => {
            let skills = replace_at(&current.skills, *index, "skills", |_| value.clone())?;
            current.with_skills(skills)
        }
        EditCommand::AddSkill => {
            let skills = appended(&current.skills, NEW_SKILL.to_string());
            current.with_skills(skills)
        }
        EditCommand::RemoveSkill { index } => {
            let skills = removed(&current.skills, *index, "skills")?;
            current.with_skills(skills)
        }

        EditCommand::SetExperience {
            index,
            field,
            value,
        } => {
            let experience = replace_at(&current.experience, *index, "experience", |entry| {
                with_experience_field(entry, *field, value)
            })?;
            current.with_experience(experience)
        }
        EditCommand::AddExperience => {
            let experience = appended(&current.experience, Experience::placeholder());
            current.with_experience(experience)
        }
        EditCommand::RemoveExperience { index } => {
            let experience = removed(&current.experience, *index, "experience")?;
            current.with_experience(experience)
        }

        EditCommand::SetEducation {
            index,
            field,
            value,
        } => {
            let education = replace_at(&current.education, *index, "education", |entry| {
                with_education_field(entry, *field, value)
            })?;
            current.with_education(education)
        }
        EditCommand::AddEducation => {
            let education = appended(&current.education, Education::placeholder());
            current.with_education(education)
        }
        EditCommand::RemoveEducation { index } => {
            let education = removed(&current.education, *index, "education")?;
            current.with_education(education)
        }

        EditCommand::SetProject {
            index,
            field,
            value,
        } => {
            let projects = current.projects.clone().unwrap_or_default();
            let projects = replace_at(&projects, *index, "projects", |entry| {
                with_project_field(entry, *field, value)
            })?;
            current.with_projects(Some(projects))
        }
        EditCommand::AddProject => {
            let projects = current.projects.clone().unwrap_or_default();
            current.with_projects(Some(appended(&projects, Project::placeholder())))
        }
        EditCommand::RemoveProject { index } => {
            let projects = current.projects.clone().unwrap_or_default();
            let projects = removed(&projects, *index, "projects")?;
            current.with_projects(Some(projects))
        }
    };
    Ok(next)
}

/// Split a multi-line blob into bullets.
///
/// Every line is kept, so a trailing newline yields one trailing empty bullet
/// and an empty blob yields a single empty bullet.
pub fn split_bullets(blob: &str) -> Vec<String> {
    blob.split('\n').map(String::from).collect()
}

fn with_experience_field(entry: &Experience, field: ExperienceField, value: &str) -> Experience {
    let entry = entry.clone();
    match field {
        ExperienceField::Role => Experience {
            role: value.to_string(),
            ..entry
        },
        ExperienceField::Company => Experience {
            company: value.to_string(),
            ..entry
        },
        ExperienceField::Dates => Experience {
            dates: value.to_string(),
            ..entry
        },
        ExperienceField::Location => Experience {
            location: Some(value.to_string()),
            ..entry
        },
        ExperienceField::Description => Experience {
            description: split_bullets(value),
            ..entry
        },
    }
}

fn with_education_field(entry: &Education, field: EducationField, value: &str) -> Education {
    let entry = entry.clone();
    match field {
        EducationField::Degree => Education {
            degree: value.to_string(),
            ..entry
        },
        EducationField::School => Education {
            school: value.to_string(),
            ..entry
        },
        EducationField::Dates => Education {
            dates: value.to_string(),
            ..entry
        },
        EducationField::Location => Education {
            location: Some(value.to_string()),
            ..entry
        },
    }
}

fn with_project_field(entry: &Project, field: ProjectField, value: &str) -> Project {
    let entry = entry.clone();
    match field {
        ProjectField::Name => Project {
            name: value.to_string(),
            ..entry
        },
        ProjectField::Description => Project {
            description: value.to_string(),
            ..entry
        },
        ProjectField::Link => Project {
            link: Some(value.to_string()),
            ..entry
        },
    }
}

// ── List helpers: always build a fresh Vec ───────────────────────────────

fn replace_at<T: Clone>(
    items: &[T],
    index: usize,
    list: &'static str,
    f: impl FnOnce(&T) -> T,
) -> Result<Vec<T>, EditError> {
    let target = items.get(index).ok_or(EditError::IndexOutOfRange {
        list,
        index,
        len: items.len(),
    })?;
    let replacement = f(target);
    let mut next = items.to_vec();
    next[index] = replacement;
    Ok(next)
}

fn appended<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(item);
    next
}

fn removed<T: Clone>(items: &[T], index: usize, list: &'static str) -> Result<Vec<T>, EditError> {
    if index >= items.len() {
        return Err(EditError::IndexOutOfRange {
            list,
            index,
            len: items.len(),
        });
    }
    Ok(items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect())
}

// ── Textual form ─────────────────────────────────────────────────────────

static RE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_]+)(?:\[(\d+)\])?(?:\.([A-Za-z_]+))?$").unwrap()
});

/// Lower-case and drop `_`/`-` so `fullName`, `full_name` and `FULLNAME` agree.
fn normalise_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

enum Op<'a> {
    Set(&'a str),
    Add,
    Remove,
}

impl FromStr for EditCommand {
    type Err = EditError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let syntax = |reason: &str| EditError::Syntax {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (path, op) = if let Some((path, value)) = input.split_once('=') {
            (path, Op::Set(value))
        } else if let Some(path) = input.strip_suffix('+') {
            (path, Op::Add)
        } else if let Some(path) = input.strip_suffix('-') {
            (path, Op::Remove)
        } else {
            return Err(syntax("expected `path=value`, `list+` or `list[i]-`"));
        };

        let caps = RE_PATH
            .captures(path.trim())
            .ok_or_else(|| syntax("malformed path"))?;
        let head = normalise_name(&caps[1]);
        let index = caps
            .get(2)
            .map(|m| m.as_str().parse::<usize>())
            .transpose()
            .map_err(|_| syntax("index is too large"))?;
        let sub = caps.get(3).map(|m| normalise_name(m.as_str()));

        let command = match (head.as_str(), index, sub.as_deref(), op) {
            ("fullname", None, None, Op::Set(v)) => EditCommand::SetScalar {
                field: ScalarField::FullName,
                value: v.to_string(),
            },
            ("jobtitle", None, None, Op::Set(v)) => EditCommand::SetScalar {
                field: ScalarField::JobTitle,
                value: v.to_string(),
            },
            ("summary", None, None, Op::Set(v)) => EditCommand::SetScalar {
                field: ScalarField::Summary,
                value: v.to_string(),
            },
            ("contact", None, Some(field), Op::Set(v)) => EditCommand::SetContact {
                field: match field {
                    "email" => ContactField::Email,
                    "phone" => ContactField::Phone,
                    "location" => ContactField::Location,
                    "linkedin" => ContactField::Linkedin,
                    "website" => ContactField::Website,
                    _ => return Err(syntax("unknown contact field")),
                },
                value: v.to_string(),
            },

            ("skills", None, None, Op::Add) => EditCommand::AddSkill,
            ("skills", Some(index), None, Op::Set(v)) => EditCommand::SetSkill {
                index,
                value: v.to_string(),
            },
            ("skills", Some(index), None, Op::Remove) => EditCommand::RemoveSkill { index },

            ("experience", None, None, Op::Add) => EditCommand::AddExperience,
            ("experience", Some(index), None, Op::Remove) => {
                EditCommand::RemoveExperience { index }
            }
            ("experience", Some(index), Some(field), Op::Set(v)) => {
                let field = match field {
                    "role" => ExperienceField::Role,
                    "company" => ExperienceField::Company,
                    "dates" => ExperienceField::Dates,
                    "location" => ExperienceField::Location,
                    "description" => ExperienceField::Description,
                    _ => return Err(syntax("unknown experience field")),
                };
                let value = if field == ExperienceField::Description {
                    unescape_description(v)
                } else {
                    v.to_string()
                };
                EditCommand::SetExperience {
                    index,
                    field,
                    value,
                }
            }

            ("education", None, None, Op::Add) => EditCommand::AddEducation,
            ("education", Some(index), None, Op::Remove) => EditCommand::RemoveEducation { index },
            ("education", Some(index), Some(field), Op::Set(v)) => EditCommand::SetEducation {
                index,
                field: match field {
                    "degree" => EducationField::Degree,
                    "school" => EducationField::School,
                    "dates" => EducationField::Dates,
                    "location" => EducationField::Location,
                    _ => return Err(syntax("unknown education field")),
                },
                value: v.to_string(),
            },

            ("projects", None, None, Op::Add) => EditCommand::AddProject,
            ("projects", Some(index), None, Op::Remove) => EditCommand::RemoveProject { index },
            ("projects", Some(index), Some(field), Op::Set(v)) => EditCommand::SetProject {
                index,
                field: match field {
                    "name" => ProjectField::Name,
                    "description" => ProjectField::Description,
                    "link" => ProjectField::Link,
                    _ => return Err(syntax("unknown project field")),
                },
                value: v.to_string(),
            },

            _ => return Err(syntax("no such edit")),
        };
        Ok(command)
    }
}

/// `\n` starts a new bullet and `\\` is a literal backslash; any other
/// backslash is kept as typed.
fn unescape_description(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample;

    fn set(field: ScalarField, value: &str) -> EditCommand {
        EditCommand::SetScalar {
            field,
            value: value.into(),
        }
    }

    #[test]
    fn scalar_edits_are_stored_verbatim() {
        let record = sample();
        for (field, value) in [
            (ScalarField::FullName, "  jo DOE  "),
            (ScalarField::JobTitle, ""),
            (ScalarField::Summary, "Line one\nLine two "),
        ] {
            let next = apply(&record, &set(field, value)).unwrap();
            let read = match field {
                ScalarField::FullName => &next.full_name,
                ScalarField::JobTitle => &next.job_title,
                ScalarField::Summary => &next.summary,
            };
            assert_eq!(read, value);
        }
    }

    #[test]
    fn contact_edit_accepts_empty_email() {
        let next = apply(
            &sample(),
            &EditCommand::SetContact {
                field: ContactField::Email,
                value: String::new(),
            },
        )
        .unwrap();
        assert_eq!(next.contact.email, "");
        assert_eq!(next.contact.phone, sample().contact.phone);
    }

    #[test]
    fn add_then_remove_skill_restores_list() {
        let record = sample();
        let added = apply(&record, &EditCommand::AddSkill).unwrap();
        assert_eq!(added.skills.last().map(String::as_str), Some(NEW_SKILL));
        let restored = apply(
            &added,
            &EditCommand::RemoveSkill {
                index: added.skills.len() - 1,
            },
        )
        .unwrap();
        assert_eq!(restored.skills, record.skills);
    }

    #[test]
    fn set_skill_only_touches_that_index() {
        let record = sample();
        let next = apply(
            &record,
            &EditCommand::SetSkill {
                index: 1,
                value: "Scrum".into(),
            },
        )
        .unwrap();
        assert_eq!(next.skills[1], "Scrum");
        assert_eq!(next.skills[0], record.skills[0]);
        assert_eq!(next.skills[2..], record.skills[2..]);
    }

    #[test]
    fn remove_experience_shifts_following_entries() {
        let record = sample().with_experience(vec![
            Experience {
                role: "A".into(),
                ..Experience::default()
            },
            Experience {
                role: "B".into(),
                ..Experience::default()
            },
            Experience {
                role: "C".into(),
                ..Experience::default()
            },
        ]);
        let next = apply(&record, &EditCommand::RemoveExperience { index: 0 }).unwrap();
        let roles: Vec<&str> = next.experience.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(roles, vec!["B", "C"]);
    }

    #[test]
    fn out_of_range_edit_is_an_error() {
        let record = sample();
        let err = apply(&record, &EditCommand::RemoveEducation { index: 9 }).unwrap_err();
        assert_eq!(
            err,
            EditError::IndexOutOfRange {
                list: "education",
                index: 9,
                len: 2
            }
        );
    }

    #[test]
    fn description_blob_with_trailing_newline_keeps_empty_bullet() {
        let next = apply(
            &sample(),
            &EditCommand::SetExperience {
                index: 0,
                field: ExperienceField::Description,
                value: "Shipped v2\nCut costs\n".into(),
            },
        )
        .unwrap();
        assert_eq!(next.experience[0].description, vec!["Shipped v2", "Cut costs", ""]);
    }

    #[test]
    fn split_bullets_edge_cases() {
        assert_eq!(split_bullets(""), vec![""]);
        assert_eq!(split_bullets("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn add_experience_appends_placeholder() {
        let next = apply(&sample(), &EditCommand::AddExperience).unwrap();
        assert_eq!(next.experience.len(), 3);
        assert_eq!(next.experience[2], Experience::placeholder());
    }

    #[test]
    fn project_edits_create_the_list_on_demand() {
        let record = sample();
        assert!(record.projects.is_none());
        let next = apply(&record, &EditCommand::AddProject).unwrap();
        assert_eq!(next.projects.as_ref().map(Vec::len), Some(1));
        let err = apply(
            &record,
            &EditCommand::SetProject {
                index: 0,
                field: ProjectField::Name,
                value: "x".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditError::IndexOutOfRange { len: 0, .. }));
    }

    #[test]
    fn parses_textual_edits() {
        assert_eq!(
            "fullName=Jo = Doe".parse::<EditCommand>().unwrap(),
            set(ScalarField::FullName, "Jo = Doe")
        );
        assert_eq!("skills+".parse::<EditCommand>().unwrap(), EditCommand::AddSkill);
        assert_eq!(
            "skills[3]-".parse::<EditCommand>().unwrap(),
            EditCommand::RemoveSkill { index: 3 }
        );
        assert_eq!(
            "contact.website=alex.dev".parse::<EditCommand>().unwrap(),
            EditCommand::SetContact {
                field: ContactField::Website,
                value: "alex.dev".into()
            }
        );
        assert_eq!(
            "experience[0].description=a\\nb".parse::<EditCommand>().unwrap(),
            EditCommand::SetExperience {
                index: 0,
                field: ExperienceField::Description,
                value: "a\nb".into()
            }
        );
        assert_eq!(
            "job_title=".parse::<EditCommand>().unwrap(),
            set(ScalarField::JobTitle, "")
        );
    }

    #[test]
    fn description_escapes() {
        assert_eq!(unescape_description("a\\nb"), "a\nb");
        assert_eq!(unescape_description("C:\\\\new"), "C:\\new");
        assert_eq!(unescape_description("path\\\\nope\\nnext"), "path\\nope\nnext");
        assert_eq!(unescape_description("50\\% off\\"), "50\\% off\\");
        assert_eq!(
            "experience[1].description=line\\\\n\\n".parse::<EditCommand>().unwrap(),
            EditCommand::SetExperience {
                index: 1,
                field: ExperienceField::Description,
                value: "line\\n\n".into()
            }
        );
    }

    #[test]
    fn rejects_malformed_textual_edits() {
        for bad in ["fullName", "skills[x]=a", "contact.fax=1", "experience[0]=x", "nope+"] {
            assert!(bad.parse::<EditCommand>().is_err(), "accepted {bad:?}");
        }
    }
}

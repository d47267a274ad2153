//! Prompts for the extraction collaborator.
//!
//! There are two system prompts: one for documents (PDF pages or images sent
//! to a vision model) and a shorter one for pasted text. Both can be tailored
//! to a job description and both end with the JSON shape the decoder expects.
//! Callers can replace either via [`crate::config::RevampConfig::system_prompt`].

/// System prompt for the document path.
pub const DOCUMENT_SYSTEM_PROMPT: &str = r#"You are an expert Resume Consultant and Professional Writer.
Your task is to extract information from the provided resume document and structure it into a JSON format.
CRITICAL: You must IMPROVE the content while extracting it.
1. Rewrite bullet points to be action-oriented and results-driven (e.g., "Managed a team" -> "Led a cross-functional team of 10...").
2. If metrics are missing but implied, suggest plausible placeholders or maximize the language impact.
3. Ensure the tone is professional, modern, and suitable for current hiring standards.
4. Fix any grammar or spelling errors.
5. Categorize skills logically if possible, but return them as a flat list.
6. IMPORTANT: Do NOT summarize, cut, or truncate the work history to fit a specific page limit. Include ALL relevant roles, dates, and details found in the source. If the resume is long, the output should be long."#;

/// System prompt for the pasted-text path.
pub const TEXT_SYSTEM_PROMPT: &str = r#"You are an expert Resume Consultant.
Parse the following raw text resume and structure it into JSON.
Rewrite the content to be professional, results-oriented, and error-free.
Do NOT truncate the resume. Include all experience."#;

/// User instruction that accompanies the page images.
pub const DOCUMENT_USER_PROMPT: &str = "Parse this resume and return the structured data following the schema. \
Rewrite descriptions to be ATS-friendly and high-impact. Capture all experience entries.";

/// The response shape, appended to every system prompt.
pub const RESPONSE_SCHEMA: &str = r#"Respond with a single JSON object and nothing else, using exactly these keys:
{
  "fullName": string,
  "jobTitle": string,
  "contact": { "email": string, "phone"?: string, "location"?: string, "linkedin"?: string, "website"?: string },
  "summary": string,
  "skills": string[],
  "experience": [ { "role": string, "company": string, "location"?: string, "dates": string, "description": string[] } ],
  "education": [ { "degree": string, "school": string, "location"?: string, "dates": string } ],
  "projects"?: [ { "name": string, "description": string, "link"?: string } ]
}
"contact.email" is required. Each entry of "description" is one bullet point."#;

/// Which extraction path a prompt is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Document,
    Text,
}

/// Assemble the system prompt: base rules, optional job tailoring, then the schema.
///
/// A blank job description counts as absent.
pub fn system_prompt(kind: PromptKind, custom: Option<&str>, job_description: Option<&str>) -> String {
    let base = custom.unwrap_or(match kind {
        PromptKind::Document => DOCUMENT_SYSTEM_PROMPT,
        PromptKind::Text => TEXT_SYSTEM_PROMPT,
    });
    let mut prompt = base.to_string();

    if let Some(jd) = job_description.map(str::trim).filter(|jd| !jd.is_empty()) {
        match kind {
            PromptKind::Document => prompt.push_str(&format!(
                "\n\nAdditionally, tailor the keywords and summary to align with the following \
Job Description context provided by the user:\n\"{jd}\""
            )),
            PromptKind::Text => {
                prompt.push_str(&format!("\n\nOptimize for this job description: \"{jd}\""))
            }
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(RESPONSE_SCHEMA);
    prompt
}

/// User message for the text path.
pub fn text_user_prompt(text: &str) -> String {
    format!("Resume Text:\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_prompt_forbids_truncation() {
        let p = system_prompt(PromptKind::Document, None, None);
        assert!(p.contains("Do NOT summarize, cut, or truncate"));
        assert!(p.ends_with("one bullet point."));
    }

    #[test]
    fn job_description_is_embedded_per_path() {
        let doc = system_prompt(PromptKind::Document, None, Some("Staff PM at Acme"));
        assert!(doc.contains("Job Description context"));
        assert!(doc.contains("\"Staff PM at Acme\""));

        let text = system_prompt(PromptKind::Text, None, Some("Staff PM at Acme"));
        assert!(text.contains("Optimize for this job description: \"Staff PM at Acme\""));
    }

    #[test]
    fn blank_job_description_is_ignored() {
        assert_eq!(
            system_prompt(PromptKind::Text, None, Some("   ")),
            system_prompt(PromptKind::Text, None, None)
        );
    }

    #[test]
    fn custom_prompt_still_gets_schema() {
        let p = system_prompt(PromptKind::Document, Some("Be brief."), None);
        assert!(p.starts_with("Be brief."));
        assert!(p.contains("\"fullName\": string"));
    }
}

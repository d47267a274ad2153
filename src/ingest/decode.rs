//! Response decoding: model text → [`ResumeRecord`].
//!
//! Models asked for bare JSON still wrap it in a code fence now and then.
//! The fence is stripped before decoding; anything that still fails to decode
//! is an extraction failure. No partial record ever leaves this module.

use crate::error::ExtractionError;
use crate::record::ResumeRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_OPEN_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*").unwrap());
static RE_CLOSE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*```$").unwrap());

/// Remove one leading ```` ``` ````/```` ```json ```` marker and one trailing
/// ```` ``` ````, then trim.
pub fn strip_fences(text: &str) -> String {
    let text = text.trim();
    let text = RE_OPEN_FENCE.replace(text, "");
    let text = RE_CLOSE_FENCE.replace(&text, "");
    text.trim().to_string()
}

/// Decode a model response into a record.
pub fn decode_record(response: &str) -> Result<ResumeRecord, ExtractionError> {
    let cleaned = strip_fences(response);
    if cleaned.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }
    let record: ResumeRecord =
        serde_json::from_str(&cleaned).map_err(|e| ExtractionError::MalformedResponse {
            detail: e.to_string(),
        })?;
    if record.contact.email.trim().is_empty() {
        return Err(ExtractionError::MissingEmail);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"fullName":"Jo Doe","jobTitle":"Dev","contact":{"email":"jo@x.io"},
        "summary":"s","skills":["Rust"],"experience":[],"education":[]}"#;

    #[test]
    fn fenced_and_bare_decode_equal() {
        let fenced = format!("```json\n{PAYLOAD}\n```");
        assert_eq!(decode_record(&fenced).unwrap(), decode_record(PAYLOAD).unwrap());
    }

    #[test]
    fn strips_uppercase_and_plain_fences() {
        assert_eq!(strip_fences("```JSON\n{}\n```"), "{}");
        assert_eq!(strip_fences("```\n{}\n```  \n"), "{}");
        assert_eq!(strip_fences("{}"), "{}");
    }

    #[test]
    fn empty_response() {
        assert!(matches!(decode_record("```json\n```"), Err(ExtractionError::EmptyResponse)));
        assert!(matches!(decode_record("   "), Err(ExtractionError::EmptyResponse)));
    }

    #[test]
    fn prose_is_malformed() {
        let err = decode_record("Sure! Here is the resume you asked for.").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedResponse { .. }));
    }

    #[test]
    fn blank_email_is_rejected() {
        let json = PAYLOAD.replace("jo@x.io", " ");
        assert!(matches!(decode_record(&json), Err(ExtractionError::MissingEmail)));
    }
}

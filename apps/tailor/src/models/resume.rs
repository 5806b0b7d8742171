use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filename stem used when the tailored résumé carries no headline.
pub const DEFAULT_FILENAME_STEM: &str = "tailored_resume";

/// The structured résumé produced by the strategy stage.
///
/// `contact` and `sections` are required; a payload missing either is rejected
/// at parse time. Everything else is optional and simply omitted when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredResume {
    pub contact: Contact,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub sections: Vec<ResumeSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub links: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSection {
    pub title: String,
    pub items: Vec<ResumeItem>,
}

/// A loosely-typed section item. Its shape depends on the section title
/// (education, experience, or generic), so fields are read through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeItem(pub Map<String, Value>);

impl TailoredResume {
    /// `"Senior Rust Engineer"` → `"senior_rust_engineer.pdf"`.
    pub fn suggested_filename(&self) -> String {
        let stem = self
            .headline
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_FILENAME_STEM);
        format!("{}.pdf", stem.replace(' ', "_").to_lowercase())
    }
}

impl Contact {
    /// Present contact fields in display order: email, phone, location, links.
    pub fn display_parts(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = [&self.email, &self.phone, &self.location]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(links) = &self.links {
            parts.extend(links.iter().map(String::as_str).filter(|l| !l.is_empty()));
        }
        parts
    }
}

impl ResumeItem {
    /// A non-empty string field. Numbers are accepted and stringified.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A list field; scalar elements are stringified, nulls and empties dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resume_with_headline(headline: Option<&str>) -> TailoredResume {
        TailoredResume {
            contact: Contact::default(),
            headline: headline.map(String::from),
            summary: None,
            sections: vec![],
        }
    }

    #[test]
    fn test_suggested_filename_from_headline() {
        let r = resume_with_headline(Some("Senior Rust Engineer"));
        assert_eq!(r.suggested_filename(), "senior_rust_engineer.pdf");
    }

    #[test]
    fn test_suggested_filename_default() {
        assert_eq!(resume_with_headline(None).suggested_filename(), "tailored_resume.pdf");
        assert_eq!(resume_with_headline(Some("")).suggested_filename(), "tailored_resume.pdf");
    }

    #[test]
    fn test_contact_display_parts_order_and_omission() {
        let contact = Contact {
            name: Some("Jane".into()),
            email: Some("jane@example.com".into()),
            phone: None,
            location: Some("Berlin".into()),
            links: Some(vec!["github.com/jane".into(), "".into()]),
        };
        assert_eq!(
            contact.display_parts(),
            vec!["jane@example.com", "Berlin", "github.com/jane"]
        );
        assert!(Contact::default().display_parts().is_empty());
    }

    #[test]
    fn test_item_accessors_are_lenient() {
        let item: ResumeItem = serde_json::from_value(json!({
            "name": "Compiler",
            "year": 2021,
            "tech_stack": ["Rust", 42, null, ""],
            "bullets": "not a list"
        }))
        .unwrap();
        assert_eq!(item.text("name").as_deref(), Some("Compiler"));
        assert_eq!(item.text("year").as_deref(), Some("2021"));
        assert_eq!(item.text("missing"), None);
        assert_eq!(item.list("tech_stack"), vec!["Rust", "42"]);
        assert!(item.list("bullets").is_empty());
    }

    #[test]
    fn test_missing_sections_is_rejected() {
        let result: Result<TailoredResume, _> =
            serde_json::from_value(json!({"contact": {}, "headline": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_field_type_is_rejected() {
        let result: Result<TailoredResume, _> =
            serde_json::from_value(json!({"contact": {}, "sections": [{"title": 7, "items": []}]}));
        assert!(result.is_err());
    }
}

use serde::{Deserialize, Serialize};

/// Question list produced by the workshop and interview-prep stages.
///
/// `questions` may be absent or null (treated as no questions) but, when
/// present, must be an array of strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionList {
    #[serde(default)]
    pub questions: Option<Vec<String>>,
}

impl QuestionList {
    pub fn into_questions(self) -> Vec<String> {
        self.questions.unwrap_or_default()
    }
}

/// Result returned to the caller for workshop and interview-prep runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkshopResult {
    pub questions: Vec<String>,
    pub context: WorkshopContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopContext {
    pub resume_name: Option<String>,
    pub workshop_focus: Option<String>,
    pub job_link: Option<String>,
    pub has_extra_notes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_serializes_camel_case() {
        let result = WorkshopResult {
            questions: vec!["Q1".into()],
            context: WorkshopContext {
                resume_name: Some("cv.pdf".into()),
                workshop_focus: None,
                job_link: None,
                has_extra_notes: true,
            },
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["context"]["resumeName"], "cv.pdf");
        assert_eq!(value["context"]["hasExtraNotes"], true);
        assert!(value["context"]["workshopFocus"].is_null());
    }

    #[test]
    fn test_question_list_null_means_empty() {
        let list: QuestionList = serde_json::from_str(r#"{"questions": null}"#).unwrap();
        assert!(list.into_questions().is_empty());
    }
}

//! Assessment input records and the structured insights the model must return.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A raw narrative describing one user's performance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    #[serde(alias = "assessment_result")]
    pub result: String,
}

impl AssessmentRecord {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }
}

/// Key insights extracted from an assessment narrative.
///
/// Decoding is strict: every field is required and unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InsightsResult {
    pub overall_assessment: String,
    #[serde(rename = "questions_answered_correctly")]
    pub correct_answers: i64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub actionable_feedback: BTreeMap<String, String>,
    #[serde(rename = "business_case_impact_analysis")]
    pub business_impact: BTreeMap<String, String>,
}

impl InsightsResult {
    /// Decode a model response.
    ///
    /// Only surrounding whitespace is tolerated. Markdown fences, comments and
    /// trailing prose all fail.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if `text` is not exactly one schema-valid object.
    pub fn from_response(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The published output schema, pretty-printed for prompt embedding.
    #[must_use]
    pub fn schema_json() -> &'static str {
        static SCHEMA: OnceLock<String> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let schema = schemars::schema_for!(InsightsResult);
            serde_json::to_string_pretty(&schema).unwrap_or_else(|e| {
                tracing::error!("failed to render insights schema: {e}");
                String::new()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::Value;

    use super::*;

    const VALID: &str = r#"{
        "overall_assessment": "Good performance",
        "questions_answered_correctly": 8,
        "strengths": ["Data modeling", "ETL processes"],
        "weaknesses": ["Cloud security"],
        "actionable_feedback": {"study": "Focus on cloud security concepts"},
        "business_case_impact_analysis": {"efficiency": "Improved data pipeline design"}
    }"#;

    fn expected() -> InsightsResult {
        InsightsResult {
            overall_assessment: "Good performance".into(),
            correct_answers: 8,
            strengths: vec!["Data modeling".into(), "ETL processes".into()],
            weaknesses: vec!["Cloud security".into()],
            actionable_feedback: BTreeMap::from([(
                "study".into(),
                "Focus on cloud security concepts".into(),
            )]),
            business_impact: BTreeMap::from([(
                "efficiency".into(),
                "Improved data pipeline design".into(),
            )]),
        }
    }

    #[test]
    fn decodes_valid_response() {
        assert_eq!(InsightsResult::from_response(VALID).unwrap(), expected());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let padded = format!("\n\n  {VALID}  \n");
        assert_eq!(InsightsResult::from_response(&padded).unwrap(), expected());
    }

    #[test]
    fn rejects_markdown_fences() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(InsightsResult::from_response(&fenced).is_err());
    }

    #[test]
    fn rejects_trailing_comment() {
        let commented = format!("{VALID} // extracted by the model");
        assert!(InsightsResult::from_response(&commented).is_err());
    }

    #[test]
    fn rejects_leading_explanation() {
        let chatty = format!("Here are the insights:\n{VALID}");
        assert!(InsightsResult::from_response(&chatty).is_err());
    }

    #[test]
    fn rejects_unknown_top_level_key() {
        let mut value: Value = serde_json::from_str(VALID).unwrap();
        value["confidence"] = Value::from(0.9);
        assert!(InsightsResult::from_response(&value.to_string()).is_err());
    }

    #[test]
    fn rejects_each_missing_required_field() {
        let value: Value = serde_json::from_str(VALID).unwrap();
        for field in [
            "overall_assessment",
            "questions_answered_correctly",
            "strengths",
            "weaknesses",
            "actionable_feedback",
            "business_case_impact_analysis",
        ] {
            let mut partial = value.clone();
            partial.as_object_mut().unwrap().remove(field);
            assert!(
                InsightsResult::from_response(&partial.to_string()).is_err(),
                "missing {field} should fail"
            );
        }
    }

    #[test]
    fn rejects_non_string_map_values() {
        let mut value: Value = serde_json::from_str(VALID).unwrap();
        value["actionable_feedback"] = serde_json::json!({"study": 3});
        assert!(InsightsResult::from_response(&value.to_string()).is_err());
    }

    #[test]
    fn rejects_fractional_count() {
        let mut value: Value = serde_json::from_str(VALID).unwrap();
        value["questions_answered_correctly"] = Value::from(5.5);
        assert!(InsightsResult::from_response(&value.to_string()).is_err());
    }

    #[test]
    fn rejects_empty_object() {
        assert!(InsightsResult::from_response("{}").is_err());
    }

    #[test]
    fn serializes_with_schema_names() {
        let value = serde_json::to_value(expected()).unwrap();
        assert_eq!(value["questions_answered_correctly"], 8);
        assert_eq!(
            value["business_case_impact_analysis"]["efficiency"],
            "Improved data pipeline design"
        );
        assert!(value.get("correct_answers").is_none());
    }

    #[test]
    fn schema_is_strict_and_complete() {
        let schema: Value = serde_json::from_str(InsightsResult::schema_json()).unwrap();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        for field in [
            "overall_assessment",
            "questions_answered_correctly",
            "strengths",
            "weaknesses",
            "actionable_feedback",
            "business_case_impact_analysis",
        ] {
            assert!(required.contains(&field), "{field} not required");
        }

        let props = &schema["properties"];
        assert_eq!(props["questions_answered_correctly"]["type"], "integer");
        assert_eq!(props["strengths"]["items"]["type"], "string");
        assert_eq!(
            props["actionable_feedback"]["additionalProperties"]["type"],
            "string"
        );
    }

    #[test]
    fn record_accepts_store_field_name() {
        let record: AssessmentRecord =
            serde_json::from_str(r#"{"assessment_result": "Scored 7/10"}"#).unwrap();
        assert_eq!(record.result, "Scored 7/10");
        let record: AssessmentRecord = serde_json::from_str(r#"{"result": "x"}"#).unwrap();
        assert_eq!(record, AssessmentRecord::new("x"));
    }

    fn arb_map() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map("[a-z_]{1,8}", ".{0,16}", 0..4)
    }

    proptest! {
        #[test]
        fn decoded_fields_equal_encoded_values(
            overall in ".{0,32}",
            correct in any::<i64>(),
            strengths in prop::collection::vec(".{0,16}", 0..4),
            weaknesses in prop::collection::vec(".{0,16}", 0..4),
            feedback in arb_map(),
            impact in arb_map(),
        ) {
            let original = InsightsResult {
                overall_assessment: overall,
                correct_answers: correct,
                strengths,
                weaknesses,
                actionable_feedback: feedback,
                business_impact: impact,
            };
            let text = serde_json::to_string(&original).unwrap();
            prop_assert_eq!(InsightsResult::from_response(&text).unwrap(), original);
        }
    }
}

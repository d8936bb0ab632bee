//! AQFA 分析結果の JSON スキーマ定義
//!
//! 生成サービスに渡す構造化出力の制約。検証は `pipeline::parse_response` が独立して行う。

use async_openai::types::{ResponseFormat, ResponseFormatJsonSchema};
use serde_json::Value;

/// 構造化出力のスキーマ名
pub const SCHEMA_NAME: &str = "aqfa_analysis";

/// AQFA 分析結果のスキーマ
pub fn response_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "aqfaScore": {
                "type": "number",
                "description": "A single numerical score from 1-10 representing the Air Quality for Activity (AQFA). 1 is worst, 10 is best."
            },
            "summary": {
                "type": "string",
                "description": "A short, encouraging, one-sentence summary of the conditions."
            },
            "recommendations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "activity": { "type": "string" },
                        "time": {
                            "type": "string",
                            "description": "Recommended time slot, e.g., '6:00 AM - 8:00 AM'"
                        },
                        "location": {
                            "type": "string",
                            "description": "A specific park or trail name."
                        },
                        "score": {
                            "type": "number",
                            "description": "The AQFA score for this specific recommendation."
                        }
                    },
                    "required": ["activity", "time", "location", "score"],
                    "additionalProperties": false
                }
            },
            "pollutantBreakdown": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "pollutant": {
                            "type": "string",
                            "description": "e.g., 'Ozone', 'NO2', 'PM2.5'"
                        },
                        "level": {
                            "type": "string",
                            "description": "e.g., 'Low', 'Moderate', 'High'"
                        },
                        "effect": {
                            "type": "string",
                            "description": "A brief description of its effect on physical performance."
                        }
                    },
                    "required": ["pollutant", "level", "effect"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["aqfaScore", "summary", "recommendations", "pollutantBreakdown"],
        "additionalProperties": false
    })
}

/// スキーマを strict な JSON Schema レスポンス形式として包む
pub fn response_format(schema: &Value) -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: Some("Air Quality for Activity analysis".to_string()),
            name: SCHEMA_NAME.to_string(),
            schema: Some(schema.clone()),
            strict: Some(true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_all_top_level_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["aqfaScore", "summary", "recommendations", "pollutantBreakdown"]
        );
    }

    #[test]
    fn schema_declares_field_types() {
        let schema = response_schema();
        let props = &schema["properties"];
        assert_eq!(props["aqfaScore"]["type"], "number");
        assert_eq!(props["summary"]["type"], "string");
        assert_eq!(props["recommendations"]["type"], "array");
        assert_eq!(
            props["recommendations"]["items"]["properties"]["score"]["type"],
            "number"
        );
        assert_eq!(props["pollutantBreakdown"]["items"]["required"][2], "effect");
    }

    #[test]
    fn every_object_forbids_additional_properties() {
        let schema = response_schema();
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["properties"]["recommendations"]["items"]["additionalProperties"],
            false
        );
        assert_eq!(
            schema["properties"]["pollutantBreakdown"]["items"]["additionalProperties"],
            false
        );
    }

    #[test]
    fn response_format_is_strict_json_schema() {
        match response_format(&response_schema()) {
            ResponseFormat::JsonSchema { json_schema } => {
                assert_eq!(json_schema.name, SCHEMA_NAME);
                assert_eq!(json_schema.strict, Some(true));
                assert!(json_schema.schema.is_some());
            }
            other => panic!("unexpected response format: {other:?}"),
        }
    }
}

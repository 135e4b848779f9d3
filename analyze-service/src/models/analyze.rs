use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::ValidationErrors;

use crate::extract::{require_string_list, Schema};

/// Submitted questions and answers. The two lists are independent: no
/// length or pairing check is made between them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

impl Schema for AnalyzeRequest {
    const FIELDS: &'static [&'static str] = &["questions", "answers"];

    fn check(body: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for &field in Self::FIELDS {
            require_string_list(body, field, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub received: AnalyzeRequest,
}

impl AnalyzeResponse {
    pub fn echo(request: AnalyzeRequest) -> Self {
        Self { received: request }
    }
}

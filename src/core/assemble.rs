use crate::domain::model::{DiffResult, RelationshipRecord};
use crate::utils::error::{AuditError, Result};
use serde::{Deserialize, Serialize};

/// 成功回應的對外格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub not_following_back: Vec<RelationshipRecord>,
    pub not_followed_by_you: Vec<RelationshipRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ResultAssembler;

impl ResultAssembler {
    pub fn assemble(result: DiffResult) -> AuditResponse {
        AuditResponse {
            not_following_back: result.not_following_back,
            not_followed_by_you: result.not_followed_by_you,
        }
    }

    pub fn assemble_error(error: &AuditError) -> ErrorResponse {
        ErrorResponse {
            error: error.user_friendly_message(),
        }
    }

    /// 產生 (HTTP 等價狀態碼, JSON 主體)；失敗時不會回傳部分結果
    pub fn respond(outcome: Result<DiffResult>) -> (u16, serde_json::Value) {
        match outcome {
            Ok(result) => {
                let body = serde_json::to_value(Self::assemble(result));
                match body {
                    Ok(body) => (200, body),
                    Err(e) => Self::respond_error(&AuditError::SerializationError(e)),
                }
            }
            Err(e) => Self::respond_error(&e),
        }
    }

    fn respond_error(error: &AuditError) -> (u16, serde_json::Value) {
        if error.is_client_error() {
            tracing::warn!("Request rejected: {}", error);
        } else {
            tracing::error!("❌ Request failed: {:?}", error);
        }
        let body = serde_json::json!({ "error": Self::assemble_error(error).error });
        (error.status_code(), body)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 审计动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    SessionInvalidateAll,
    TokenRevoked,
    TokenRevokeAll,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::SessionInvalidateAll => "session_invalidate_all",
            AuditAction::TokenRevoked => "token_revoked",
            AuditAction::TokenRevokeAll => "token_revoke_all",
        }
    }
}

/// 审计条目
///
/// 一次写入，此后不可变。保留与删除由外部落地方负责。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub actor_id: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub previous: Option<serde_json::Value>,
    pub next: Option<serde_json::Value>,
    pub ip: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        actor_id: &str,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        ip: &str,
        user_agent: &str,
        previous: Option<serde_json::Value>,
        next: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            actor_id: actor_id.to_string(),
            action,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            previous,
            next,
            ip: ip.to_string(),
            user_agent: user_agent.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = AuditEntry::new(
            "user123",
            AuditAction::Login,
            "session",
            "sess-1",
            "1.1.1.1",
            "test-agent/1.0",
            None,
            Some(serde_json::json!({"device": "fp-1"})),
        );

        assert!(!entry.id.is_empty());
        assert_eq!(entry.action, AuditAction::Login);
        assert_eq!(entry.action.as_str(), "login");
        assert!(entry.previous.is_none());
    }

    #[test]
    fn test_action_serde_uses_snake_case() {
        let json = serde_json::to_string(&AuditAction::SessionInvalidateAll).unwrap();
        assert_eq!(json, "\"session_invalidate_all\"");
    }
}

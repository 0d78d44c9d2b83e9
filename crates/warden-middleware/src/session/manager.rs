use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use warden_core::{DeviceInfo, Result};

use super::{Session, SessionStats, SessionStore};
use crate::audit::{AuditAction, AuditLogger};
use crate::token::TokenManager;

/// 新建会话的返回结果
#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// 会话管理器
///
/// 会话生命周期：创建 → 活跃（活跃回报维持）→ 失效（终态）。
/// 凭据校验由外部认证入口完成，这里只负责校验通过之后的部分。
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    tokens: Arc<TokenManager>,
    audit: AuditLogger,
}

impl SessionManager {
    /// 创建会话管理器。存储、令牌管理器和审计日志器由外部注入。
    pub fn new(store: Arc<dyn SessionStore>, tokens: Arc<TokenManager>, audit: AuditLogger) -> Self {
        Self { store, tokens, audit }
    }

    /// 创建新会话
    ///
    /// 签发一对访问/刷新令牌并绑定到会话，记录登录审计。
    pub async fn create_session(
        &self,
        subject_id: &str,
        email: &str,
        role: &str,
        device: DeviceInfo,
        ip: &str,
    ) -> Result<CreatedSession> {
        let access = self.tokens.issue_access_token(subject_id, email, role)?;
        let refresh = self.tokens.issue_refresh_token(subject_id, &device).await?;

        let session = Session::new(
            subject_id.to_string(),
            device,
            ip.to_string(),
            access.token_id,
            refresh.token_id,
        );
        self.store.save(session.clone()).await?;

        self.audit.record(
            subject_id,
            AuditAction::Login,
            "session",
            &session.session_id,
            ip,
            &session.device.user_agent,
            None,
            Some(json!({ "device": session.device.fingerprint })),
        );
        info!(session_id = %session.session_id, subject_id = subject_id, "Session created");

        Ok(CreatedSession {
            session_id: session.session_id,
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }

    /// 查询会话，只返回存在且活跃的
    ///
    /// 不重新验证令牌签名，那是令牌管理器的职责；这里是快速的
    /// 存在性 + 活跃性检查。
    pub async fn validate_session(&self, session_id: &str) -> Option<Session> {
        self.store
            .load(session_id)
            .await
            .ok()
            .flatten()
            .filter(|s| s.is_active)
    }

    /// 活跃回报，刷新最后活跃时间
    ///
    /// 外部的空闲清扫任务依据该时间戳工作。会话不存在或已失效时
    /// 返回 false。
    pub async fn update_session_activity(&self, session_id: &str) -> bool {
        let touched = self.store.touch(session_id).await.unwrap_or(false);
        if touched {
            debug!(session_id = session_id, "Session activity updated");
        }
        touched
    }

    /// 注销单个会话
    ///
    /// 置为失效终态，吊销关联的两个令牌，记录审计。会话不存在或
    /// 已失效时返回 false（与"无事可做"统一处理）。
    pub async fn invalidate_session(
        &self,
        session_id: &str,
        subject_id: &str,
        reason: &str,
        ip: &str,
    ) -> Result<bool> {
        let session = match self.store.deactivate(session_id).await? {
            Some(session) => session,
            None => return Ok(false),
        };

        self.revoke_session_tokens(&session, subject_id, reason, ip).await;

        self.audit.record(
            subject_id,
            AuditAction::Logout,
            "session",
            session_id,
            ip,
            &session.device.user_agent,
            Some(json!({ "is_active": true })),
            Some(json!({ "is_active": false, "reason": reason })),
        );
        info!(session_id = session_id, subject_id = subject_id, reason = reason, "Session invalidated");

        Ok(true)
    }

    /// 注销某个用户的全部会话（"在所有设备上退出"）
    ///
    /// 逐个失效并吊销令牌，最后整体吊销该用户名下剩余的刷新令牌。
    /// 返回本次失效的会话数。
    pub async fn invalidate_all_user_sessions(
        &self,
        subject_id: &str,
        reason: &str,
    ) -> Result<usize> {
        let sessions = self.store.find_by_subject(subject_id).await?;

        let mut invalidated = 0;
        for session in sessions {
            if let Some(session) = self.store.deactivate(&session.session_id).await? {
                let ip = session.ip.clone();
                self.revoke_session_tokens(&session, subject_id, reason, &ip).await;
                self.audit.record(
                    subject_id,
                    AuditAction::Logout,
                    "session",
                    &session.session_id,
                    &ip,
                    &session.device.user_agent,
                    Some(json!({ "is_active": true })),
                    Some(json!({ "is_active": false, "reason": reason })),
                );
                invalidated += 1;
            }
        }

        // 兜底：不挂在任何会话上的刷新令牌也一并吊销
        let revoked = self.tokens.revoke_all_for_subject(subject_id).await;
        if revoked > 0 {
            self.audit.record(
                subject_id,
                AuditAction::TokenRevokeAll,
                "subject",
                subject_id,
                "",
                "",
                None,
                Some(json!({ "refresh_tokens_revoked": revoked })),
            );
        }

        self.audit.record(
            subject_id,
            AuditAction::SessionInvalidateAll,
            "subject",
            subject_id,
            "",
            "",
            None,
            Some(json!({ "invalidated": invalidated, "reason": reason })),
        );
        info!(subject_id = subject_id, invalidated = invalidated, reason = reason, "All user sessions invalidated");

        Ok(invalidated)
    }

    /// 聚合统计，供管理面使用
    pub async fn session_stats(&self) -> Result<SessionStats> {
        self.store.stats().await
    }

    /// 吊销会话绑定的令牌对并逐条记录审计
    ///
    /// 黑名单和吊销都是幂等的，会话标记失效后进程崩溃也可以
    /// 安全重试。
    async fn revoke_session_tokens(&self, session: &Session, subject_id: &str, reason: &str, ip: &str) {
        if self
            .tokens
            .blacklist_token(&session.access_token_id, subject_id, reason)
            .await
        {
            self.audit.record(
                subject_id,
                AuditAction::TokenRevoked,
                "token",
                &session.access_token_id,
                ip,
                &session.device.user_agent,
                None,
                Some(json!({ "kind": "access", "reason": reason })),
            );
        }

        if self.tokens.revoke_refresh_token(&session.refresh_token_id).await {
            self.audit.record(
                subject_id,
                AuditAction::TokenRevoked,
                "token",
                &session.refresh_token_id,
                ip,
                &session.device.user_agent,
                None,
                Some(json!({ "kind": "refresh", "reason": reason })),
            );
        }
    }
}

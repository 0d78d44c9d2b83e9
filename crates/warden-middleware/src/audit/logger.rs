use std::sync::Arc;
use tracing::warn;

use super::{AuditAction, AuditEntry, AuditSink};

/// 审计日志器
///
/// 写入是 fire-and-forget：条目在后台任务中交给落地方，落地失败
/// 只记日志，绝不反过来让触发它的会话/令牌操作失败。
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// 记录一条审计条目
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        actor_id: &str,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        ip: &str,
        user_agent: &str,
        previous: Option<serde_json::Value>,
        next: Option<serde_json::Value>,
    ) {
        let entry = AuditEntry::new(
            actor_id,
            action,
            resource_type,
            resource_id,
            ip,
            user_agent,
            previous,
            next,
        );

        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.write(entry).await {
                warn!(error = %e, "Audit sink write failed");
            }
        });
    }
}

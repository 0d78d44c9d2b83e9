use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use warden_core::Result;

use super::AuditEntry;

/// 审计落地接口
///
/// 具体落地方式（日志流、数据库表、消息总线）由外部注入。
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// 写入一条审计条目
    async fn write(&self, entry: AuditEntry) -> Result<()>;
}

/// 写入 tracing 日志流的落地实现
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn write(&self, entry: AuditEntry) -> Result<()> {
        info!(
            target: "audit",
            id = %entry.id,
            actor_id = %entry.actor_id,
            action = entry.action.as_str(),
            resource_type = %entry.resource_type,
            resource_id = %entry.resource_id,
            ip = %entry.ip,
            user_agent = %entry.user_agent,
            "Audit entry recorded"
        );
        Ok(())
    }
}

/// 内存缓冲落地（用于测试和内省）
pub struct MemoryAuditSink {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// 当前已写入的条目快照
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn write(&self, entry: AuditEntry) -> Result<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;

    fn entry() -> AuditEntry {
        AuditEntry::new(
            "user123",
            AuditAction::Login,
            "session",
            "sess-1",
            "1.1.1.1",
            "test-agent/1.0",
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_memory_sink_collects_entries() {
        let sink = MemoryAuditSink::new();

        sink.write(entry()).await.unwrap();
        sink.write(entry()).await.unwrap();

        assert_eq!(sink.len().await, 2);
        assert_eq!(sink.entries().await[0].actor_id, "user123");
    }

    #[tokio::test]
    async fn test_tracing_sink_never_fails() {
        let sink = TracingAuditSink;
        assert!(sink.write(entry()).await.is_ok());
    }
}

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use warden_core::Result;

use super::Session;

/// 会话统计
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SessionStats {
    /// 当前跟踪的会话总数（含已失效、未清理的）
    pub total: usize,
    /// 活跃会话数
    pub active: usize,
}

/// 会话存储 trait
///
/// 所有读-改-写操作必须对单个会话原子完成：注销和活跃回报并发时，
/// 结果必须是终态 is_active=false，不允许被回写为 true。
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 保存会话
    async fn save(&self, session: Session) -> Result<()>;

    /// 加载会话
    async fn load(&self, session_id: &str) -> Result<Option<Session>>;

    /// 删除会话
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// 检查会话是否存在
    async fn exists(&self, session_id: &str) -> Result<bool>;

    /// 更新最后活跃时间。只有活跃会话会被更新，返回是否更新。
    async fn touch(&self, session_id: &str) -> Result<bool>;

    /// 将会话置为失效（终态）
    ///
    /// 只在发生 活跃 → 失效 转换时返回会话记录；会话不存在或已经
    /// 失效时返回 `None`，调用方据此保证副作用只执行一次。
    async fn deactivate(&self, session_id: &str) -> Result<Option<Session>>;

    /// 列出某个用户的全部会话
    async fn find_by_subject(&self, subject_id: &str) -> Result<Vec<Session>>;

    /// 聚合统计
    async fn stats(&self) -> Result<SessionStats>;

    /// 清理空闲超时的会话，返回清理数量。调度由外部负责。
    async fn cleanup_idle(&self, idle_secs: i64) -> Result<u64>;
}

/// 内存会话存储
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }

    async fn exists(&self, session_id: &str) -> Result<bool> {
        let sessions = self.sessions.read().await;
        Ok(sessions.contains_key(session_id))
    }

    async fn touch(&self, session_id: &str) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) if session.is_active => {
                session.touch();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn deactivate(&self, session_id: &str) -> Result<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) if session.is_active => {
                session.is_active = false;
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_by_subject(&self, subject_id: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn stats(&self) -> Result<SessionStats> {
        let sessions = self.sessions.read().await;
        Ok(SessionStats {
            total: sessions.len(),
            active: sessions.values().filter(|s| s.is_active).count(),
        })
    }

    async fn cleanup_idle(&self, idle_secs: i64) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.idle_longer_than(idle_secs));
        Ok((before - sessions.len()) as u64)
    }
}

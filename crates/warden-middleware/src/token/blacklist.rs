use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 黑名单条目
#[derive(Debug, Clone)]
pub struct BlacklistEntry {
    pub subject_id: String,
    pub reason: String,
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// 访问令牌黑名单
///
/// 按令牌 ID 记录被强制吊销的访问令牌。条目只需保留到令牌自然过期，
/// 每次写入时顺带清理已过期的条目。
#[derive(Clone)]
pub struct TokenBlacklist {
    entries: Arc<RwLock<HashMap<String, BlacklistEntry>>>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 插入条目（幂等）。已在名单中的令牌不会被覆盖。
    ///
    /// 返回是否为新插入。
    pub async fn insert(&self, token_id: String, entry: BlacklistEntry) -> bool {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);

        match entries.entry(token_id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// 检查令牌是否在黑名单中
    pub async fn contains(&self, token_id: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(token_id)
    }

    /// 清理已自然过期的条目，返回清理数量
    pub async fn prune_expired(&self) -> u64 {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        (before - entries.len()) as u64
    }

    /// 当前条目数
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

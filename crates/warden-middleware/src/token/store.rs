use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 刷新令牌存储记录
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub subject_id: String,
    pub device_fingerprint: String,
    pub revoked: bool,
    pub issued_at: DateTime<Utc>,
}

/// 刷新令牌存储
///
/// 刷新令牌必须查表验证：只有在表中且未被吊销的令牌才有效。
/// 吊销是单向的，吊销后的记录不会恢复。
#[derive(Clone)]
pub struct RefreshTokenStore {
    records: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl RefreshTokenStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 登记新签发的刷新令牌
    pub async fn insert(&self, token_id: String, subject_id: String, device_fingerprint: String) {
        let mut records = self.records.write().await;
        records.insert(
            token_id,
            RefreshTokenRecord {
                subject_id,
                device_fingerprint,
                revoked: false,
                issued_at: Utc::now(),
            },
        );
    }

    /// 查询记录
    pub async fn get(&self, token_id: &str) -> Option<RefreshTokenRecord> {
        let records = self.records.read().await;
        records.get(token_id).cloned()
    }

    /// 吊销单个令牌（幂等）。返回是否为新吊销。
    pub async fn revoke(&self, token_id: &str) -> bool {
        let mut records = self.records.write().await;
        match records.get_mut(token_id) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                true
            }
            _ => false,
        }
    }

    /// 吊销某个用户的全部令牌，返回新吊销数量
    pub async fn revoke_all_for_subject(&self, subject_id: &str) -> usize {
        let mut records = self.records.write().await;
        let mut revoked = 0;
        for record in records.values_mut() {
            if record.subject_id == subject_id && !record.revoked {
                record.revoked = true;
                revoked += 1;
            }
        }
        revoked
    }

    /// 当前记录数
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for RefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

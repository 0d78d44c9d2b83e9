use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// 单次限流判定结果
#[derive(Debug, Clone, Copy)]
pub struct RateLimitResult {
    pub success: bool,
    /// 本窗口内已计数的尝试次数
    pub attempts: u32,
    /// 剩余可用次数
    pub remaining: u32,
    /// 窗口重置时间
    pub reset_at: DateTime<Utc>,
}

struct Bucket {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// 固定窗口限流器
///
/// 每个标识符一个计数桶，窗口到期后整体重置（非滑动窗口）。
/// 计数与判定在同一把写锁内完成，并发调用不会丢失计数。
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<RwLock<HashMap<String, Bucket>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 记一次尝试并判定是否放行
    ///
    /// 越界的那一次调用本身也被计数，并作为拒绝结果返回。调用方
    /// 应把这次响应当作拒绝处理，而不是之前的某一次。
    pub async fn rate_limit(
        &self,
        identifier: &str,
        max_attempts: u32,
        window: std::time::Duration,
    ) -> RateLimitResult {
        let now = Utc::now();
        let window = Duration::from_std(window).unwrap_or_else(|_| Duration::days(36500));

        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(identifier.to_string()).or_insert_with(|| Bucket {
            count: 0,
            reset_at: now + window,
        });

        if now > bucket.reset_at {
            bucket.count = 0;
            bucket.reset_at = now + window;
        }

        bucket.count += 1;
        let success = bucket.count <= max_attempts;

        if !success {
            warn!(
                identifier = identifier,
                attempts = bucket.count,
                max_attempts = max_attempts,
                "Rate limit exceeded"
            );
        }

        RateLimitResult {
            success,
            attempts: bucket.count,
            remaining: max_attempts.saturating_sub(bucket.count),
            reset_at: bucket.reset_at,
        }
    }

    /// 清理窗口已过期的桶，返回清理数量
    ///
    /// 过期的桶在下次访问时本来也会重置，这里只是给外部调度器一个
    /// 回收内存的入口。
    pub async fn cleanup(&self) -> usize {
        let now = Utc::now();
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now <= bucket.reset_at);
        before - buckets.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

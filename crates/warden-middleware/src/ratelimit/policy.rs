use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::RateLimiter;

/// 单个动作的限流策略
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window_secs: u64,
}

impl RateLimitPolicy {
    pub fn new(max_attempts: u32, window_secs: u64) -> Self {
        Self {
            max_attempts,
            window_secs,
        }
    }

    pub fn window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.window_secs)
    }
}

/// 动作 → 限流策略表
///
/// 未登记的动作使用默认策略。
#[derive(Debug, Clone)]
pub struct ActionPolicies {
    policies: HashMap<String, RateLimitPolicy>,
    default_policy: RateLimitPolicy,
}

impl Default for ActionPolicies {
    fn default() -> Self {
        let mut policies = HashMap::new();
        policies.insert("forgot_password".to_string(), RateLimitPolicy::new(5, 15 * 60));
        policies.insert("verify_code".to_string(), RateLimitPolicy::new(10, 5 * 60));
        policies.insert("login".to_string(), RateLimitPolicy::new(5, 15 * 60));

        Self {
            policies,
            default_policy: RateLimitPolicy::new(10, 15 * 60),
        }
    }
}

impl ActionPolicies {
    /// 登记或覆盖一个动作的策略
    pub fn with_policy(mut self, action: &str, policy: RateLimitPolicy) -> Self {
        self.policies.insert(action.to_string(), policy);
        self
    }

    /// 查询动作对应的策略
    pub fn policy_for(&self, action: &str) -> &RateLimitPolicy {
        self.policies.get(action).unwrap_or(&self.default_policy)
    }
}

/// 限流判定，面向调用方的结构化结果
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LimitDecision {
    pub allowed: bool,
    /// 本窗口内已使用的尝试次数
    pub attempts: u32,
    /// 距窗口重置的秒数
    pub retry_after_secs: i64,
}

/// 按动作限流的封装
pub struct ActionRateLimiter {
    limiter: RateLimiter,
    policies: ActionPolicies,
}

impl ActionRateLimiter {
    pub fn new(policies: ActionPolicies) -> Self {
        Self {
            limiter: RateLimiter::new(),
            policies,
        }
    }

    /// 按动作策略记一次尝试并判定
    pub async fn check_limit(&self, identifier: &str, action: &str) -> LimitDecision {
        let policy = self.policies.policy_for(action);
        let key = format!("{}:{}", action, identifier);

        let result = self
            .limiter
            .rate_limit(&key, policy.max_attempts, policy.window())
            .await;

        LimitDecision {
            allowed: result.success,
            attempts: result.attempts,
            retry_after_secs: (result.reset_at - Utc::now()).num_seconds().max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forgot_password_policy() {
        let limiter = ActionRateLimiter::new(ActionPolicies::default());

        // 15 分钟窗口内允许 5 次，第 6 次拒绝
        for i in 1..=5 {
            let decision = limiter.check_limit("1.1.1.1", "forgot_password").await;
            assert!(decision.allowed, "attempt {} should be allowed", i);
        }

        let rejected = limiter.check_limit("1.1.1.1", "forgot_password").await;
        assert!(!rejected.allowed);
        assert_eq!(rejected.attempts, 6);
        assert!(rejected.retry_after_secs > 0);
    }

    #[tokio::test]
    async fn test_unknown_action_uses_default_policy() {
        let limiter = ActionRateLimiter::new(ActionPolicies::default());

        for _ in 0..10 {
            assert!(limiter.check_limit("1.1.1.1", "export_report").await.allowed);
        }
        assert!(!limiter.check_limit("1.1.1.1", "export_report").await.allowed);
    }

    #[tokio::test]
    async fn test_actions_do_not_share_buckets() {
        let limiter = ActionRateLimiter::new(ActionPolicies::default());

        for _ in 0..5 {
            limiter.check_limit("1.1.1.1", "forgot_password").await;
        }
        assert!(!limiter.check_limit("1.1.1.1", "forgot_password").await.allowed);

        // 同一标识符的其它动作不受影响
        assert!(limiter.check_limit("1.1.1.1", "verify_code").await.allowed);
    }

    #[test]
    fn test_policy_override() {
        let policies =
            ActionPolicies::default().with_policy("verify_code", RateLimitPolicy::new(2, 60));
        let policy = policies.policy_for("verify_code");
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.window_secs, 60);
    }
}

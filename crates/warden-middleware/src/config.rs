use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use warden_core::{Result, WardenError};

use crate::ratelimit::{ActionPolicies, RateLimitPolicy};

/// JWT 配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    /// 访问令牌有效期（秒）
    pub access_ttl_secs: i64,
    /// 刷新令牌有效期（秒）
    pub refresh_ttl_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "default-secret-change-in-production".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 7 * 24 * 3600,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 空闲超时（秒），由外部清扫任务使用
    pub idle_timeout_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 1800,
        }
    }
}

/// 单个动作的限流策略覆盖
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyOverride {
    pub action: String,
    pub max_attempts: u32,
    pub window_secs: u64,
}

/// 认证核心配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub ratelimit: Vec<PolicyOverride>,
}

impl AuthConfig {
    /// 生成动作限流策略表：内置策略 + 配置覆盖
    pub fn action_policies(&self) -> ActionPolicies {
        let mut policies = ActionPolicies::default();
        for entry in &self.ratelimit {
            policies = policies.with_policy(
                &entry.action,
                RateLimitPolicy::new(entry.max_attempts, entry.window_secs),
            );
        }
        policies
    }
}

/// 配置加载器
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    /// 加载配置。配置文件不存在时返回默认配置。
    pub fn load(&self) -> Result<AuthConfig> {
        let config_path = self.config_dir.join("warden.toml");

        if !config_path.exists() {
            return Ok(AuthConfig::default());
        }

        let path_str = config_path
            .to_str()
            .ok_or_else(|| WardenError::Config("invalid config path".into()))?;

        let config = Config::builder()
            .add_source(File::new(path_str, FileFormat::Toml))
            .build()
            .map_err(|e| WardenError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| WardenError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.jwt.access_ttl_secs, 900);
        assert_eq!(config.jwt.refresh_ttl_secs, 7 * 24 * 3600);
        assert_eq!(config.session.idle_timeout_secs, 1800);
        assert!(config.ratelimit.is_empty());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new(dir.path()).load().unwrap();
        assert_eq!(config.jwt.access_ttl_secs, 900);
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("warden.toml"),
            r#"
[jwt]
secret = "file-secret"
access_ttl_secs = 600

[[ratelimit]]
action = "forgot_password"
max_attempts = 3
window_secs = 600
"#,
        )
        .unwrap();

        let config = ConfigLoader::new(dir.path()).load().unwrap();
        assert_eq!(config.jwt.secret, "file-secret");
        assert_eq!(config.jwt.access_ttl_secs, 600);
        // 未出现的字段回落到默认值
        assert_eq!(config.jwt.refresh_ttl_secs, 7 * 24 * 3600);
        assert_eq!(config.session.idle_timeout_secs, 1800);
        assert_eq!(config.ratelimit.len(), 1);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = AuthConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: AuthConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.jwt.secret, config.jwt.secret);
        assert_eq!(parsed.session.idle_timeout_secs, config.session.idle_timeout_secs);
    }

    #[test]
    fn test_action_policies_with_override() {
        let mut config = AuthConfig::default();
        config.ratelimit.push(PolicyOverride {
            action: "forgot_password".to_string(),
            max_attempts: 3,
            window_secs: 600,
        });

        let policies = config.action_policies();
        let policy = policies.policy_for("forgot_password");
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.window_secs, 600);
    }
}

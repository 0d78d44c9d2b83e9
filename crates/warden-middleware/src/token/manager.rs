use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use warden_core::{DeviceInfo, Result};

use super::{AccessClaims, BlacklistEntry, JwtCodec, RefreshClaims, RefreshTokenStore, TokenBlacklist};
use crate::config::JwtConfig;

/// 新签发的令牌
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

/// 刷新令牌验证通过后返回的授权信息
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    pub subject_id: String,
    pub device_fingerprint: String,
}

/// 令牌管理器
///
/// 访问令牌无状态验证（签名 + 过期），仅多一次黑名单查询以支持强制下线；
/// 刷新令牌长期有效，必须查表，吊销立即生效。
pub struct TokenManager {
    codec: JwtCodec,
    blacklist: TokenBlacklist,
    refresh_store: RefreshTokenStore,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenManager {
    /// 创建令牌管理器。黑名单和刷新令牌存储由外部注入。
    pub fn new(
        codec: JwtCodec,
        blacklist: TokenBlacklist,
        refresh_store: RefreshTokenStore,
        config: &JwtConfig,
    ) -> Self {
        Self {
            codec,
            blacklist,
            refresh_store,
            access_ttl: Duration::seconds(config.access_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_ttl_secs),
        }
    }

    /// 签发访问令牌
    pub fn issue_access_token(
        &self,
        subject_id: &str,
        email: &str,
        role: &str,
    ) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.access_ttl;

        let claims = AccessClaims {
            sub: subject_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = self.codec.sign(&claims)?;
        Ok(IssuedToken {
            token,
            token_id: claims.jti,
            expires_at,
        })
    }

    /// 验证访问令牌
    ///
    /// 签名错误、已过期、在黑名单中均返回 `None`，不向调用方抛错。
    pub async fn verify_access_token(&self, token: &str) -> Option<AccessClaims> {
        let claims: AccessClaims = self.codec.verify(token).ok()?;

        if self.blacklist.contains(&claims.jti).await {
            debug!(token_id = %claims.jti, "Access token is blacklisted");
            return None;
        }

        Some(claims)
    }

    /// 签发刷新令牌并登记到存储
    pub async fn issue_refresh_token(
        &self,
        subject_id: &str,
        device: &DeviceInfo,
    ) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.refresh_ttl;

        let claims = RefreshClaims {
            sub: subject_id.to_string(),
            device: device.fingerprint.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = self.codec.sign(&claims)?;
        self.refresh_store
            .insert(
                claims.jti.clone(),
                subject_id.to_string(),
                device.fingerprint.clone(),
            )
            .await;

        Ok(IssuedToken {
            token,
            token_id: claims.jti,
            expires_at,
        })
    }

    /// 验证刷新令牌
    ///
    /// 签名 + 过期校验通过后仍需查表：不在表中或已吊销均无效。
    pub async fn verify_refresh_token(&self, token: &str) -> Option<RefreshGrant> {
        let claims: RefreshClaims = self.codec.verify(token).ok()?;

        let record = self.refresh_store.get(&claims.jti).await?;
        if record.revoked {
            debug!(token_id = %claims.jti, "Refresh token is revoked");
            return None;
        }

        Some(RefreshGrant {
            subject_id: record.subject_id,
            device_fingerprint: record.device_fingerprint,
        })
    }

    /// 用有效的刷新令牌换发新的访问令牌
    ///
    /// 刷新令牌无效时返回 `Ok(None)`；签发失败（配置类错误）才返回 `Err`。
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
        email: &str,
        role: &str,
    ) -> Result<Option<IssuedToken>> {
        let grant = match self.verify_refresh_token(refresh_token).await {
            Some(grant) => grant,
            None => return Ok(None),
        };

        let issued = self.issue_access_token(&grant.subject_id, email, role)?;
        Ok(Some(issued))
    }

    /// 将访问令牌拉入黑名单（幂等）
    ///
    /// 入参可以是完整令牌或令牌 ID。完整令牌会解码出原始过期时间；
    /// 无法解码时按令牌 ID 处理，过期时间取保守上限 now + access_ttl。
    pub async fn blacklist_token(&self, token_or_id: &str, subject_id: &str, reason: &str) -> bool {
        let (token_id, expires_at) = match self.codec.decode_unverified::<AccessClaims>(token_or_id)
        {
            Ok(claims) => {
                let expiry = DateTime::from_timestamp(claims.exp, 0)
                    .unwrap_or_else(|| Utc::now() + self.access_ttl);
                (claims.jti, expiry)
            }
            Err(_) => (token_or_id.to_string(), Utc::now() + self.access_ttl),
        };

        let inserted = self
            .blacklist
            .insert(
                token_id.clone(),
                BlacklistEntry {
                    subject_id: subject_id.to_string(),
                    reason: reason.to_string(),
                    revoked_at: Utc::now(),
                    expires_at,
                },
            )
            .await;

        if inserted {
            info!(token_id = %token_id, subject_id = subject_id, reason = reason, "Access token blacklisted");
        }
        inserted
    }

    /// 吊销单个刷新令牌（幂等）
    pub async fn revoke_refresh_token(&self, token_id: &str) -> bool {
        let revoked = self.refresh_store.revoke(token_id).await;
        if revoked {
            info!(token_id = token_id, "Refresh token revoked");
        }
        revoked
    }

    /// 吊销某个用户的全部刷新令牌，返回新吊销数量
    pub async fn revoke_all_for_subject(&self, subject_id: &str) -> usize {
        let revoked = self.refresh_store.revoke_all_for_subject(subject_id).await;
        if revoked > 0 {
            info!(subject_id = subject_id, revoked = revoked, "All refresh tokens revoked");
        }
        revoked
    }
}

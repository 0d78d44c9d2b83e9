use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use warden_core::{Result, WardenError};

/// 访问令牌 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,   // 用户 ID
    pub email: String, // 邮箱
    pub role: String,  // 角色
    pub iat: i64,      // 签发时间
    pub exp: i64,      // 过期时间
    pub jti: String,   // 令牌 ID
}

/// 刷新令牌 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,    // 用户 ID
    pub device: String, // 设备指纹
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// JWT 编解码器（HS256 签名能力）
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    /// 创建编解码器。过期校验不留余量，到期即失效。
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(WardenError::Config("jwt secret must not be empty".into()));
        }

        let mut validation = Validation::default();
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// 签名 Claims
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| WardenError::Auth(format!("token signing failed: {}", e)))
    }

    /// 验证并解码（签名 + 过期）
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let data = decode::<T>(token, &self.decoding, &self.validation)
            .map_err(|e| WardenError::Auth(format!("token verification failed: {}", e)))?;
        Ok(data.claims)
    }

    /// 不验证签名和过期，仅解码 Claims
    ///
    /// 只用于黑名单登记时找回原始过期时间，不得用于认证判断。
    pub fn decode_unverified<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<T>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| WardenError::Auth(format!("token decode failed: {}", e)))?;
        Ok(data.claims)
    }
}

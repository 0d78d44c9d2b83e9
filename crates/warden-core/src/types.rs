use serde::{Deserialize, Serialize};

/// 设备信息（由认证入口采集，绑定到会话和刷新令牌）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// 设备指纹
    pub fingerprint: String,

    /// User-Agent
    pub user_agent: String,
}

impl DeviceInfo {
    pub fn new(fingerprint: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            user_agent: user_agent.into(),
        }
    }
}

/// 请求上下文
///
/// 由 HTTP 层构造后传入，核心不依赖任何具体的请求类型。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub ip: String,
    pub user_agent: String,
    pub method: String,
}

impl RequestContext {
    pub fn new(
        ip: impl Into<String>,
        user_agent: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.into(),
            method: method.into(),
        }
    }
}

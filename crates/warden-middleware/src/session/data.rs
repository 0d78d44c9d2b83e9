use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::DeviceInfo;

/// 会话记录
///
/// 绑定用户、设备来源和一对令牌 ID。会话状态与令牌自身的有效性
/// 相互独立：吊销令牌会在下一次校验时使会话失效，反之亦然。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// 会话 ID
    pub session_id: String,

    /// 用户 ID
    pub subject_id: String,

    /// 设备信息
    pub device: DeviceInfo,

    /// 来源 IP
    pub ip: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 最后活跃时间
    pub last_active: DateTime<Utc>,

    /// 是否活跃。失效是终态，不会恢复为 true。
    pub is_active: bool,

    /// 关联的访问令牌 ID
    pub access_token_id: String,

    /// 关联的刷新令牌 ID
    pub refresh_token_id: String,
}

impl Session {
    /// 创建新的会话记录
    pub fn new(
        subject_id: String,
        device: DeviceInfo,
        ip: String,
        access_token_id: String,
        refresh_token_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            subject_id,
            device,
            ip,
            created_at: now,
            last_active: now,
            is_active: true,
            access_token_id,
            refresh_token_id,
        }
    }

    /// 更新最后活跃时间
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// 检查是否空闲超过给定秒数
    pub fn idle_longer_than(&self, idle_secs: i64) -> bool {
        let idle = Utc::now().signed_duration_since(self.last_active);
        idle.num_seconds() > idle_secs
    }
}

use std::collections::{HashMap, HashSet};

/// 权限常量
pub mod permissions {
    pub const USER_READ: &str = "user:read";
    pub const USER_WRITE: &str = "user:write";
    pub const USER_READ_ALL: &str = "user:read_all";
    pub const USER_DELETE: &str = "user:delete";
    pub const SESSION_MANAGE: &str = "session:manage";
    pub const AUDIT_READ: &str = "audit:read";
    pub const ADMIN_DASHBOARD: &str = "admin:dashboard";
}

/// 基于角色的权限引擎
///
/// 角色 → 权限集合的映射在构造时固定，此后只读，无需加锁。
/// 未知角色映射到空集合，所有检查按拒绝处理。
pub struct PermissionEngine {
    roles: HashMap<String, HashSet<String>>,
}

impl Default for PermissionEngine {
    fn default() -> Self {
        use permissions::*;

        let mut roles = HashMap::new();

        roles.insert(
            "admin".to_string(),
            [
                USER_READ,
                USER_WRITE,
                USER_READ_ALL,
                USER_DELETE,
                SESSION_MANAGE,
                AUDIT_READ,
                ADMIN_DASHBOARD,
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        );

        roles.insert(
            "moderator".to_string(),
            [USER_READ, USER_WRITE, USER_READ_ALL, SESSION_MANAGE, AUDIT_READ]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        );

        roles.insert(
            "user".to_string(),
            [USER_READ, USER_WRITE].iter().map(|p| p.to_string()).collect(),
        );

        Self { roles }
    }
}

impl PermissionEngine {
    /// 用自定义角色表构造
    pub fn new(roles: HashMap<String, HashSet<String>>) -> Self {
        Self { roles }
    }

    /// 检查角色是否持有权限
    pub fn has_permission(&self, role: &str, permission: &str) -> bool {
        self.roles
            .get(role)
            .map(|set| set.contains(permission))
            .unwrap_or(false)
    }

    /// 检查角色是否持有任意一个权限
    pub fn has_any_permission(&self, role: &str, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(role, p))
    }

    /// 检查角色是否持有全部权限
    pub fn has_all_permissions(&self, role: &str, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(role, p))
    }

    /// 检查是否可以访问目标用户的资料
    ///
    /// 持有全量读权限的角色可以访问任何用户；否则只能访问自己。
    pub fn can_access_user(&self, role: &str, requesting_id: &str, target_id: &str) -> bool {
        if self.has_permission(role, permissions::USER_READ_ALL) {
            return true;
        }
        requesting_id == target_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_all_permissions() {
        let engine = PermissionEngine::default();

        assert!(engine.has_permission("admin", permissions::USER_READ_ALL));
        assert!(engine.has_permission("admin", permissions::ADMIN_DASHBOARD));
        assert!(engine.has_all_permissions(
            "admin",
            &[permissions::USER_READ, permissions::USER_DELETE, permissions::AUDIT_READ]
        ));
    }

    #[test]
    fn test_user_is_limited() {
        let engine = PermissionEngine::default();

        assert!(engine.has_permission("user", permissions::USER_READ));
        assert!(!engine.has_permission("user", permissions::USER_READ_ALL));
        assert!(engine.has_any_permission(
            "user",
            &[permissions::ADMIN_DASHBOARD, permissions::USER_WRITE]
        ));
        assert!(!engine.has_all_permissions(
            "user",
            &[permissions::USER_READ, permissions::ADMIN_DASHBOARD]
        ));
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        let engine = PermissionEngine::default();

        assert!(!engine.has_permission("usuario", permissions::USER_READ));
        assert!(!engine.has_any_permission("usuario", &[permissions::USER_READ]));
        // 空权限列表：has_all 对空集为真，has_any 为假
        assert!(engine.has_all_permissions("usuario", &[]));
        assert!(!engine.has_any_permission("usuario", &[]));
    }

    #[test]
    fn test_can_access_user() {
        let engine = PermissionEngine::default();

        // 管理员可以访问任何用户
        assert!(engine.can_access_user("admin", "1", "2"));

        // 未知角色只能访问自己
        assert!(engine.can_access_user("usuario", "10", "10"));
        assert!(!engine.can_access_user("usuario", "10", "11"));

        // 普通用户同样只能访问自己
        assert!(engine.can_access_user("user", "7", "7"));
        assert!(!engine.can_access_user("user", "7", "8"));
    }
}

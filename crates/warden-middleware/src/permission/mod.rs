pub mod rbac;

pub use rbac::{permissions, PermissionEngine};

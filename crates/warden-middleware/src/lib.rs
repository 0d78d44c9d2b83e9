pub mod audit;
pub mod config;
pub mod middleware;
pub mod permission;
pub mod ratelimit;
pub mod session;
pub mod token;

pub use audit::{AuditAction, AuditEntry, AuditLogger, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use config::{AuthConfig, ConfigLoader, JwtConfig, PolicyOverride, SessionConfig};
pub use middleware::{auth_middleware, rate_limit_middleware, require_permission};
pub use permission::{permissions, PermissionEngine};
pub use ratelimit::{
    ActionPolicies, ActionRateLimiter, LimitDecision, RateLimitPolicy, RateLimitResult, RateLimiter,
};
pub use session::{
    CreatedSession, MemorySessionStore, Session, SessionManager, SessionStats, SessionStore,
};
pub use token::{
    AccessClaims, IssuedToken, JwtCodec, RefreshClaims, RefreshGrant, RefreshTokenStore,
    TokenBlacklist, TokenManager,
};

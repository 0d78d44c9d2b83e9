pub mod blacklist;
pub mod jwt;
pub mod manager;
pub mod store;

pub use blacklist::{BlacklistEntry, TokenBlacklist};
pub use jwt::{AccessClaims, JwtCodec, RefreshClaims};
pub use manager::{IssuedToken, RefreshGrant, TokenManager};
pub use store::{RefreshTokenRecord, RefreshTokenStore};

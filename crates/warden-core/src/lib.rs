pub mod error;
pub mod traits;
pub mod types;

pub use error::{Result, WardenError};
pub use traits::repository::{UserRepository, UserSummary};
pub use types::{DeviceInfo, RequestContext};

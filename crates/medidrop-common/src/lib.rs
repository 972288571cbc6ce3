pub mod errors;
pub mod id;
pub mod time;

pub use errors::{ConfigError, MedidropError};
pub use id::{new_id, SessionId};
pub use time::{format_timestamp, now, parse_timestamp};

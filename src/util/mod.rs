pub mod checksum;
pub mod layout;
pub mod uuid;

pub use self::uuid::*;

pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod install;
pub mod interface;
pub mod model;
pub mod storage;
pub mod util;

pub use config::Config;
pub use db::{Directory, ReconcilePlan};
pub use error::{IdentityError, ReconcileError};
pub use index::{birthday_bound, Collision, IdentityIndex};
pub use model::*;
pub use util::{
    derive_identifier, derive_identifier_checked, derive_legacy, derive_v5, is_legacy_shaped,
    Mapper, DEFAULT_NAMESPACE,
};

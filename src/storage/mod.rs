pub mod patches;
pub mod profiles;

pub use patches::*;
pub use profiles::*;

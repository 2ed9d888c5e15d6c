pub mod group_layout;

pub use group_layout::*;

pub mod class;
pub mod common;
pub mod instructor;
pub mod organization;

pub use class::*;
pub use common::*;
pub use instructor::*;
pub use organization::*;

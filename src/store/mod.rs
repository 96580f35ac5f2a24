pub mod codec;
pub mod firestore;
pub mod memory;
pub mod traits;

pub use firestore::*;
pub use memory::*;
pub use traits::*;

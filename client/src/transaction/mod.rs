pub mod builder;
pub mod error;
pub mod fee;
pub mod signer;
pub mod transfer;

pub use builder::*;
pub use error::*;
pub use fee::*;
pub use signer::*;
pub use transfer::*;

pub mod consts;
pub mod error;
pub mod types;
pub mod utils;

pub use consts::*;
pub use error::*;
pub use types::*;
pub use utils::*;

pub mod eligibility;
pub mod error;
pub mod schedule;
pub mod store;
pub mod sync;

pub use eligibility::*;
pub use error::*;
pub use schedule::*;
pub use store::*;
pub use sync::*;

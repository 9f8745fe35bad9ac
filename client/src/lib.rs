pub mod node;
pub mod pagination;
pub mod session;
pub mod transaction;

pub use node::*;
pub use pagination::*;
pub use session::*;
pub use transaction::*;

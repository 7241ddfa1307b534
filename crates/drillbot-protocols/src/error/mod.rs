//! Error types for the drillbot protocol layer.

mod page;
mod quota;
mod solver;
mod store;
mod transport;

pub use page::*;
pub use quota::*;
pub use solver::*;
pub use store::*;
pub use transport::*;

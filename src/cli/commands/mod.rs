pub mod enrich;
pub mod extract;

pub use enrich::*;
pub use extract::*;

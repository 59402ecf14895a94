//! CLI command implementations

pub mod check;
pub mod send;
pub mod serve;

pub use check::execute as check;
pub use send::execute as send;
pub use serve::execute as serve;

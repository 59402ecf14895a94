//! Deduplication cache for submitted commands
//!
//! Tracks which command keys are running or ran recently so the intake loop
//! can skip duplicates. Entries carry no payload; presence is the marker.
//!
//! # Delete Modes
//!
//! | Mode | TTL | Removed on release |
//! |------|-----|--------------------|
//! | `expire` | yes | no |
//! | `complete` | no | yes |
//! | `expire_complete` | yes | yes (whichever comes first) |
//!
//! Keys matching an exclude pattern are never stored.

pub mod dedup;
pub mod mode;

pub use dedup::DedupCache;
pub use mode::DeleteMode;

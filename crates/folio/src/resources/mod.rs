//! Concrete resources wired onto the generic client and engine
//!
//! - `records` - diary entries, page-based, favorite flag
//! - `drive` - remote drive files, token-based, starred flag

pub mod drive;
pub mod records;

pub use drive::{DriveFile, drive_client, drive_engine, starred_field, toggle_starred};
pub use records::{DiaryRecord, favorite_field, records_client, records_engine, toggle_favorite};

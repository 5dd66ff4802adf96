#![warn(missing_docs)]
//! Core library entry points for loading and inspecting documentation search indexes.

pub mod controls;
pub mod location;
pub mod manifest;
pub mod outline;
pub mod output;
pub mod store;

pub use controls::{Cli, OutputFormat, OutputOptions};
pub use index_parser::{Category, IndexRecord, MalformedRecordError};
pub use location::Location;
pub use manifest::IndexManifest;
pub use outline::{outline, PageOutline};
pub use output::{select_records, write_outline, write_store};
pub use store::{IndexRecordStore, StoreError};

#[cfg(feature = "debug_logs")]
#[macro_export]
// This allows use of the `eprintln!` macro via `debug_log!` macro.
macro_rules! debug_log {
        ($($arg:tt)*) => {
            eprintln!($($arg)*);
        };
    }
#[cfg(not(feature = "debug_logs"))]
#[macro_export]
// This effectively disables the `eprintln!` macro, effectively removing it from the code during
// compilation.
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

//! Storage abstraction layer.
//!
//! An index lives in one [`Storage`]: a flat namespace of files with atomic
//! rename. [`FileStorage`] backs it with a directory, [`MemoryStorage`] keeps
//! everything in process. [`structured`] provides the checksummed binary
//! reader and writer used for segment files.

pub mod file;
pub mod memory;
pub mod structured;
pub mod traits;

// Re-export commonly used types
pub use file::*;
pub use memory::*;
pub use structured::*;
pub use traits::*;

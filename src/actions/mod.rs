//! File actions on scan results.
//!
//! The [`delete`] module removes the redundant copies of each duplicate
//! cluster, keeping the first file:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (explicit `--permanent`)
//! - Dry run that only reports
//!
//! ```no_run
//! use distinctpics::actions::{delete_duplicates, DeleteConfig};
//!
//! let result = delete_duplicates(&[], &DeleteConfig::trash());
//! assert_eq!(result.success_count(), 0);
//! ```

pub mod delete;

pub use delete::{
    delete_duplicates, delete_file, validate_preserves_copy, BatchDeleteResult, DeleteConfig,
    DeleteError, DeleteMode, DeleteResult,
};

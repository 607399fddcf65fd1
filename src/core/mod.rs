pub mod conflict;
pub mod engine;
pub mod file_types;
pub mod models;
pub mod resolver;
pub mod scanner;
pub mod transfer;

pub use conflict::{generate_conflict_name, resolve_collision};
pub use engine::SortEngine;
pub use models::{
    DateSource, OperationMode, RunEvent, RunStatus, SortReport, SortSpec, Structure,
    TransferResult,
};
pub use resolver::{PathResolver, Resolution};
pub use scanner::{FileScanner, ScanConfig, ScanOutcome};
pub use transfer::TransferExecutor;

//! papergraph-common: Wire models, errors, and helpers shared by the Papergraph crates.

pub mod error;
pub mod mask;
pub mod models;

// Re-export commonly used types
pub use error::{PapergraphError, Result};
pub use models::{
    Ack, BackendConfig, CollectedPaper, ConfigUpdate, ExtractionStatus, GraphStats,
    OpenAiSettings, OpenAiUpdate, Paper, QueryAnswer, QueryMode, SearchPage, SearchRequest,
    SortBy, SystemSettings, SystemStatus, SystemUpdate, TaskKind, TaskStarted, TaskState,
    TaskStatus,
};

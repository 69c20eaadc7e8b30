//! Prelude module - common imports for duke-relay users
//!
//! ```rust
//! use duke_relay::prelude::*;
//! ```

pub use crate::{
    table,
    CellValue,
    // Credentials and clients
    CredentialSource,
    DriveClient,
    // Workflow types
    ExportFormat,
    ExportRequest,
    FileStore,
    FileTarget,
    SheetsClient,
    // Errors
    StoreError,
    TableRows,
    TableStore,
    Transform,
    TransformError,
    TransformRegistry,
    ValueInputMode,
    Workflow,
    WorkflowError,
    WorkflowOptions,
    WorkflowResult,
};

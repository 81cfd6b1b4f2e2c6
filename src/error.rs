//! Error types for form validation, the bubble registry, persistence
//! and GPU setup.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task name is empty")]
    EmptyName,

    #[error("invalid due date {0:?} (expected YYYY-MM-DD)")]
    InvalidDueDate(String),

    #[error("invalid priority {0:?}")]
    InvalidPriority(String),

    #[error("priority {0} out of range (1-5)")]
    PriorityOutOfRange(i64),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("too many bubbles (limit {0})")]
    Full(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GazetteerError {
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] crate::hierarchy::HierarchyError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GazetteerError>;

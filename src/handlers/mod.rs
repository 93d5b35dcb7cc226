pub mod auth;
pub mod patients;
pub mod records;
pub mod report;

use crate::error::LabdeskError;

/// Run CPU-bound work (bcrypt, PDF assembly) off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, LabdeskError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LabdeskError::Io(std::io::Error::other(e)))
}

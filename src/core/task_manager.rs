/// Spawn a task that returns a Result, logging the error if it fails
pub fn spawn_logged_task<F>(name: &'static str, future: F) -> tokio::task::JoinHandle<()>
where
    F: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::task::spawn(async move {
        match future.await {
            Ok(()) => log::info!("{name} task finished"),
            Err(err) => log::error!("{name} task failed: {err:#}"),
        }
    })
}

/// Run blocking work (file reads) off the async worker threads
pub fn spawn_blocking_task<F, R>(func: F) -> tokio::task::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(func)
}

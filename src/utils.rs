use once_cell::sync::Lazy;
use std::future::Future;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

/// Runs `fut` on the tokio runtime and hands its output to `on_done` on the
/// GTK main loop.
pub fn run_async_to_main<T, Fut, F>(fut: Fut, on_done: F)
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    F: FnOnce(T) + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel::<T>();
    RUNTIME.spawn(async move {
        let _ = tx.send(fut.await);
    });
    glib::MainContext::default().spawn_local(async move {
        match rx.await {
            Ok(value) => on_done(value),
            Err(_) => log::error!("Background task dropped before completing"),
        }
    });
}

//! Deferred view factories and their memoized, single-flight cache

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Produces a view implementation on demand
///
/// Implementations typically fetch code or assets. The result is cached by
/// [`LazyView`], so `load` is called at most once per successful load.
#[async_trait]
pub trait ViewLoader<V>: Send + Sync {
    async fn load(&self) -> anyhow::Result<V>;
}

/// Adapts an async closure into a [`ViewLoader`]
pub struct FnLoader<F>(F);

#[async_trait]
impl<V, F, Fut> ViewLoader<V> for FnLoader<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    V: Send + 'static,
{
    async fn load(&self) -> anyhow::Result<V> {
        (self.0)().await
    }
}

/// Wraps an async closure as a shareable loader
///
/// ```
/// use devroute_router::loader_fn;
///
/// let loader = loader_fn(|| async { Ok::<_, anyhow::Error>("devices-view") });
/// # let _ = loader;
/// ```
pub fn loader_fn<V, F, Fut>(f: F) -> Arc<dyn ViewLoader<V>>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    V: Send + 'static,
{
    Arc::new(FnLoader(f))
}

/// A loader whose first successful result is kept for the lifetime of the table
///
/// Concurrent callers share one in-flight load. A failed load leaves the
/// slot empty, so the next caller starts a fresh attempt.
pub struct LazyView<V> {
    view_id: String,
    loader: Arc<dyn ViewLoader<V>>,
    cell: OnceCell<V>,
    loads: AtomicUsize,
}

impl<V> LazyView<V> {
    pub fn new(view_id: impl Into<String>, loader: Arc<dyn ViewLoader<V>>) -> Self {
        Self {
            view_id: view_id.into(),
            loader,
            cell: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    /// Returns the cached view, loading it first if needed
    pub async fn get(&self) -> anyhow::Result<&V> {
        if let Some(view) = self.cell.get() {
            return Ok(view);
        }

        self.cell
            .get_or_try_init(|| async {
                let attempt = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(view = %self.view_id, attempt, "loading view");

                match self.loader.load().await {
                    Ok(view) => {
                        debug!(view = %self.view_id, "view loaded");
                        Ok(view)
                    }
                    Err(err) => {
                        let error = format!("{:#}", err);
                        warn!(view = %self.view_id, error = %error, "view load failed");
                        Err(err)
                    }
                }
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Number of times the underlying loader has been invoked
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl<V> fmt::Debug for LazyView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyView")
            .field("view_id", &self.view_id)
            .field("loaded", &self.is_loaded())
            .field("loads", &self.load_count())
            .finish()
    }
}

/// Maps view identifiers used in declarations to their loaders
pub struct ViewRegistry<V> {
    loaders: HashMap<String, Arc<dyn ViewLoader<V>>>,
}

impl<V> ViewRegistry<V> {
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Registers a loader (builder style)
    pub fn with_view(mut self, view_id: impl Into<String>, loader: Arc<dyn ViewLoader<V>>) -> Self {
        self.register(view_id, loader);
        self
    }

    pub fn register(&mut self, view_id: impl Into<String>, loader: Arc<dyn ViewLoader<V>>) {
        self.loaders.insert(view_id.into(), loader);
    }

    pub fn get(&self, view_id: &str) -> Option<Arc<dyn ViewLoader<V>>> {
        self.loaders.get(view_id).cloned()
    }

    pub fn contains(&self, view_id: &str) -> bool {
        self.loaders.contains_key(view_id)
    }

    pub fn view_ids(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }
}

impl<V> Default for ViewRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

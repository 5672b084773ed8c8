//! In-flight request de-duplication
//!
//! At most one generation runs per key. A caller arriving while a generation
//! for its key is running awaits the same shared result instead of starting
//! another. The generation runs on its own task, so it completes even if the
//! caller that started it goes away, and that task removes its own entry
//! once it settles.

use futures::future::{BoxFuture, FutureExt, Shared};
use gallery_common::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

type SharedGeneration<T> = Shared<BoxFuture<'static, Result<T>>>;

struct Running<T> {
    id: u64,
    generation: SharedGeneration<T>,
}

type RunningMap<T> = Arc<Mutex<HashMap<String, Running<T>>>>;

/// Map from request key to the generation currently running for it
pub struct InflightRequests<T: Clone> {
    running: RunningMap<T>,
    next_id: AtomicU64,
}

impl<T: Clone> Default for InflightRequests<T> {
    fn default() -> Self {
        Self {
            running: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<T> InflightRequests<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Await the generation for `key`, starting it with `start` if none is running
    pub async fn run<F>(&self, key: &str, start: F) -> Result<T>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T>>,
    {
        let (id, generation) = {
            let mut running = self.running.lock().await;
            match running.get(key) {
                Some(existing) => {
                    debug!(key, "Joining in-flight generation");
                    (existing.id, existing.generation.clone())
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let work = start();
                    let map = self.running.clone();
                    let owned_key = key.to_string();
                    // The insert below happens under the lock this task needs,
                    // so the entry always exists before the task can remove it.
                    let task = tokio::spawn(async move {
                        let result = work.await;
                        remove_entry(&map, &owned_key, id).await;
                        result
                    });
                    let generation = async move {
                        task.await.unwrap_or_else(|e| {
                            Err(Error::Internal(format!("generation task failed: {}", e)))
                        })
                    }
                    .boxed()
                    .shared();
                    running.insert(
                        key.to_string(),
                        Running {
                            id,
                            generation: generation.clone(),
                        },
                    );
                    (id, generation)
                }
            }
        };

        let result = generation.await;

        // A panicked task never reaches its own cleanup
        if result.is_err() {
            remove_entry(&self.running, key, id).await;
        }
        result
    }

    /// Number of keys with a running generation
    pub async fn len(&self) -> usize {
        self.running.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.running.lock().await.is_empty()
    }
}

async fn remove_entry<T>(running: &Mutex<HashMap<String, Running<T>>>, key: &str, id: u64) {
    let mut running = running.lock().await;
    if running.get(key).is_some_and(|r| r.id == id) {
        running.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counted(counter: Arc<AtomicUsize>, value: u32) -> BoxFuture<'static, Result<u32>> {
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(value)
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_generation() {
        let inflight = InflightRequests::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            inflight.run("k", || counted(counter.clone(), 1)),
            inflight.run("k", || counted(counter.clone(), 2)),
        );

        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(inflight.is_empty().await);
    }

    #[tokio::test]
    async fn test_sequential_callers_generate_again() {
        let inflight = InflightRequests::new();
        let counter = Arc::new(AtomicUsize::new(0));

        inflight.run("k", || counted(counter.clone(), 1)).await.unwrap();
        inflight.run("k", || counted(counter.clone(), 1)).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter() {
        let inflight: InflightRequests<u32> = InflightRequests::new();
        let fail = || {
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<u32, _>(Error::Upstream("cms down".to_string()))
            }
            .boxed()
        };

        let (a, b) = tokio::join!(inflight.run("k", fail), inflight.run("k", fail));
        assert_eq!(a.unwrap_err().code(), "UPSTREAM_ERROR");
        assert_eq!(b.unwrap_err().code(), "UPSTREAM_ERROR");
        assert!(inflight.is_empty().await);
    }

    #[tokio::test]
    async fn test_abandoned_generation_clears_its_entry() {
        let inflight = InflightRequests::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(5),
            inflight.run("k", || counted(counter.clone(), 1)),
        )
        .await;
        assert!(abandoned.is_err());

        // The spawned generation still finishes and removes its entry
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(inflight.is_empty().await);

        let value = inflight.run("k", || counted(counter.clone(), 2)).await.unwrap();
        assert_eq!(value, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_abandoned_failure_is_not_replayed() {
        let inflight: InflightRequests<u32> = InflightRequests::new();
        let fail = || {
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err::<u32, _>(Error::Upstream("cms down".to_string()))
            }
            .boxed()
        };

        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), inflight.run("k", fail)).await;
        assert!(abandoned.is_err());
        tokio::time::sleep(Duration::from_millis(60)).await;

        let value = inflight.run("k", || async { Ok(7) }.boxed()).await.unwrap();
        assert_eq!(value, 7);
    }
}

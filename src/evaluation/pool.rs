//! Fixed-size worker pool.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// A `rayon` thread pool of fixed size, or the calling thread when the pool
/// is a single worker or could not be created.
///
/// Results of [`map_ordered`](WorkerPool::map_ordered) always follow input
/// order, whichever worker finishes first.
#[derive(Debug)]
pub struct WorkerPool {
    pool: Option<ThreadPool>,
    workers: usize,
    warning: Option<String>,
}

impl WorkerPool {
    /// Creates a pool of `workers` threads.
    ///
    /// One worker means sequential in-process execution. If the threads
    /// cannot be spawned the pool degrades to sequential execution and
    /// records a warning instead of failing.
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        if workers == 1 {
            return Self::sequential();
        }
        match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("siteplan-worker-{i}"))
            .build()
        {
            Ok(pool) => Self {
                pool: Some(pool),
                workers,
                warning: None,
            },
            Err(err) => {
                let warning =
                    format!("could not start {workers} workers ({err}); evaluating sequentially");
                log::warn!("{warning}");
                Self {
                    pool: None,
                    workers: 1,
                    warning: Some(warning),
                }
            }
        }
    }

    /// Executes everything on the calling thread.
    pub fn sequential() -> Self {
        Self {
            pool: None,
            workers: 1,
            warning: None,
        }
    }

    /// Number of workers actually in use.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Set when the requested pool could not be created.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Applies `f` to every item, splitting the slice into one contiguous
    /// chunk per worker. Output order equals input order.
    pub fn map_ordered<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) if items.len() > 1 => {
                let chunk = items.len().div_ceil(self.workers).max(1);
                pool.install(|| items.par_iter().with_min_len(chunk).map(&f).collect())
            }
            _ => items.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_worker_is_sequential() {
        let pool = WorkerPool::new(1);
        assert!(!pool.is_parallel());
        assert_eq!(pool.workers(), 1);
        assert!(pool.warning().is_none());
    }

    #[test]
    fn test_map_preserves_order() {
        let pool = WorkerPool::new(4);
        let items: Vec<u64> = (0..257).collect();
        let out = pool.map_ordered(&items, |&x| {
            // uneven work so workers finish out of order
            let spin = (x % 7) * 1000;
            let mut acc = 0u64;
            for i in 0..spin {
                acc = acc.wrapping_add(i);
            }
            x * 2 + (acc & 0)
        });
        assert_eq!(out, items.iter().map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input() {
        let pool = WorkerPool::new(3);
        let out: Vec<u8> = pool.map_ordered(&Vec::<u8>::new(), |&x| x);
        assert!(out.is_empty());
    }
}

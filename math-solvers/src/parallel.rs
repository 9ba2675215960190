//! Parallel utilities with feature-gated implementations
//!
//! Provides a bounded worker pool over contiguous chunks of a pre-sized
//! output buffer, backed by rayon when the `parallel` feature is on and
//! falling back to sequential execution otherwise.

use thiserror::Error;

/// Errors from worker pool construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParallelError {
    #[error("failed to build worker pool with {threads} threads: {reason}")]
    PoolBuild { threads: usize, reason: String },
}

/// Check if parallel processing is available
#[cfg(feature = "parallel")]
pub fn is_parallel_available() -> bool {
    true
}

/// Check if parallel processing is available
#[cfg(not(feature = "parallel"))]
pub fn is_parallel_available() -> bool {
    false
}

/// Parallel evaluation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Enable parallel evaluation
    pub enabled: bool,
    /// Number of threads to use (None = use rayon default)
    pub num_threads: Option<usize>,
    /// Rows per chunk handed to one worker
    pub chunk_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            num_threads: None,
            chunk_size: 16,
        }
    }
}

/// Fill `buffer` chunk by chunk on the calling thread
///
/// `f` receives the offset of the chunk in `buffer` and the chunk itself.
pub fn fill_chunks_sequential<T, F>(buffer: &mut [T], chunk_size: usize, f: F)
where
    F: Fn(usize, &mut [T]),
{
    let chunk_size = chunk_size.max(1);
    for (index, chunk) in buffer.chunks_mut(chunk_size).enumerate() {
        f(index * chunk_size, chunk);
    }
}

/// A dedicated pool of workers for chunked evaluation
///
/// The pool is private to its owner, so batch work never competes with
/// rayon's global pool.
pub struct WorkerPool {
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
    threads: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

impl WorkerPool {
    /// Build a pool with `num_threads` workers (None = one per core)
    #[cfg(feature = "parallel")]
    pub fn new(num_threads: Option<usize>) -> Result<Self, ParallelError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = num_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().map_err(|e| ParallelError::PoolBuild {
            threads: num_threads.unwrap_or(0),
            reason: e.to_string(),
        })?;
        let threads = pool.current_num_threads();
        Ok(Self { pool, threads })
    }

    /// Build a pool; without the `parallel` feature work runs on the caller
    #[cfg(not(feature = "parallel"))]
    pub fn new(num_threads: Option<usize>) -> Result<Self, ParallelError> {
        Ok(Self {
            threads: num_threads.unwrap_or(1).max(1),
        })
    }

    /// Number of workers
    pub fn num_threads(&self) -> usize {
        self.threads
    }

    /// Fill `buffer` in contiguous chunks, one task per chunk
    ///
    /// Chunk boundaries are fixed by `chunk_size` alone, so the result does not
    /// depend on scheduling.
    #[cfg(feature = "parallel")]
    pub fn fill_chunks<T, F>(&self, buffer: &mut [T], chunk_size: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        use rayon::prelude::*;
        let chunk_size = chunk_size.max(1);
        self.pool.install(|| {
            buffer
                .par_chunks_mut(chunk_size)
                .enumerate()
                .for_each(|(index, chunk)| f(index * chunk_size, chunk));
        });
    }

    /// Sequential fallback
    #[cfg(not(feature = "parallel"))]
    pub fn fill_chunks<T, F>(&self, buffer: &mut [T], chunk_size: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        fill_chunks_sequential(buffer, chunk_size, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fill_chunks_sequential() {
        let mut out = vec![0usize; 10];
        fill_chunks_sequential(&mut out, 3, |offset, chunk| {
            for (i, slot) in chunk.iter_mut().enumerate() {
                *slot = (offset + i) * 2;
            }
        });
        assert_eq!(out, (0..10).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_pool_matches_sequential() {
        let pool = WorkerPool::new(Some(3)).expect("pool");
        let calls = AtomicUsize::new(0);
        let mut out = vec![0usize; 37];
        pool.fill_chunks(&mut out, 5, |offset, chunk| {
            calls.fetch_add(1, Ordering::SeqCst);
            for (i, slot) in chunk.iter_mut().enumerate() {
                *slot = (offset + i) * (offset + i);
            }
        });
        assert_eq!(out, (0..37).map(|i| i * i).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let pool = WorkerPool::new(Some(1)).expect("pool");
        let mut out = vec![0u8; 4];
        pool.fill_chunks(&mut out, 0, |_, chunk| chunk.fill(7));
        assert_eq!(out, vec![7; 4]);
        assert!(pool.num_threads() >= 1);
    }
}

//! Worker pool dispatch and result collection.
//!
//! The pool owns two queues: a closable multi-consumer job queue
//! (`async_channel`) and a result queue (`tokio::sync::mpsc`). Both are sized
//! to the number of links, so neither the dispatcher nor a worker ever waits
//! on the other to make room. The dispatcher spawns a fixed number of
//! workers, queues every link, closes the job queue and then reads exactly
//! one result per link in completion order.

use crate::types::PageResult;
use crate::worker::{JobSender, Worker};
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A fixed-size pool of fetch-and-count workers.
///
/// # Example
///
/// ```rust,no_run
/// use spinarak_lib::WorkerPool;
///
/// #[tokio::main]
/// async fn main() {
///     let pool = WorkerPool::new(reqwest::Client::new(), "rust", 4);
///     let links = vec!["https://www.rust-lang.org".to_string()];
///     for result in pool.run(&links).await {
///         println!("{}", result);
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct WorkerPool {
    client: reqwest::Client,
    word: Arc<str>,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool that counts `word` using `workers` concurrent workers.
    ///
    /// Callers are expected to reject a worker count of zero; the pool still
    /// runs with one worker in that case rather than never finishing.
    pub fn new(client: reqwest::Client, word: &str, workers: usize) -> Self {
        Self {
            client,
            word: Arc::from(word),
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process every link and return one result per link.
    ///
    /// Results are in completion order, not submission order. Duplicate links
    /// are processed (and reported) once per occurrence.
    pub async fn run(&self, links: &[String]) -> Vec<PageResult> {
        let expected = links.len();
        let mut stream = self.spawn(links);
        let mut results = Vec::with_capacity(expected);

        while let Some(result) = stream.next_result().await {
            results.push(result);
        }

        if results.len() < expected {
            warn!(
                expected,
                received = results.len(),
                "workers exited before every link was reported"
            );
        }
        info!(pages = results.len(), "worker pool finished");
        results
    }

    /// Start processing `links` and return a stream of results as they
    /// complete.
    ///
    /// All links are queued and the job queue closed before this returns.
    /// Must be called from within a Tokio runtime.
    pub fn spawn(&self, links: &[String]) -> ResultStream {
        let capacity = links.len().max(1);
        let (job_tx, job_rx) = async_channel::bounded(capacity);
        let (result_tx, result_rx) = mpsc::channel(capacity);

        if !links.is_empty() {
            info!(workers = self.workers, jobs = links.len(), "starting worker pool");

            for id in 0..self.workers {
                let worker = Worker {
                    id,
                    client: self.client.clone(),
                    word: Arc::clone(&self.word),
                    jobs: job_rx.clone(),
                    results: result_tx.clone(),
                };
                tokio::spawn(worker.run());
            }
        }

        // Only workers hold result senders from here on, so the stream ends
        // if they all go away early.
        drop(result_tx);
        drop(job_rx);

        submit_jobs(&job_tx, links);
        job_tx.close();

        ResultStream {
            receiver: result_rx,
            remaining: links.len(),
        }
    }
}

fn submit_jobs(jobs: &JobSender, links: &[String]) {
    for link in links {
        // Capacity equals the number of links, so the queue is never full.
        if let Err(e) = jobs.try_send(link.clone()) {
            warn!(link = %link, error = %e, "failed to queue link");
        }
    }
    debug!(queued = jobs.len(), "all jobs submitted");
}

/// Results of a running pool, yielded in completion order.
///
/// The stream ends after one result per submitted link.
#[derive(Debug)]
pub struct ResultStream {
    receiver: mpsc::Receiver<PageResult>,
    remaining: usize,
}

impl ResultStream {
    /// Results still expected.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Wait for the next result; `None` once every link has been reported.
    pub async fn next_result(&mut self) -> Option<PageResult> {
        if self.remaining == 0 {
            return None;
        }
        match self.receiver.recv().await {
            Some(result) => {
                self.remaining -= 1;
                Some(result)
            }
            None => {
                self.remaining = 0;
                None
            }
        }
    }
}

impl Stream for ResultStream {
    type Item = PageResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.remaining == 0 {
            return Poll::Ready(None);
        }
        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(result)) => {
                self.remaining -= 1;
                Poll::Ready(Some(result))
            }
            Poll::Ready(None) => {
                self.remaining = 0;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn bad_links(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("not a url {}", i)).collect()
    }

    #[test]
    fn test_zero_workers_becomes_one() {
        let pool = WorkerPool::new(reqwest::Client::new(), "cat", 0);
        assert_eq!(pool.workers(), 1);
    }

    #[tokio::test]
    async fn test_empty_links_returns_immediately() {
        let pool = WorkerPool::new(reqwest::Client::new(), "cat", 4);
        assert!(pool.run(&[]).await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_result_per_link() {
        let links = bad_links(25);
        let pool = WorkerPool::new(reqwest::Client::new(), "cat", 3);

        let results = pool.run(&links).await;
        assert_eq!(results.len(), links.len());

        let mut got: Vec<_> = results.iter().map(|r| r.link.clone()).collect();
        let mut want = links.clone();
        got.sort();
        want.sort();
        assert_eq!(got, want);
        assert!(results.iter().all(|r| r.error.is_some()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_more_workers_than_links() {
        let links = bad_links(2);
        let pool = WorkerPool::new(reqwest::Client::new(), "cat", 16);
        assert_eq!(pool.run(&links).await.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_links_each_reported() {
        let links = vec!["dup".to_string(), "dup".to_string(), "dup".to_string()];
        let pool = WorkerPool::new(reqwest::Client::new(), "cat", 2);
        let results = pool.run(&links).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.link == "dup"));
    }

    #[tokio::test]
    async fn test_stream_yields_exactly_n() {
        let links = bad_links(5);
        let pool = WorkerPool::new(reqwest::Client::new(), "cat", 2);

        let stream = pool.spawn(&links);
        assert_eq!(stream.remaining(), 5);
        let collected: Vec<_> = stream.collect().await;
        assert_eq!(collected.len(), 5);
    }
}

//! Fetch-and-count worker.
//!
//! A worker repeatedly claims a link from the shared job queue, performs one
//! GET, streams the body through the token counter and pushes exactly one
//! [`PageResult`] into the shared result queue. Every failure is converted
//! into a result at this boundary; nothing propagates out of the loop.

use crate::error::SpinarakError;
use crate::tokens::count_occurrences;
use crate::types::PageResult;
use futures_util::TryStreamExt;
use reqwest::StatusCode;
use std::io;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::debug;

/// Consumer end of the job queue shared by every worker.
pub type JobReceiver = async_channel::Receiver<String>;
/// Producer end of the job queue, held by the dispatcher.
pub type JobSender = async_channel::Sender<String>;
/// Producer end of the result queue, one clone per worker.
pub type ResultSender = tokio::sync::mpsc::Sender<PageResult>;

/// Everything a worker needs, handed over at spawn time.
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) client: reqwest::Client,
    pub(crate) word: Arc<str>,
    pub(crate) jobs: JobReceiver,
    pub(crate) results: ResultSender,
}

impl Worker {
    /// Process jobs until the queue is closed and drained.
    pub(crate) async fn run(self) {
        let mut processed = 0usize;

        while let Ok(link) = self.jobs.recv().await {
            debug!(worker = self.id, link = %link, "claimed job");
            let result = fetch_and_count(&self.client, &self.word, &link).await;
            processed += 1;

            if self.results.send(result).await.is_err() {
                debug!(worker = self.id, "result receiver dropped, stopping");
                break;
            }
        }

        debug!(worker = self.id, processed, "worker finished");
    }
}

/// Fetch one page and count `word` in its body.
///
/// One GET attempt is made; there are no retries. Transport failures map to
/// [`SpinarakError::FetchError`], any status other than 200 to
/// [`SpinarakError::UnexpectedStatus`].
pub async fn fetch_and_count(client: &reqwest::Client, word: &str, link: &str) -> PageResult {
    let response = match client.get(link).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!(link, error = %e, "fetch failed");
            return PageResult::failed(link, SpinarakError::fetch(link, e.to_string()));
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        debug!(link, status = status.as_u16(), "unexpected status");
        return PageResult::failed(link, SpinarakError::unexpected_status(link, status.as_u16()));
    }

    let body = StreamReader::new(
        response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e)),
    );
    tokio::pin!(body);

    count_body(link, word, body).await
}

/// Run the token counter over a body and package the outcome.
pub(crate) async fn count_body<R>(link: &str, word: &str, body: R) -> PageResult
where
    R: AsyncRead + Unpin,
{
    match count_occurrences(word, body).await {
        (count, None) => {
            debug!(link, count, "page counted");
            PageResult::counted(link, count)
        }
        (count, Some(e)) => {
            debug!(link, count, error = %e, "body read failed");
            PageResult::partial(link, count, SpinarakError::scan(link, e.to_string()))
        }
    }
}

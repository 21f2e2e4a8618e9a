//! Whitespace tokenizer and exact-match counter.
//!
//! The scanner works on byte chunks so it can run directly against an HTTP
//! body stream. Tokens are separated by any run of Unicode whitespace and
//! compared byte-for-byte (case-sensitive) against the target word.
//!
//! Memory use is bounded by the target length: a token is only buffered while
//! it could still equal the target. UTF-8 sequences split across chunks are
//! carried over; bytes that are not valid UTF-8 count as token bytes.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read size used when pulling from a stream.
const CHUNK_SIZE: usize = 8 * 1024;

/// Incremental matcher fed with arbitrary byte chunks.
///
/// ```rust
/// use spinarak_lib::TokenMatcher;
///
/// let mut matcher = TokenMatcher::new("cat");
/// matcher.feed(b"a cat sat on a c");
/// matcher.feed(b"at mat");
/// assert_eq!(matcher.finish(), 2);
/// ```
#[derive(Debug)]
pub struct TokenMatcher {
    target: Vec<u8>,
    /// Bytes of the current token, kept only while it can still match
    token: Vec<u8>,
    in_token: bool,
    /// Current token already exceeds the target length
    overflow: bool,
    /// Trailing bytes of an incomplete UTF-8 sequence from the last chunk
    pending: Vec<u8>,
    count: u64,
}

impl TokenMatcher {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.as_bytes().to_vec(),
            token: Vec::with_capacity(target.len()),
            in_token: false,
            overflow: false,
            pending: Vec::new(),
            count: 0,
        }
    }

    /// Matches among the tokens completed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Scan the next chunk of input.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.pending.is_empty() {
            self.scan(chunk);
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            self.scan(&joined);
        }
    }

    /// Close the final token at end of input and return the total.
    pub fn finish(mut self) -> u64 {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.push_bytes(&pending);
        }
        self.end_token();
        self.count
    }

    fn scan(&mut self, mut bytes: &[u8]) {
        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.scan_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = bytes.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        self.scan_str(text);
                    }
                    match err.error_len() {
                        Some(len) => {
                            self.push_bytes(&rest[..len]);
                            bytes = &rest[len..];
                        }
                        None => {
                            // Sequence cut by the chunk boundary
                            self.pending.extend_from_slice(rest);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn scan_str(&mut self, text: &str) {
        let mut utf8 = [0u8; 4];
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.end_token();
            } else {
                self.push_bytes(ch.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.in_token = true;
        if self.overflow {
            return;
        }
        if self.token.len() + bytes.len() > self.target.len() {
            self.overflow = true;
            self.token.clear();
        } else {
            self.token.extend_from_slice(bytes);
        }
    }

    fn end_token(&mut self) {
        if self.in_token && !self.overflow && self.token == self.target {
            self.count += 1;
        }
        self.token.clear();
        self.in_token = false;
        self.overflow = false;
    }
}

/// Count the tokens in `reader` that are exactly equal to `target`.
///
/// Reads until end of stream. If a read fails, scanning stops and the error
/// is returned together with the matches found in tokens completed before
/// the failure.
pub async fn count_occurrences<R>(target: &str, mut reader: R) -> (u64, Option<io::Error>)
where
    R: AsyncRead + Unpin,
{
    let mut matcher = TokenMatcher::new(target);
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => return (matcher.finish(), None),
            Ok(n) => matcher.feed(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (matcher.count(), Some(e)),
        }
    }
}

/// Count exact matches of `target` in an in-memory buffer.
pub fn count_in_bytes(target: &str, text: &[u8]) -> u64 {
    let mut matcher = TokenMatcher::new(target);
    matcher.feed(text);
    matcher.finish()
}

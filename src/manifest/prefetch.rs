//! Off-thread manifest prefetch.
//!
//! Each request runs [`fetch_source_meta`] on its own worker thread and posts
//! the result back over a channel. Results are only applied when the owner
//! collects them, so widget state is still touched from one thread only.

use super::{fetch_source_meta, SourceMeta};
use crate::net::Fetcher;
use crate::widget::WidgetId;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct Prefetcher {
    fetcher: Arc<dyn Fetcher>,
    tx: Sender<(WidgetId, SourceMeta)>,
    rx: Receiver<(WidgetId, SourceMeta)>,
    outstanding: usize,
}

impl Prefetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { fetcher, tx, rx, outstanding: 0 }
    }

    pub fn spawn(&mut self, widget: WidgetId, src: String) {
        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        self.outstanding += 1;
        std::thread::spawn(move || {
            let meta = fetch_source_meta(fetcher.as_ref(), &src);
            // receiver gone means the page was dropped; nothing left to notify
            let _ = tx.send((widget, meta));
        });
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Results that are already in, without blocking
    pub fn try_collect(&mut self) -> Vec<(WidgetId, SourceMeta)> {
        let mut out = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            out.push(item);
        }
        self.outstanding = self.outstanding.saturating_sub(out.len());
        out
    }

    /// Block until every outstanding request reported or `timeout` elapsed
    pub fn wait(&mut self, timeout: Duration) -> Vec<(WidgetId, SourceMeta)> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();
        while self.outstanding > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(item) => {
                    self.outstanding -= 1;
                    out.push(item);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::OfflineFetcher;

    #[test]
    fn offline_prefetch_resolves_empty() {
        let mut p = Prefetcher::new(Arc::new(OfflineFetcher));
        p.spawn(WidgetId(7), "https://cdn.example/a.m3u8".to_string());
        assert_eq!(p.outstanding(), 1);
        let got = p.wait(Duration::from_secs(5));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].0, WidgetId(7));
        assert!(got[0].1.is_empty());
        assert_eq!(p.outstanding(), 0);
    }
}

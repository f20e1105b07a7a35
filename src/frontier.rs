use std::collections::{HashSet, VecDeque};
use url::Url;

/// Breadth-first work queue for a single crawl.
///
/// URLs are marked as seen when they are handed out by [`Frontier::dequeue`],
/// not when they are queued, so the same URL may sit in the queue more than
/// once but is only ever dispatched once. Only dispatches count against
/// `max_pages`; queuing goes on after the budget is spent so that
/// [`Frontier::pending`] reports what was left behind.
#[derive(Debug)]
pub struct Frontier {
    seen: HashSet<Url>,
    queue: VecDeque<(Url, usize)>,
    dispatched: usize,
    max_pages: usize,
    max_depth: Option<usize>,
}

impl Frontier {
    pub fn new(max_pages: usize, max_depth: Option<usize>) -> Self {
        Self {
            seen: HashSet::new(),
            queue: VecDeque::new(),
            dispatched: 0,
            max_pages,
            max_depth,
        }
    }

    /// Appends `url` to the tail unless it was already seen or lies beyond
    /// the depth cap.
    pub fn enqueue(&mut self, url: Url, depth: usize) {
        if self.seen.contains(&url) || self.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        self.queue.push_back((url, depth));
    }

    /// Pops the next unseen URL and marks it seen, while budget remains.
    pub fn dequeue(&mut self) -> Option<(Url, usize)> {
        while self.dispatched < self.max_pages {
            let (url, depth) = self.queue.pop_front()?;
            if self.seen.insert(url.clone()) {
                self.dispatched += 1;
                return Some((url, depth));
            }
        }

        None
    }

    /// Records a URL that was reached without being dispatched, such as the
    /// target of a redirect, so it is never fetched on its own.
    pub fn mark_seen(&mut self, url: Url) {
        self.seen.insert(url);
    }

    pub fn is_exhausted(&self) -> bool {
        self.dispatched >= self.max_pages
            || self.queue.iter().all(|(url, _)| self.seen.contains(url))
    }

    /// Number of dispatched URLs so far
    pub fn dispatched_count(&self) -> usize {
        self.dispatched
    }

    /// Distinct queued URLs that were never seen.
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .map(|(url, _)| url)
            .filter(|url| !self.seen.contains(*url))
            .collect::<HashSet<_>>()
            .len()
    }
}

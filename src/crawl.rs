use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::index::concurrent::ConcurrentIndex;
use crate::index::InvertedIndex;
use crate::sync::WorkQueue;
use crate::text::Stemmer;

const MAX_REDIRECTS: usize = 3;

/// Bounded breadth-first crawl: a hard cap `max` on distinct URLs ever
/// submitted as tasks. The visited set and task submission happen under
/// the same mutex so the cap holds exactly under contention. The queue
/// is owned by the crawler itself so a running task can submit more
/// work onto it without reaching through a borrow that would outlive
/// the closure.
pub struct Crawler {
    visited: Mutex<HashSet<String>>,
    max: usize,
    index: Arc<ConcurrentIndex>,
    client: reqwest::blocking::Client,
    queue: Arc<WorkQueue>,
}

impl Crawler {
    pub fn new(index: Arc<ConcurrentIndex>, max: usize, queue: Arc<WorkQueue>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("building the HTTP client cannot fail with this configuration");

        Crawler {
            visited: Mutex::new(HashSet::new()),
            max: max.max(1),
            index,
            client,
            queue,
        }
    }

    /// Seeds the crawl and submits the first task. The caller awaits
    /// `queue.finish()` afterward to know the crawl has completed.
    pub fn crawl(self: &Arc<Self>, seed: &str) {
        let seed = match normalize_url(seed, seed) {
            Some(url) => url,
            None => return,
        };

        {
            let mut visited = self.visited.lock().unwrap();
            if visited.len() >= self.max {
                return;
            }
            visited.insert(seed.clone());
        }

        self.submit(seed);
    }

    fn submit(self: &Arc<Self>, url: String) {
        let crawler = Arc::clone(self);
        self.queue.execute(move || crawler.visit(&url));
    }

    fn visit(self: &Arc<Self>, url: &str) {
        let body = match self.fetch(url) {
            Some(body) => body,
            None => return,
        };

        let document = Html::parse_document(&body);
        let selector = Selector::parse("a[href]").expect("static selector is valid");

        let hrefs: Vec<String> = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| normalize_url(url, href))
            .collect();

        {
            let mut visited = self.visited.lock().unwrap();
            for href in hrefs {
                if visited.len() >= self.max {
                    break;
                }
                if visited.insert(href.clone()) {
                    self.submit(href);
                }
            }
        }

        let text = extract_text(&document);
        if let Ok(local) = self.build_local_index(&text, url) {
            self.index.merge(&local);
        }
    }

    fn fetch(&self, url: &str) -> Option<String> {
        match self.client.get(url).send() {
            Ok(response) => response.text().ok(),
            Err(e) => {
                eprintln!("fetch failed for {url}: {e}");
                None
            }
        }
    }

    fn build_local_index(&self, text: &str, location: &str) -> crate::error::Result<InvertedIndex> {
        let stemmer = Stemmer::new();
        let stems = stemmer.stem_line(text);
        let mut local = InvertedIndex::new();
        if !stems.is_empty() {
            local.add_all_tokens(&stems, location, 1)?;
        }
        Ok(local)
    }
}

fn extract_text(document: &Html) -> String {
    document.root_element().text().collect::<Vec<_>>().join(" ")
}

/// Resolves `href` against `base`, strips the fragment, re-serializes
/// the query component, and rejects anything that isn't `http`/`https`.
fn normalize_url(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let mut resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use minnow::cli::{self, USAGE};
use minnow::config::Config;
use minnow::crawl::Crawler;
use minnow::error::{Error, ErrorKind};
use minnow::index::concurrent::ConcurrentIndex;
use minnow::query::QueryParser;
use minnow::sync::WorkQueue;
use minnow::{build, json};

fn main() -> ExitCode {
    let config = Config::default();
    let raw: Vec<String> = std::env::args().skip(1).collect();

    let args = match cli::parse(&raw, &config) {
        Ok(args) => args,
        Err(e) => {
            if is_help_request(&e) {
                print!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            eprintln!("{e}");
            eprint!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(args) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn is_help_request(e: &Error) -> bool {
    matches!(e.kind, ErrorKind::InvalidInput) && e.context == "help requested"
}

fn run(args: cli::Args) -> minnow::error::Result<()> {
    let index = Arc::new(ConcurrentIndex::new());

    if let Some(path) = &args.text {
        build_text(path, &index, args.threads)?;
    }

    if let Some(url) = &args.html {
        crawl_web(url, &index, args.max, args.threads)?;
    }

    let snapshot = index.snapshot();
    json::write_index(&snapshot, Path::new(&args.index))?;
    json::write_counts(&snapshot, Path::new(&args.counts))?;

    if let Some(query_path) = &args.query {
        let results = run_queries(query_path, Arc::clone(&index), args.exact, args.threads)?;
        json::write_results(&results, Path::new(&args.results))?;
    }

    Ok(())
}

fn build_text(path: &str, index: &Arc<ConcurrentIndex>, threads: Option<usize>) -> minnow::error::Result<()> {
    let path = Path::new(path);
    match threads {
        Some(n) => {
            let queue = WorkQueue::new(n);
            build::build_index_concurrent(path, Arc::clone(index), &queue)?;
            queue.finish();
            queue.join();
        }
        None => build::build_index_sequential(path, index)?,
    }
    Ok(())
}

fn crawl_web(seed: &str, index: &Arc<ConcurrentIndex>, max: usize, threads: Option<usize>) -> minnow::error::Result<()> {
    let workers = threads.unwrap_or(1).max(1);
    let queue = Arc::new(WorkQueue::new(workers));
    let crawler = Arc::new(Crawler::new(Arc::clone(index), max, Arc::clone(&queue)));
    crawler.crawl(seed);
    queue.finish();
    drop(crawler);
    match Arc::try_unwrap(queue) {
        Ok(queue) => queue.join(),
        Err(queue) => queue.shutdown(),
    }
    Ok(())
}

fn run_queries(
    path: &str,
    index: Arc<ConcurrentIndex>,
    exact: bool,
    threads: Option<usize>,
) -> minnow::error::Result<std::collections::BTreeMap<String, Vec<minnow::index::SearchResult>>> {
    let parser = Arc::new(QueryParser::new(index, exact));
    match threads {
        Some(n) => {
            let queue = WorkQueue::new(n);
            parser.search_file_concurrent(Path::new(path), &queue)?;
            queue.finish();
            queue.join();
        }
        None => parser.search_file(Path::new(path))?,
    }
    Ok(Arc::try_unwrap(parser)
        .unwrap_or_else(|_| panic!("query parser still has outstanding references"))
        .into_results())
}

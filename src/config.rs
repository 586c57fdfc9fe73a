#[derive(Debug, Clone)]
pub struct Config {
    pub default_workers: usize,
    pub default_crawl_max: usize,
    pub index_path: String,
    pub counts_path: String,
    pub results_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_workers: 5,
            default_crawl_max: 1,
            index_path: "index.json".to_string(),
            counts_path: "counts.json".to_string(),
            results_path: "results.json".to_string(),
        }
    }
}

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    apply_overrides, expand_path, format_region_tree, load_site_config, output_paths,
    parse_proxy_arg,
};

pub use yado_core::crawl::{CrawlOptions, CrawlOutcome, execute_crawl};

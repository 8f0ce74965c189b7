use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use url::Url;
use yado_core::crawl::{CrawlOptions, execute_crawl};
use yado_core::report::{ReportFormat, generate_text_report, save_records, save_summary};
use yado_scanner::{Crawler, ProxyConfig, Region, SiteConfig};

pub const DEFAULT_RECORDS_STEM: &str = "jalan_data";
pub const DEFAULT_SUMMARY_STEM: &str = "jalan_summary";

/// Expand `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

/// Load a JSON site configuration, or the defaults when no path is given.
pub fn load_site_config(path: Option<&str>) -> Result<SiteConfig, String> {
    let Some(raw) = path else {
        return Ok(SiteConfig::default());
    };

    let path = expand_path(raw);
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Invalid config file {}: {}", path.display(), e))
}

/// `direct`, `none` and the empty string mean no proxy.
pub fn parse_proxy_arg(raw: &str) -> ProxyConfig {
    match raw.trim() {
        "" | "direct" | "none" => ProxyConfig::direct(),
        url => ProxyConfig::new(url),
    }
}

/// Command line flags win over the config file.
pub fn apply_overrides(
    mut config: SiteConfig,
    base_url: Option<&Url>,
    threads: Option<usize>,
    proxies: &[String],
) -> SiteConfig {
    if let Some(url) = base_url {
        config.base_url = url.as_str().to_string();
    }
    if let Some(threads) = threads {
        config.concurrency = threads;
    }
    if !proxies.is_empty() {
        config.proxies = proxies.iter().map(|p| parse_proxy_arg(p)).collect();
    }
    config
}

pub fn output_paths(
    format: ReportFormat,
    output: Option<&PathBuf>,
    summary: Option<&PathBuf>,
) -> (PathBuf, PathBuf) {
    let extension = match format {
        ReportFormat::Csv => "csv",
        ReportFormat::Json => "json",
    };
    let records = output
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("{}.{}", DEFAULT_RECORDS_STEM, extension)));
    let summary = summary
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("{}.{}", DEFAULT_SUMMARY_STEM, extension)));
    (records, summary)
}

fn site_config_from_args(args: &ArgMatches) -> Result<SiteConfig, String> {
    let config = load_site_config(args.get_one::<String>("config").map(String::as_str))?;
    let proxies: Vec<String> = args
        .try_get_many::<String>("proxy")
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let threads = args.try_get_one::<usize>("threads").ok().flatten().copied();

    Ok(apply_overrides(
        config,
        args.get_one::<Url>("base-url"),
        threads,
        &proxies,
    ))
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<(), String> {
    let config = site_config_from_args(sub_matches)?;
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or_default();
    let (records_path, summary_path) = output_paths(
        format,
        sub_matches.get_one::<PathBuf>("output"),
        sub_matches.get_one::<PathBuf>("summary"),
    );
    let checkpoint = sub_matches
        .get_one::<String>("checkpoint")
        .map(|raw| expand_path(raw));

    if !quiet {
        println!("{} Crawling {}", "→".blue(), config.base_url.bright_white());
        println!("  Workers: {}", config.concurrency());
        println!("  Proxies: {}", config.proxy_pool().len());
        if let Some(ref path) = checkpoint {
            println!("  Checkpoint: {}", path.display());
        }
        println!();
    }

    let options = CrawlOptions {
        config,
        checkpoint,
        show_progress_bars: !quiet,
    };

    let outcome = execute_crawl(options, None, None)
        .await
        .map_err(|e| format!("Crawl failed: {}", e))?;

    save_records(&records_path, format, &outcome.report.records)
        .map_err(|e| format!("Failed to write {}: {}", records_path.display(), e))?;
    save_summary(&summary_path, format, &outcome.summary)
        .map_err(|e| format!("Failed to write {}: {}", summary_path.display(), e))?;

    if !quiet {
        println!();
        print!("{}", generate_text_report(&outcome.summary, &outcome.report));
        println!(
            "{} Data saved to {}",
            "✓".green().bold(),
            records_path.display()
        );
        println!(
            "{} Summary report saved to {}",
            "✓".green().bold(),
            summary_path.display()
        );
    }
    Ok(())
}

pub async fn handle_regions(sub_matches: &ArgMatches) -> Result<(), String> {
    let config = site_config_from_args(sub_matches)?;
    let crawler = Crawler::new(config).map_err(|e| e.to_string())?;
    let regions = crawler.load_regions().await.map_err(|e| e.to_string())?;

    print!("{}", format_region_tree(&regions));
    Ok(())
}

/// One line per region, subregions indented beneath it.
pub fn format_region_tree(regions: &[Region]) -> String {
    let mut out = String::new();
    for region in regions {
        out.push_str(&format!(
            "{} {}\n",
            region.code.bright_cyan(),
            region.name.bold()
        ));
        for (i, subregion) in region.subregions.iter().enumerate() {
            let branch = if i + 1 == region.subregions.len() {
                "└──"
            } else {
                "├──"
            };
            out.push_str(&format!(
                "  {} {} {}\n",
                branch.bright_black(),
                subregion.code,
                subregion.name
            ));
        }
    }
    out
}

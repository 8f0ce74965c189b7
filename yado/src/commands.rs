use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("yado")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("yado")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and progress output")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl every region listing of the catalog and write the hotel table and its \
                summary.",
                )
                .arg(config_arg())
                .arg(base_url_arg())
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the hotel records (default: jalan_data.<format>)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-s --"summary" <PATH>)
                        .required(false)
                        .help("Where to write the summary row (default: jalan_summary.<format>)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format for both tables")
                        .value_parser(["csv", "json"])
                        .default_value("csv"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Listings and details fetched concurrently (overrides the config file)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"checkpoint" <PATH>)
                        .required(false)
                        .help("SQLite resume file; finished listings are skipped on rerun")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--"proxy" <PROXY_URL>)
                        .required(false)
                        .help("Add a proxy to the rotation (repeatable, \"direct\" for no proxy)")
                        .action(clap::ArgAction::Append),
                ),
        )
        .subcommand(
            command!("regions")
                .about("Fetch the region script and print the region tree")
                .arg(config_arg())
                .arg(base_url_arg()),
        )
}

fn config_arg() -> clap::Arg {
    arg!(-c --"config" <PATH>)
        .required(false)
        .help("JSON site configuration; unset keys keep their defaults")
        .value_parser(clap::value_parser!(String))
}

fn base_url_arg() -> clap::Arg {
    arg!(-u --"base-url" <URL>)
        .required(false)
        .help("Site root to crawl (overrides the config file)")
        .value_parser(clap::value_parser!(Url))
}

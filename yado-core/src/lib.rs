use colored::Colorize;

pub mod crawl;
pub mod data;
pub mod error;
pub mod report;
pub mod summary;

pub use error::CoreError;

pub fn print_banner() {
    let banner = r#"
   __  __          __
   \ \/ /___ _____/ /___
    \  / __ `/ __  / __ \
    / / /_/ / /_/ / /_/ /
   /_/\__,_/\__,_/\____/
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "   {} {}\n",
        "hotel catalog crawler".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}

use audible_extractor::extractor::ExtractorFactory;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "audible-cli",
    author,
    version,
    about = "Extract audiobook metadata, chapters and HLS streams from Audible product pages",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to <config dir>/audible-cli/config.toml)
    #[arg(long, global = true, env = "AUDIBLE_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Request timeout in seconds (overrides the configuration)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// User agent sent with every request (overrides the configuration)
    #[arg(long, global = true)]
    pub user_agent: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract one audiobook from its product page url
    Extract {
        /// Product page url, e.g. https://www.audible.com/pd/Title-Audiobook/B01LZB4R8W
        #[arg(value_parser = parse_product_url)]
        url: String,

        /// Cookie header exported from a signed-in browser ("name=value; name2=value2")
        #[arg(short, long, env = "AUDIBLE_COOKIES", hide_env_values = true)]
        cookies: Option<String>,

        /// Netscape cookies.txt exported from a signed-in browser
        #[arg(long)]
        cookies_file: Option<PathBuf>,

        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Write the result to a file instead of stdout
        #[arg(long)]
        output_file: Option<PathBuf>,
    },

    /// Show or reset the configuration file
    Config {
        #[arg(long)]
        show: bool,

        #[arg(long, conflicts_with = "show")]
        reset: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Pretty,
    /// Indented JSON
    Json,
    /// Single-line JSON
    JsonCompact,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonCompact)
    }
}

fn parse_product_url(url: &str) -> Result<String, String> {
    let url = url.trim();
    if ExtractorFactory::is_supported(url) {
        Ok(url.to_string())
    } else {
        Err(format!("not an Audible product page url: {url}"))
    }
}

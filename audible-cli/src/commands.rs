use crate::{cli::OutputFormat, config::AppConfig, error::Result, output::OutputManager};
use audible_extractor::{
    cookies::{cookie_header_for_host, load_netscape_cookies},
    extractor::{ClientOptions, ExtractorFactory, build_client},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{io::IsTerminal, path::Path, time::Duration};
use tracing::{debug, info, warn};

// host whose cookies are replayed from a cookies.txt export
const COOKIE_HOST: &str = "www.audible.com";

pub struct CommandExecutor {
    output_manager: OutputManager,
}

impl CommandExecutor {
    pub fn new(config: &AppConfig) -> Self {
        let colored = config.colored_output && std::io::stdout().is_terminal();
        Self {
            output_manager: OutputManager::new(colored),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn extract_single(
        &self,
        url: &str,
        cookies: Option<&str>,
        cookies_file: Option<&Path>,
        output_format: OutputFormat,
        output_file: Option<&Path>,
        client_options: &ClientOptions,
        show_progress: bool,
    ) -> Result<()> {
        let factory = ExtractorFactory::new(build_client(client_options)?);
        let cookies = merge_cookies(cookies, cookies_file)?;
        let extractor = factory.create_extractor(url, cookies)?;

        let spinner = show_progress.then(create_spinner);
        let result = extractor.extract().await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let media_info = result?;

        let rendered = self
            .output_manager
            .format_media_info(&media_info, &output_format)?;

        match output_file {
            Some(path) => {
                std::fs::write(path, rendered)?;
                info!("Wrote {} to {}", media_info.id, path.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}

/// Combines a cookies.txt export with an explicit cookie string; the string wins on name clashes.
fn merge_cookies(cookies: Option<&str>, cookies_file: Option<&Path>) -> Result<Option<String>> {
    let mut parts = Vec::with_capacity(2);

    if let Some(path) = cookies_file {
        let jar = load_netscape_cookies(path)?;
        match cookie_header_for_host(&jar, COOKIE_HOST) {
            Some(header) => {
                debug!("Using cookies for {} from {}", COOKIE_HOST, path.display());
                parts.push(header);
            }
            None => warn!("No cookies for {} in {}", COOKIE_HOST, path.display()),
        }
    }

    if let Some(cookies) = cookies.map(str::trim).filter(|c| !c.is_empty()) {
        parts.push(cookies.to_string());
    }

    Ok((!parts.is_empty()).then(|| parts.join("; ")))
}

fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&[
                "▹▹▹▹▹",
                "▸▹▹▹▹",
                "▹▸▹▹▹",
                "▹▹▸▹▹",
                "▹▹▹▸▹",
                "▹▹▹▹▸",
                "▪▪▪▪▪",
            ]),
    );
    pb.set_message("Extracting audiobook information...");
    pb
}

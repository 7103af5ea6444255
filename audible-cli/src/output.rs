use crate::{cli::OutputFormat, error::Result};
use audible_extractor::media::{MediaInfo, StreamInfo};
#[cfg(feature = "colored-output")]
use colored::*;

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_media_info(&self, media_info: &MediaInfo, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty(media_info)),
            OutputFormat::Json => Ok(media_info.to_json_pretty()?),
            OutputFormat::JsonCompact => Ok(media_info.to_json()?),
        }
    }

    fn field(&self, output: &mut String, label: &str, value: &str, color: &Color) {
        output.push_str(&format!(
            "  {}: {}\n",
            self.colorize(label, &Color::Yellow, false),
            self.colorize(value, color, false)
        ));
    }

    fn format_pretty(&self, media_info: &MediaInfo) -> String {
        let mut output = String::new();
        output.push_str(&self.colorize("Audiobook:", &Color::Green, true));
        output.push('\n');

        self.field(&mut output, "Title", &media_info.title, &Color::Cyan);
        self.field(&mut output, "ID", &media_info.id, &Color::Cyan);
        self.field(&mut output, "Page", &media_info.site_url, &Color::Blue);

        let optional = [
            ("Author", media_info.author.as_deref()),
            ("Narrator", media_info.narrator.as_deref()),
            ("Format", media_info.format_label.as_deref()),
            ("Publisher", media_info.publisher.as_deref()),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                self.field(&mut output, label, value, &Color::Cyan);
            }
        }

        if let Some(date) = media_info.release_date {
            self.field(&mut output, "Released", &date.format("%Y-%m-%d").to_string(), &Color::Cyan);
        }
        if let Some(duration) = media_info.duration {
            self.field(&mut output, "Duration", &format_duration(duration), &Color::Cyan);
        }
        if let Some(thumbnail) = media_info.best_thumbnail() {
            self.field(&mut output, "Cover", &thumbnail.url, &Color::Blue);
        }

        if let Some(chapters) = &media_info.chapters {
            output.push('\n');
            output.push_str(&self.colorize(
                &format!("Chapters ({}):", chapters.len()),
                &Color::Green,
                true,
            ));
            output.push('\n');
            for (i, chapter) in chapters.iter().enumerate() {
                output.push_str(&format!(
                    "  {:>3}. {} - {}  {}\n",
                    i + 1,
                    format_duration(chapter.start_time),
                    format_duration(chapter.end_time),
                    self.colorize(chapter.title.as_deref().unwrap_or(""), &Color::Cyan, false)
                ));
            }
        }

        output.push('\n');
        if media_info.formats.is_empty() {
            output.push_str(&self.colorize("No formats available", &Color::Yellow, true));
            output.push('\n');
        } else {
            output.push_str(&self.colorize(
                &format!("Formats ({}):", media_info.formats.len()),
                &Color::Green,
                true,
            ));
            output.push('\n');
            for stream in &media_info.formats {
                output.push_str(&self.format_stream(stream));
            }
        }

        output.trim_end().to_string()
    }

    fn format_stream(&self, stream: &StreamInfo) -> String {
        let mut line = format!(
            "  {} {}",
            self.colorize(&stream.format_id, &Color::Cyan, true),
            self.colorize(&format!("[{}]", stream.protocol), &Color::Yellow, false)
        );
        if !stream.quality.is_empty() {
            line.push_str(&format!(" {}", stream.quality));
        }
        if !stream.codec.is_empty() {
            line.push_str(&format!(" {}", stream.codec));
        }
        line.push('\n');
        line.push_str(&format!(
            "      {}\n",
            self.colorize(&stream.url, &Color::Blue, false)
        ));
        line
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
}

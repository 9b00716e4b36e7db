//! `tagz page` command implementation.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use tagz::html::{body, meta, pre, title};
use tagz::{Page, Render, RenderOptions};
use tagz_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Text file to wrap.
    file: PathBuf,

    /// Page title (default: the file name).
    #[arg(short, long)]
    title: Option<String>,

    /// Value of the `lang` attribute (overrides config).
    #[arg(long)]
    lang: Option<String>,

    /// Indented multi-line output (overrides config).
    #[arg(long)]
    pretty: bool,

    /// Dense single-line output (overrides config).
    #[arg(long, conflicts_with = "pretty")]
    dense: bool,

    /// Indentation unit for pretty output (overrides config).
    #[arg(long)]
    indent: Option<String>,

    /// Characters per streamed chunk (overrides config).
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover tagz.toml).
    #[arg(short, long, env = "TAGZ_CONFIG")]
    config: Option<PathBuf>,
}

impl PageArgs {
    /// Execute the page command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read or
    /// the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let pretty = self.resolve_pretty();
        let cli_settings = CliSettings {
            pretty,
            indent: self.indent,
            chunk_size: self.chunk_size,
            lang: self.lang,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let text = std::fs::read_to_string(&self.file)?;
        let title = self.title.unwrap_or_else(|| default_title(&self.file));
        let page = build_page(&text, &title, config.page.lang.as_deref());

        let chunk_size = config.render.chunk_size;
        let options = &config.render.options;
        let chunks = match &self.output {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                let chunks = write_chunks(&page, chunk_size, options, &mut writer)?;
                Output::new().success(&format!("Wrote {}", path.display()));
                chunks
            }
            None => write_chunks(&page, chunk_size, options, &mut io::stdout().lock())?,
        };
        tracing::info!(chunks, chunk_size, "Page written");

        Ok(())
    }

    /// Resolve `pretty` from --pretty/--dense flags.
    fn resolve_pretty(&self) -> Option<bool> {
        self.dense
            .then_some(false)
            .or_else(|| self.pretty.then_some(true))
    }
}

/// An HTML5 page showing `text` preformatted.
pub(crate) fn build_page(text: &str, page_title: &str, lang: Option<&str>) -> Page {
    let page = Page::new(body().child(pre().child(text)))
        .push_head(meta().attr("charset", "utf-8"))
        .push_head(title().child(page_title));
    match lang {
        Some(lang) => page.with_lang(lang),
        None => page,
    }
}

/// Stream `page` into `writer` chunk by chunk, returning the chunk count.
fn write_chunks(
    page: &Page,
    chunk_size: usize,
    options: &RenderOptions,
    writer: &mut dyn Write,
) -> Result<usize, CliError> {
    let mut count = 0;
    for chunk in page.iter_chunk(chunk_size, options) {
        writer.write_all(chunk?.as_bytes())?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

fn default_title(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

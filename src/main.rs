//! The `wikitree` binary.

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use wikitree::{parse_reader, sexpr, Adapters, Document, Options, ParseError};

const EXIT_PARSE_ERROR: i32 = 1;
const EXIT_OUTPUT_ERROR: i32 = 2;

/// Why processing one input stopped.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot write output: {0}")]
    Output(io::Error),
}

impl RunError {
    fn exit_code(&self) -> i32 {
        match self {
            RunError::Output(_) => EXIT_OUTPUT_ERROR,
            _ => EXIT_PARSE_ERROR,
        }
    }
}

#[derive(Debug, Parser)]
#[command(about, author, version)]
#[command(after_help = "\
By default, options are read from $XDG_CONFIG_HOME/wikitree/config when it exists. \
The file holds `key = value` properties such as `markup.camelCaseLinks = true`. \
Flags given on the command line override it.")]
struct Cli {
    /// Wiki markup files to parse; standard input if none passed
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Name of the page the markup belongs to
    #[arg(long, value_name = "NAME", default_value = "Main")]
    page: String,

    /// Path to a properties file to read options from
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Link bare CamelCase words to pages
    #[arg(long)]
    camel_case: bool,

    /// Link bare http, https, ftp and mailto URIs
    #[arg(long)]
    plain_uris: bool,

    /// Pass raw HTML in text through unescaped
    #[arg(long)]
    allow_html: bool,

    /// Don't follow external links with an icon
    #[arg(long)]
    no_outlink_image: bool,

    /// Mark external links rel="nofollow"
    #[arg(long)]
    nofollow: bool,

    /// Never render links as inline images
    #[arg(long)]
    no_inline_images: bool,

    /// Output format
    #[arg(short = 't', long = "format", value_enum, default_value_t = Format::Sexpr)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The node tree as S-expressions
    Sexpr,
    /// Text with all markup removed
    Text,
}

#[cfg(all(not(windows), not(target_arch = "wasm32")))]
fn default_config_path() -> Option<PathBuf> {
    xdg::BaseDirectories::with_prefix("wikitree")
        .ok()?
        .find_config_file("config")
}

#[cfg(any(windows, target_arch = "wasm32"))]
fn default_config_path() -> Option<PathBuf> {
    None
}

fn load_options(cli: &Cli) -> Result<Options<'static>, Box<dyn Error>> {
    let mut options = Options::default();

    let path = cli.config.clone().or_else(default_config_path);
    if let Some(path) = path {
        log::debug!("reading options from {}", path.display());
        let properties = fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        options.apply_properties(&properties)?;
    }

    if cli.camel_case {
        options.extension.camel_case_links = true;
    }
    if cli.plain_uris {
        options.extension.plain_uris = true;
    }
    if cli.allow_html {
        options.parse.allow_raw_html = true;
    }
    if cli.no_outlink_image {
        options.parse.use_outlink_image = false;
    }
    if cli.nofollow {
        options.parse.use_rel_nofollow = true;
    }
    if cli.no_inline_images {
        options.extension.inline_images = false;
    }
    Ok(options)
}

fn write_document<W: Write>(doc: &Document, format: Format, output: &mut W) -> io::Result<()> {
    match format {
        Format::Sexpr => sexpr::format_document(doc, output),
        Format::Text => writeln!(output, "{}", doc.text_content()),
    }
}

fn run<R: BufRead, W: Write>(
    cli: &Cli,
    options: &Options<'_>,
    input: R,
    output: &mut W,
) -> Result<(), RunError> {
    let doc = parse_reader(&cli.page, input, options, &Adapters::default())?;
    write_document(&doc, cli.format, output).map_err(RunError::Output)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let options = load_options(&cli)?;
    let mut output = BufWriter::new(io::stdout());

    let result = if cli.files.is_empty() {
        run(&cli, &options, io::stdin().lock(), &mut output)
    } else {
        cli.files.iter().try_for_each(|path| {
            let file = File::open(path).map_err(|source| RunError::Open {
                path: path.clone(),
                source,
            })?;
            run(&cli, &options, BufReader::new(file), &mut output)
        })
    };
    let result = result.and_then(|()| output.flush().map_err(RunError::Output));

    if let Err(e) = result {
        eprintln!("wikitree: {}", e);
        process::exit(e.exit_code());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn cli() -> Cli {
        Cli::parse_from(["wikitree"])
    }

    #[test]
    fn write_failures_are_not_parse_errors() {
        let err = run(&cli(), &Options::default(), "__x__".as_bytes(), &mut Closed).unwrap_err();
        assert!(matches!(err, RunError::Output(_)), "{:?}", err);
        assert_eq!(err.exit_code(), EXIT_OUTPUT_ERROR);
        assert!(err.to_string().starts_with("cannot write output:"), "{}", err);
    }

    #[test]
    fn read_failures_are_parse_errors() {
        let mut out = vec![];
        let err = run(&cli(), &Options::default(), &b"\xff"[..], &mut out).unwrap_err();
        assert!(matches!(err, RunError::Parse(ParseError::Io(_))), "{:?}", err);
        assert_eq!(err.exit_code(), EXIT_PARSE_ERROR);
    }

    #[test]
    fn documents_are_written() {
        let mut out = vec![];
        run(&cli(), &Options::default(), "''a''".as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(domroot (i \"a\"))\n");
    }
}

use crate::render::Renderer;
use crate::run::cli::OutputFormat;
use crate::run::fence_unwrap::unwrap_markdown_fence;
use crate::run::RunOptions;
use crate::syntax::parser::{MarkdownParser, ParserOptions};
use crate::wire;
use crate::wire::WireOptions;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::io;
use std::io::Write;
use std::time::Instant;

/// The run's overall possible error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Couldn't read an input file (or stdin).
    #[error("{1} while reading {0}")]
    FileRead(Input, #[source] io::Error),

    /// Couldn't serialize the output.
    #[error("couldn't serialize output: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Couldn't write the output.
    #[error("couldn't write output: {0}")]
    Write(#[source] io::Error),
}

/// Stdin or an input file by path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Input {
    Stdin,
    FilePath(String),
}

impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Stdin => f.write_str("stdin"),
            Input::FilePath(file) => write!(f, "file {file:?}"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Write(err.into())
        } else {
            Error::Serialize(err)
        }
    }
}

/// A simple facade for handling I/O.
///
/// This trait lets you do "I/O-y stuff" like mocking out stdin or reading files. The [`run`] method uses it.
pub trait OsFacade {
    /// Read stdin (or your mock of it) to a `String`.
    fn read_stdin(&self) -> io::Result<String>;

    /// Read a file path (or your mock of one) to a `String`.
    fn read_file(&self, path: &str) -> io::Result<String>;

    /// Get a writer for stdout (or your mock of it).
    fn stdout(&mut self) -> impl Write;

    /// Handle an error.
    fn write_error(&mut self, err: Error);

    /// Read a slice of file paths into a single, concatenated `String`.
    ///
    /// The default implementation treats the file path `"-"` as stdin. The first `"-"` reads all of stdin (via
    /// [`Self::read_stdin`]), and subsequent `"-"`s get silently ignored. Each input is followed by a newline, so that
    /// one file's last line doesn't run into the next file's first line.
    fn read_all(&self, markdown_file_paths: &[String]) -> Result<String, Error> {
        if markdown_file_paths.is_empty() {
            return self.read_stdin().map_err(|err| Error::FileRead(Input::Stdin, err));
        }
        let mut contents = String::new();
        let mut have_read_stdin = false;
        for path in markdown_file_paths {
            if path == "-" {
                if have_read_stdin {
                    continue;
                }
                contents.push_str(&self.read_stdin().map_err(|err| Error::FileRead(Input::Stdin, err))?);
                have_read_stdin = true;
            } else {
                let path_contents = self
                    .read_file(path)
                    .map_err(|err| Error::FileRead(Input::FilePath(path.to_string()), err))?;
                contents.push_str(&path_contents);
            }
            contents.push('\n');
        }
        Ok(contents)
    }
}

/// Runs mdnotion end to end.
///
/// This reads the inputs named in [`RunOptions::markdown_file_paths`] through the [OsFacade], converts them to blocks,
/// and writes those to the facade's stdout in the format given by [`RunOptions::output`]. Returns whether the run
/// succeeded; any error is first passed to [`OsFacade::write_error`].
pub fn run(options: &RunOptions, os: &mut impl OsFacade) -> bool {
    match run_or_error(options, os) {
        Ok(()) => true,
        Err(err) => {
            os.write_error(err);
            false
        }
    }
}

fn run_or_error(options: &RunOptions, os: &mut impl OsFacade) -> Result<(), Error> {
    let contents = os.read_all(&options.markdown_file_paths)?;
    let markdown = if options.unwrap_fence {
        unwrap_markdown_fence(&contents)
    } else {
        &contents
    };

    let start = Instant::now();
    let parser = MarkdownParser::with_options(&ParserOptions::from(options));
    let doc = parser.parse(markdown);
    let blocks = Renderer::default().render(&doc);
    log::info!("converted {} bytes to {} blocks in {:?}", markdown.len(), blocks.len(), start.elapsed());

    if options.quiet {
        return Ok(());
    }
    let wire_options = WireOptions::from(options);
    let mut stdout = os.stdout();
    match options.output {
        OutputFormat::Blocks => write_json(&mut stdout, &blocks, options.pretty),
        OutputFormat::Notion => write_json(
            &mut stdout,
            &wire::to_notion_blocks(&blocks, &wire_options),
            options.pretty,
        ),
        OutputFormat::Requests => {
            let requests = wire::append_requests(wire::to_notion_blocks(&blocks, &wire_options), options.batch_size);
            log::info!("grouped blocks into {} requests", requests.len());
            write_json(&mut stdout, &requests, options.pretty)
        }
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T, pretty: bool) -> Result<(), Error> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    out.write_all(b"\n").map_err(Error::Write)?;
    out.flush().map_err(Error::Write)
}

use crate::syntax::parser::ParserOptions;
use crate::wire::{FootnoteMarkers, WireOptions, DEFAULT_BATCH_SIZE};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use derive_builder::Builder;
use std::fmt::{Display, Formatter};

macro_rules! create_options_structs {
    (
        $(
            $(#[$meta:meta])*
            clap $clap:tt
            pub $name:ident : $ty:ty
        ),* $(,)?
    ) => {
        #[derive(Clone, Default, Debug, PartialEq, Eq, Hash, Parser)]
        #[command(version, about, long_about = None)]
        #[doc(hidden)]
        pub struct CliOptions {
            $(
            $(#[$meta])*
            #[arg$clap]
            pub(crate) $name: $ty,
            )*

            // clap-only stuff:

            /// Markdown files to convert, by path. If none are given, standard input is used.
            ///
            /// Files are read in the order given and converted as if they were one concatenated document, so a
            /// footnote defined in one file can be referenced from another.
            ///
            /// A path of "-" represents standard input. All but the first "-" are ignored.
            #[arg()]
            pub(crate) markdown_file_paths: Vec<String>,
        }

        /// Options analogous to the mdnotion CLI's switches.
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Builder)]
        #[builder(default)]
        pub struct RunOptions {
            $(
            $(#[$meta])*
            pub $name: $ty,
            )*

            pub markdown_file_paths: Vec<String>,
        }

        impl From<CliOptions> for RunOptions {
            fn from(value: CliOptions) -> Self {
                Self {
                    $($name: value.$name,)*
                    markdown_file_paths: value.markdown_file_paths,
                }
            }
        }
    };
}

create_options_structs! {
    /// What to print.
    clap(long, short, value_enum, default_value_t = OutputFormat::Notion)
    pub output: OutputFormat,

    /// Pretty-print the JSON output.
    clap(long)
    pub pretty: bool,

    /// The most blocks per request body, for `--output requests`. The API accepts at most 100.
    clap(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = RangedU64ValueParser::<usize>::new().range(1..=100))
    pub batch_size: usize,

    /// Recognize footnote references (`[^label]`) and definitions (`[^label]: ...`).
    clap(long, default_value_t = true, action = clap::ArgAction::Set)
    pub footnotes: bool,

    /// Recognize definition lists (a term line, followed by `: definition` lines).
    clap(long, default_value_t = true, action = clap::ArgAction::Set)
    pub definition_lists: bool,

    /// Mark footnotes with sequential numbers (`[1]`), in order of first reference. If false, footnotes are marked
    /// with their original labels.
    clap(long, default_value_t = true, action = clap::ArgAction::Set)
    pub renumber_footnotes: bool,

    /// If the whole input is wrapped in a single ```` ```markdown ```` (or ```` ```md ````) fence, remove that fence
    /// before converting.
    clap(long, default_value_t = true, action = clap::ArgAction::Set)
    pub unwrap_fence: bool,

    /// Quiet: do not print anything to stdout. The exit code still reflects whether the input could be read.
    clap(long, short)
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output: OutputFormat::Notion,
            pretty: false,
            batch_size: DEFAULT_BATCH_SIZE,
            footnotes: true,
            definition_lists: true,
            renumber_footnotes: true,
            unwrap_fence: true,
            quiet: false,
            markdown_file_paths: vec![],
        }
    }
}

impl From<&RunOptions> for ParserOptions {
    fn from(value: &RunOptions) -> Self {
        ParserOptions {
            footnotes: value.footnotes,
            definition_lists: value.definition_lists,
            ..Default::default()
        }
    }
}

impl From<&RunOptions> for WireOptions {
    fn from(value: &RunOptions) -> Self {
        WireOptions {
            footnote_markers: if value.renumber_footnotes {
                FootnoteMarkers::Numbers
            } else {
                FootnoteMarkers::Labels
            },
        }
    }
}

/// Output formats, analogous to `--output` in the CLI.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum OutputFormat {
    /// The intermediate block model, as tagged JSON.
    Blocks,

    /// A JSON array of Notion API block objects.
    #[default]
    Notion,

    /// A JSON array of append-children request bodies, each `{"children": [...]}` with at most `--batch-size` blocks.
    Requests,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let self_str = match self {
            OutputFormat::Blocks => "blocks",
            OutputFormat::Notion => "notion",
            OutputFormat::Requests => "requests",
        };
        f.write_str(self_str)
    }
}

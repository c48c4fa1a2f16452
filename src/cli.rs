//! CLI module - Command-line interface definitions and handlers

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::backends::acquire::RepoSource;
use crate::core::limits::Limits;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::core::tokenizer::TokenModel;
use crate::flows::context::ContextOptions;

/// repoctx - assemble bounded, LLM-ready context documents from a repository.
#[derive(Parser, Debug)]
#[command(name = "repoctx")]
#[command(
    author,
    version,
    about,
    long_about = r#"repoctx turns a directory tree into a single text document that fits a size budget.

Two assembly modes are available:
- context: directory tree + key files (docs, entry points, config, core sources),
  packed in a fixed order until the byte budget runs out
- files: an explicit list of files rendered with line numbers, never budgeted

Output formats:
- md: the document itself (default)
- json: a structured report that also carries the document

Examples:
    repoctx context
    repoctx context --url https://github.com/owner/repo --branch main --stats
    repoctx files src/main.rs Cargo.toml
    repoctx tree --max-depth 2
    repoctx --format json keys
"#
)]
pub struct Cli {
    /// Root directory to read.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory to read (defaults to the current directory).\n\n\
All paths in the document are relative to this root, and the paths given to\n\
`files` are resolved against it."
    )]
    pub root: PathBuf,

    /// Output format (md/json).
    #[arg(
        long,
        global = true,
        default_value = "md",
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- md (default): the assembled document verbatim\n\
- json: a report with per-file sizes, hashes and notes plus the document\n\n\
Tip: use json when a tool needs to know what was truncated or omitted."
    )]
    pub format: String,

    /// Write the result to FILE instead of stdout.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        long_help = "Write the result to FILE instead of stdout. Parent directories are\n\
created as needed."
    )]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON output with indentation for human readability.\n\n\
Has no effect on md output."
    )]
    pub pretty: bool,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output on stderr. This is useful when piping to files or\n\
when your terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        long_help = "Only log errors. The document is still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Log debug diagnostics to stderr: skipped directories, truncated files,\n\
budget exhaustion. RUST_LOG takes precedence when set."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the assembly limits
#[derive(Args, Debug, Default, Clone)]
pub struct LimitArgs {
    /// Maximum bytes taken from a single file.
    #[arg(
        long,
        value_name = "BYTES",
        env = "REPOCTX_PER_FILE_CAP",
        long_help = "Maximum bytes of content taken from a single file (default: 102400).\n\n\
Larger files are cut and carry a visible truncation note."
    )]
    pub per_file_cap: Option<usize>,

    /// Maximum bytes across the whole document.
    #[arg(
        long,
        value_name = "BYTES",
        env = "REPOCTX_TOTAL_CAP",
        long_help = "Maximum bytes of tree and file content across the whole document\n\
(default: 512000). Titles and fences are not counted."
    )]
    pub total_cap: Option<usize>,

    /// Deepest directory level shown in the tree.
    #[arg(
        long,
        value_name = "N",
        env = "REPOCTX_MAX_DEPTH",
        long_help = "Deepest directory level the tree descends into (default: 4). Levels\n\
beyond it are omitted without a marker."
    )]
    pub max_depth: Option<usize>,

    /// Files kept per category.
    #[arg(
        long,
        value_name = "N",
        env = "REPOCTX_MAX_FILES_PER_CATEGORY",
        long_help = "Maximum files selected per category (default: 5)."
    )]
    pub max_files_per_category: Option<usize>,
}

impl LimitArgs {
    pub fn apply(&self, mut limits: Limits) -> Limits {
        if let Some(cap) = self.per_file_cap {
            limits = limits.with_per_file_cap(cap);
        }
        if let Some(cap) = self.total_cap {
            limits = limits.with_total_cap(cap);
        }
        if let Some(depth) = self.max_depth {
            limits = limits.with_max_tree_depth(depth);
        }
        if let Some(n) = self.max_files_per_category {
            limits = limits.with_max_files_per_category(n);
        }
        limits
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble the budgeted repository context (tree + key files).
    #[command(
        long_about = "Render the directory tree of ROOT and pack the contents of its key files\n\
(documentation, entry points, config, core sources) into one document.\n\n\
The tree comes first and counts against the total budget. Categories follow in a\n\
fixed order; once the budget is spent, no further files or section titles are\n\
emitted. A file cut by the budget ends with a truncation note.\n\n\
Examples:\n\
  repoctx context\n\
  repoctx context --total-cap 65536 --stats\n\
  repoctx context --url https://github.com/owner/repo --branch dev\n"
    )]
    Context {
        /// GitHub repository to shallow-clone instead of reading ROOT.
        #[arg(
            long,
            value_name = "URL",
            long_help = "GitHub repository to shallow-clone instead of reading ROOT.\n\n\
Accepts https://github.com/OWNER/REPO[.git] and git@github.com:OWNER/REPO[.git].\n\
The clone lives in a temporary directory removed on exit."
        )]
        url: Option<String>,

        /// Branch to clone.
        #[arg(long, value_name = "BRANCH", requires = "url")]
        branch: Option<String>,

        /// GitHub token for private repositories.
        #[arg(
            long,
            value_name = "TOKEN",
            requires = "url",
            long_help = "GitHub token for private repositories. When omitted, GITHUB_PAT and\n\
then GH_TOKEN are consulted."
        )]
        pat: Option<String>,

        #[command(flatten)]
        limits: LimitArgs,

        /// Print assembly statistics to stderr.
        #[arg(long)]
        stats: bool,

        /// Token model used by --stats.
        #[arg(
            long,
            default_value = "cl100k",
            value_name = "MODEL",
            long_help = "Token model used for the --stats estimate.\n\n\
Supported values: cl100k (default), o200k, heuristic."
        )]
        token_model: String,
    },

    /// Render an explicit list of files with line numbers.
    #[command(
        long_about = "Render each PATH (relative to ROOT) in the order given, with line numbers\n\
and a language tag. No budget applies. Missing, non-regular and binary files are\n\
reported in place as status blocks and do not fail the command.\n\n\
Examples:\n\
  repoctx files src/main.rs src/lib.rs\n\
  repoctx files --no-line-numbers Cargo.toml\n"
    )]
    Files {
        /// Files to render, relative to ROOT.
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,

        /// Render content without line-number prefixes.
        #[arg(long)]
        no_line_numbers: bool,

        /// Print read/missing counters to stderr.
        #[arg(long)]
        stats: bool,
    },

    /// Render only the directory tree.
    #[command(
        long_about = "Render the directory tree of ROOT. Hidden entries and dependency/build\n\
directories are left out, directories come before files, and at most 10 files are\n\
listed per directory.\n\n\
Examples:\n\
  repoctx tree\n\
  repoctx tree --max-depth 1\n"
    )]
    Tree {
        /// Deepest directory level shown.
        #[arg(long, value_name = "N", env = "REPOCTX_MAX_DEPTH")]
        max_depth: Option<usize>,
    },

    /// List the key files selected for each category.
    #[command(
        long_about = "Show which files the context command would pack, grouped by category in\n\
document order: Documentation, Entry Points, Config, Core.\n\n\
Examples:\n\
  repoctx keys\n\
  repoctx --format json keys\n"
    )]
    Keys {
        /// Files kept per category.
        #[arg(long, value_name = "N", env = "REPOCTX_MAX_FILES_PER_CATEGORY")]
        max_files_per_category: Option<usize>,
    },
}

/// Run the CLI command
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    let render_config = RenderConfig::with_pretty(format, cli.pretty);
    let output = cli.output.as_deref();
    let root = cli.root.as_path();

    match cli.command {
        Commands::Context {
            url,
            branch,
            pat,
            limits,
            stats,
            token_model,
        } => {
            let source = match url {
                Some(url) => {
                    if root != Path::new(".") {
                        bail!("--url cannot be combined with --root");
                    }
                    RepoSource::GitHub {
                        url,
                        branch,
                        token: pat,
                    }
                }
                None => RepoSource::Local(root.to_path_buf()),
            };
            let token_model: TokenModel = token_model.parse().map_err(anyhow::Error::msg)?;

            crate::flows::context::run_context(
                ContextOptions {
                    source,
                    limits: limits.apply(Limits::default()),
                    show_stats: stats,
                    token_model,
                },
                render_config,
                output,
            )
        }

        Commands::Files {
            paths,
            no_line_numbers,
            stats,
        } => crate::flows::listing::run_files(
            root,
            &paths,
            !no_line_numbers,
            stats,
            render_config,
            output,
        ),

        Commands::Tree { max_depth } => {
            let limits = LimitArgs {
                max_depth,
                ..Default::default()
            }
            .apply(Limits::default());
            crate::backends::tree::run_tree(root, &limits, render_config, output)
        }

        Commands::Keys {
            max_files_per_category,
        } => {
            let limits = LimitArgs {
                max_files_per_category,
                ..Default::default()
            }
            .apply(Limits::default());
            crate::backends::classify::run_keys(root, &limits, render_config, output)
        }
    }
}

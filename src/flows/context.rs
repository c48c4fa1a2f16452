//! Context flow - Budgeted repository context
//!
//! Combines the directory tree with the contents of the classified key files
//! into a single document. The tree is always emitted first and charged to the
//! budget; key files follow in fixed category order until the budget runs out.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::backends::acquire::RepoSource;
use crate::backends::classify::{find_key_files, KeyFiles};
use crate::backends::tree::{render_tree, TreeOptions};
use crate::core::budget::Budget;
use crate::core::file_reader::read_file_safe;
use crate::core::limits::Limits;
use crate::core::model::{CandidateFile, FileBlock, RenderedSection};
use crate::core::render::{Document, RenderConfig, Renderer};
use crate::core::tokenizer::{count_tokens, TokenModel};
use crate::core::util::{hash_bytes, truncate_string};

/// Bookkeeping for one assembled document
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextStats {
    /// Bytes charged for the tree section
    pub tree_bytes: usize,

    /// Bytes charged against the budget (tree + file content)
    pub consumed: usize,

    pub total_cap: usize,

    pub files_included: usize,

    /// Files cut to the per-file cap
    pub files_truncated: usize,

    /// Files cut by the global budget (at most one)
    pub files_budget_truncated: usize,

    /// Whether candidates were left out because the budget ran out
    pub budget_exhausted: bool,

    /// Size of the final document, titles and fences included
    pub document_bytes: usize,
}

/// A fully assembled context document
#[derive(Debug, Clone, Serialize)]
pub struct ContextReport {
    pub root: String,
    pub generated_at: String,
    pub limits: Limits,
    pub stats: ContextStats,
    pub sections: Vec<RenderedSection>,
    pub document: String,
}

impl Document for ContextReport {
    fn to_markdown(&self) -> String {
        self.document.clone()
    }
}

/// Read one candidate and charge its content to the budget
fn pack_file(
    candidate: &CandidateFile,
    limits: &Limits,
    budget: &mut Budget,
    stats: &mut ContextStats,
) -> FileBlock {
    let read = read_file_safe(&candidate.absolute_path, limits.per_file_cap);
    if read.truncated {
        stats.files_truncated += 1;
    }
    if !read.is_clean() {
        debug!(path = %candidate.relative_path, notes = ?read.notes, "file packed with notes");
    }

    let remaining = budget.remaining();
    let (content, budget_truncated) = if read.content.len() > remaining {
        let (cut, _) = truncate_string(&read.content, remaining);
        // Charge everything left so nothing else is packed after a cut
        budget.reserve(remaining);
        debug!(path = %candidate.relative_path, kept = cut.len(), "file cut by total budget");
        (cut.to_string(), true)
    } else {
        budget.reserve(read.content.len());
        (read.content, false)
    };

    if budget_truncated {
        stats.files_budget_truncated += 1;
    }
    stats.files_included += 1;

    FileBlock {
        path: candidate.relative_path.clone(),
        bytes: content.len(),
        source_bytes: read.size,
        hash: hash_bytes(content.as_bytes()),
        lossy: read.lossy_conversion,
        notes: read.notes,
        budget_truncated,
        content,
    }
}

/// Assemble the context document for an already resolved root
pub fn assemble_context(root: &Path, key_files: &KeyFiles, limits: &Limits) -> ContextReport {
    let mut budget = Budget::new(limits.total_cap);
    let mut stats = ContextStats {
        total_cap: budget.total(),
        ..Default::default()
    };

    let tree = render_tree(root, &TreeOptions::from(limits));
    stats.tree_bytes = budget.reserve(tree.len());
    let mut sections = vec![RenderedSection::tree(&tree)];

    for (category, candidates) in key_files.iter() {
        if stats.budget_exhausted {
            break;
        }

        let mut blocks = Vec::new();
        for candidate in candidates {
            if budget.is_exhausted() {
                debug!(category = %category, path = %candidate.relative_path, "budget exhausted, stopping");
                stats.budget_exhausted = true;
                break;
            }
            blocks.push(pack_file(candidate, limits, &mut budget, &mut stats));
        }

        if !blocks.is_empty() {
            sections.push(RenderedSection::category(category, blocks));
        }
    }

    let document = sections
        .iter()
        .map(RenderedSection::render)
        .collect::<Vec<_>>()
        .join("\n\n");

    stats.consumed = budget.consumed();
    stats.document_bytes = document.len();

    info!(
        files = stats.files_included,
        consumed = stats.consumed,
        total_cap = stats.total_cap,
        "context assembled"
    );

    ContextReport {
        root: root.display().to_string(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        limits: *limits,
        stats,
        sections,
        document,
    }
}

/// Options for the context command
#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub source: RepoSource,
    pub limits: Limits,
    pub show_stats: bool,
    pub token_model: TokenModel,
}

fn print_stats(name: &str, stats: &ContextStats, tokens: usize, model: TokenModel) {
    eprintln!("{} {}", "Context Statistics:".cyan().bold(), name);
    eprintln!(
        "   Files: {} included, {} over per-file cap",
        stats.files_included, stats.files_truncated
    );
    eprintln!(
        "   Budget: {} / {} bytes (tree {})",
        stats.consumed, stats.total_cap, stats.tree_bytes
    );
    eprintln!("   Document: {} bytes", stats.document_bytes);
    eprintln!("   Tokens: {} (model: {})", tokens, model);
    if stats.budget_exhausted || stats.files_budget_truncated > 0 {
        eprintln!(
            "   {} total budget reached, remaining key files omitted",
            "warning:".yellow().bold()
        );
    }
    eprintln!();
}

/// Run the context command
pub fn run_context(opts: ContextOptions, config: RenderConfig, output: Option<&Path>) -> Result<()> {
    let repo = opts
        .source
        .acquire()
        .context("Repository root is not available")?;

    let key_files = find_key_files(&repo.root, &opts.limits);
    let mut report = assemble_context(&repo.root, &key_files, &opts.limits);
    report.root = repo.source.clone();

    if opts.show_stats {
        let tokens = count_tokens(&report.document, opts.token_model);
        print_stats(&repo.name, &report.stats, tokens, opts.token_model);
    }

    Renderer::with_config(config).emit(&report, output)
}

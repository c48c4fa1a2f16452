//! Token estimation for assembled documents
//!
//! Reports how much of a model's context window a document will occupy.
//! BPE encodings come from tiktoken and are loaded lazily; when an encoding
//! cannot be loaded the count degrades to the ~4 chars/token heuristic.

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};
use tracing::warn;

/// Encodings available for `--stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// cl100k_base, a close proxy for most chat models
    #[default]
    Cl100k,
    /// o200k_base encoding (GPT-4o native)
    O200k,
    /// No encoding, ceil(chars / 4)
    Heuristic,
}

/// Accepted spellings for each model, canonical name first
const MODEL_ALIASES: &[(&str, TokenModel)] = &[
    ("cl100k", TokenModel::Cl100k),
    ("cl100k_base", TokenModel::Cl100k),
    ("gpt-4", TokenModel::Cl100k),
    ("claude", TokenModel::Cl100k),
    ("o200k", TokenModel::O200k),
    ("o200k_base", TokenModel::O200k),
    ("gpt-4o", TokenModel::O200k),
    ("heuristic", TokenModel::Heuristic),
    ("fast", TokenModel::Heuristic),
];

impl TokenModel {
    pub const ALL: [TokenModel; 3] = [TokenModel::Cl100k, TokenModel::O200k, TokenModel::Heuristic];

    pub fn name(&self) -> &'static str {
        match self {
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
            TokenModel::Heuristic => "heuristic",
        }
    }

    fn encoder(&self) -> Option<&'static CoreBPE> {
        let loaded: &'static Result<CoreBPE, String> = match self {
            TokenModel::Cl100k => &*CL100K,
            TokenModel::O200k => &*O200K,
            TokenModel::Heuristic => return None,
        };

        loaded
            .as_ref()
            .map_err(|e| warn!(model = self.name(), "{}, using heuristic estimate", e))
            .ok()
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MODEL_ALIASES
            .iter()
            .find(|(alias, _)| *alias == wanted)
            .map(|(_, model)| *model)
            .ok_or_else(|| {
                let names: Vec<&str> = TokenModel::ALL.iter().map(TokenModel::name).collect();
                format!("Unknown token model '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

static CL100K: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("cannot load cl100k_base: {}", e)));

static O200K: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("cannot load o200k_base: {}", e)));

/// Tokens `text` occupies under `model`
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    model
        .encoder()
        .map(|bpe| bpe.encode_with_special_tokens(text).len())
        .unwrap_or_else(|| estimate_tokens_heuristic(text))
}

/// ceil(chars / 4)
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

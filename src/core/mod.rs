//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Size budget tracking for document assembly
//! - Safe file reading with per-file caps
//! - The fixed assembly limits
//! - Data model (categories, sections, listings, errors)
//! - Rendering functions for different output formats
//! - Path normalization utilities
//! - Token counting for LLM context budgeting

pub mod budget;
pub mod file_reader;
pub mod limits;
pub mod model;
pub mod paths;
pub mod render;
pub mod tokenizer;
pub mod util;

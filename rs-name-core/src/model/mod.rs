//! Top-level module of the name generation system.
//!
//! Components, leaves first:
//! - Name records and table layout (`record`)
//! - Readable tabular sources and in-memory tables (`source`, `table`)
//! - Weighted sampling over cumulative frequencies (`sampler`)
//! - Source selection within a category (`category`)
//! - Fragment repair rules (`formatter`)
//! - Templates, configuration and the high-level `NameGenerator`

/// High-level interface: resolve, sample, format and compose a name.
pub mod generator;

/// Immutable configuration and its builder, including the US census layout.
pub mod config;

/// Per-call options (template, capitalization, selectors, extra rules).
pub mod generate_input;

/// Named slots of a name and the selector-keyed sources behind them.
pub mod category;

/// Weighted random draw of a record from a cumulative-frequency source.
pub mod sampler;

/// Capitalization and ordered regex repair rules.
pub mod formatter;

/// Parsing and rendering of `{placeholder}` templates.
pub mod template;

/// Readable tabular sources (file, memory, shared stream).
pub mod source;

/// Fully loaded tables, with an optional binary cache.
pub mod table;

/// Name records and table layout.
pub mod record;

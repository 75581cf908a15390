//! Frequency-weighted random name generation.
//!
//! This crate generates plausible personal names by:
//! - Drawing records from frequency-ranked name lists (e.g. US census tables)
//! - Repairing the sampled fragments (capitalization, `O'`, `St.`, `Mc`)
//! - Composing them with a `{given} {surname}` style template
//!
//! ```no_run
//! use rs_name_core::model::generate_input::GenerateInput;
//! use rs_name_core::model::generator::NameGenerator;
//!
//! let generator = NameGenerator::census("./data")?;
//! let input = GenerateInput::new().with_selector("given", "female");
//! println!("{}", generator.generate(&input)?);
//! # Ok::<(), rs_name_core::error::NameError>(())
//! ```

/// Name sources, sampling, formatting and composition.
pub mod model;

/// Error type shared by every component.
pub mod error;

/// I/O utilities (data folders, cache paths).
pub mod io;

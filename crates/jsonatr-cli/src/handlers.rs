//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

mod check;
mod completions;
mod eval;
mod transform;
mod utils;

pub use check::handle_check;
pub use completions::handle_completions;
pub use eval::handle_eval;
pub use transform::handle_transform;

//! Generate EQUATIONS.md from the equation registry.
//!
//! Writes the audit reference for every correlation registered in
//! liquefy_core, with categories, variables, references and source locations.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-equations
//! cargo run --bin gen-equations -- path/to/EQUATIONS.md
//! ```
//!
//! Without an argument the file is written to
//! `liquefy_core/src/equations/EQUATIONS.md` (relative to the workspace root).

use std::env;
use std::fs;
use std::path::PathBuf;

use liquefy_core::equations::{generate_equations_markdown, ALL_EQUATIONS};

const DEFAULT_OUTPUT: &str = "liquefy_core/src/equations/EQUATIONS.md";

fn main() {
    let output_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    println!("Generating EQUATIONS.md ({} equations)...", ALL_EQUATIONS.len());

    let markdown = generate_equations_markdown();

    match fs::write(&output_path, &markdown) {
        Ok(()) => {
            println!("Successfully wrote {} bytes to {}", markdown.len(), output_path.display());
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", output_path.display(), e);
            std::process::exit(1);
        }
    }
}

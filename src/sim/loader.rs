//! Program Loader.
//!
//! Reads APEX program text from disk and builds the instruction store the
//! CPU fetches from.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::common::SimError;
use crate::isa::parser::parse_program;
use crate::isa::CodeMemory;

/// Reads a program file.
///
/// # Returns
///
/// The file contents, or `SourceUnavailable` if it cannot be read.
pub fn read_source(path: &Path) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|e| SimError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Parses program text into code memory starting at `base`.
///
/// # Returns
///
/// `Parse` for malformed lines, `EmptyProgram` if no line holds an
/// instruction.
pub fn build_code(text: &str, base: u32) -> Result<CodeMemory, SimError> {
    let insns = parse_program(text)?;
    CodeMemory::new(base, insns)
}

/// Loads a program file into code memory starting at `base`.
pub fn load_program(path: &Path, base: u32) -> Result<CodeMemory, SimError> {
    let text = read_source(path)?;
    let code = build_code(&text, base)?;
    info!(
        path = %path.display(),
        instructions = code.len(),
        base,
        "program loaded"
    );
    Ok(code)
}

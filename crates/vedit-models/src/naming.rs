//! Deterministic output-filename derivation.
//!
//! Every proxy/edit output name is derived from its input filename plus an
//! operation prefix, so the directory contents alone identify what produced
//! each file.

/// Proxy output name for an uploaded original.
pub fn proxy_filename(original: &str) -> String {
    format!("proxy_{original}")
}

/// Edit output name for a cut or concat submitted against an original.
pub fn edit_filename(original: &str) -> String {
    format!("edit_{original}")
}

// src/utils.rs
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

use crate::config::Language;

/// Build a timestamped output file path
pub fn output_file_path(base: &Path, lang: Language) -> PathBuf {
    output_file_path_at(base, lang, Local::now().naive_local())
}

pub fn output_file_path_at(base: &Path, lang: Language, at: NaiveDateTime) -> PathBuf {
    base.join(format!(
        "resume_{}_{}.pdf",
        lang.code(),
        at.format("%Y%m%d_%H%M%S")
    ))
}

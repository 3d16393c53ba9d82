use std::path::{Path, PathBuf};

/// `<dir>/<input stem>_pncc.<ext>`
pub fn output_path(dir: &Path, input: &Path, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".into());
    dir.join(format!("{stem}_pncc.{ext}"))
}

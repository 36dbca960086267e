use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;

/// Collect per chromosome files named {prefix}_{chrom}.{suffix}, with an
/// optional .gz extension, from dir.  The returned paths are sorted on
/// chromosome name so output order does not depend on directory order.
pub fn find_chrom_files(dir: &Path, prefix: &str, suffix: &str) -> anyhow::Result<Vec<PathBuf>> {
    let reg = Regex::new(
        format!(
            "^{}_(.+)[.]{}(?:[.]gz)?$",
            regex::escape(prefix),
            regex::escape(suffix)
        )
        .as_str(),
    )?;

    let mut files = Vec::new();
    for f in dir
        .read_dir()
        .with_context(|| format!("Error checking input directory {}", dir.display()))?
    {
        let entry =
            f.with_context(|| format!("Could not get directory entry from {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            let name = entry.file_name().into_string().expect("Illegal file name");
            if let Some(c) = reg.captures(name.as_str()) {
                let chrom = c.get(1).unwrap().as_str();
                trace!("Adding file {} ({})", path.display(), chrom);
                files.push((chrom.to_owned(), path))
            }
        }
    }

    if files.is_empty() {
        Err(anyhow!(
            "No files matching {}_*.{} found in {}",
            prefix,
            suffix,
            dir.display()
        ))
    } else {
        debug!("{} input files found in {}", files.len(), dir.display());
        files.sort_unstable();
        Ok(files.drain(..).map(|(_, p)| p).collect())
    }
}

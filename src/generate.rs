//! Compile a directory tree of templates into Rust source files.

use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{Compiler, Error, Result};

/// The outcome of generating a directory of templates.
#[derive(Debug, Default)]
pub struct Report {
    /// The files that were written, in source order.
    pub generated: Vec<PathBuf>,
    /// The templates that failed and why, in source order.
    pub failed: Vec<(PathBuf, Error)>,
}

impl Report {
    /// Returns `true` if every template was generated.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Compiles every template under `src` into `dest`.
///
/// A failing template does not stop the others, it is recorded in the
/// report.
pub(crate) fn run(compiler: &Compiler, src: &Path, dest: &Path, package: &str) -> Result<Report> {
    let src = src
        .canonicalize()
        .map_err(|err| Error::io(err, "failed to open source directory", src))?;

    let files = templates(compiler, &src);
    debug!("found {} templates under {}", files.len(), src.display());

    let results: Vec<_> = files
        .into_par_iter()
        .map(|path| {
            let result = generate_file(compiler, &src, dest, &path, package);
            (path, result)
        })
        .collect();

    let mut report = Report::default();
    for (path, result) in results {
        match result {
            Ok(out) => {
                debug!("generated {} from {}", out.display(), path.display());
                report.generated.push(out);
            }
            Err(err) => {
                warn!("failed to generate {}\n{err:#}", path.display());
                report.failed.push((path, err));
            }
        }
    }

    info!(
        generated = report.generated.len(),
        failed = report.failed.len(),
        "generated templates from {}",
        src.display()
    );
    Ok(report)
}

/// Returns the templates under `root` sorted by path.
fn templates(compiler: &Compiler, root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name().follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("walk error: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = {
            let name = entry.file_name().to_string_lossy();
            compiler.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
        };
        if matches {
            files.push(entry.into_path());
        }
    }
    files
}

/// Compiles a single template and writes `<file name>.rs` into the mirrored
/// directory under `dest`.
fn generate_file(
    compiler: &Compiler,
    src: &Path,
    dest: &Path,
    path: &Path,
    package: &str,
) -> Result<PathBuf> {
    let source = fs::read_to_string(path)
        .map_err(|err| Error::io(err, "failed to read template", path))?;
    let code = compiler.compile(path, &source, package)?;

    let rel = path.strip_prefix(src).unwrap_or(path);
    let dir = match rel.parent() {
        Some(parent) => dest.join(parent),
        None => dest.to_path_buf(),
    };
    fs::create_dir_all(&dir)
        .map_err(|err| Error::io(err, "failed to create output directory", &dir))?;

    let file_name = path.file_name().unwrap_or_else(|| OsStr::new("template"));
    let mut out_name = file_name.to_os_string();
    out_name.push(".rs");
    let out = dir.join(out_name);

    write_atomic(&out, &dir, &code)?;
    Ok(out)
}

/// Writes the file through a temporary file in the same directory so that a
/// failure never leaves a partial file behind.
fn write_atomic(path: &Path, dir: &Path, content: &str) -> Result<()> {
    let mut file = NamedTempFile::new_in(dir)
        .map_err(|err| Error::io(err, "failed to create temporary file", dir))?;
    file.write_all(content.as_bytes())
        .map_err(|err| Error::io(err, "failed to write temporary file", file.path()))?;
    file.persist(path)
        .map_err(|err| Error::io(err.error, "failed to persist generated file", path))?;
    Ok(())
}

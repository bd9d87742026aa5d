// Zip a directory tree into a single archive file.

use crate::error::{BjspmError, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Recursively compress the contents of `source` into `dest`.
///
/// Entry names are relative to `source` and always use `/` separators;
/// names that are not valid UTF-8 are stored lossily. Symlinks are stored
/// as the file or directory they point to, and a dangling link is an
/// error. Sockets and FIFOs are skipped with a warning. Returns the
/// number of file entries written.
pub fn zip_directory(source: &Path, dest: &Path) -> Result<usize> {
    let file = File::create(dest).map_err(|e| BjspmError::io("Failed to create archive", dest, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0;
    for entry in WalkDir::new(source)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            BjspmError::io("Failed to read directory", path, io::Error::from(e))
        })?;
        let path = entry.path();
        // the archive may live under `source` when the caller asks for it
        if path == dest {
            continue;
        }
        let name = entry_name(source, path);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            zip.add_directory(name, options)?;
        } else if file_type.is_file() {
            zip.start_file(name, options)?;
            let mut input =
                File::open(path).map_err(|e| BjspmError::io("Failed to open file", path, e))?;
            io::copy(&mut input, &mut zip)
                .map_err(|e| BjspmError::io("Failed to compress file", path, e))?;
            files += 1;
        } else {
            log::warn!("skipping special file {}", path.display());
        }
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer).map_err(|e| BjspmError::io("Failed to write archive", dest, e))?;
    log::debug!("archived {files} files from {}", source.display());
    Ok(files)
}

fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.iter().any(|p| matches!(p, std::borrow::Cow::Owned(_))) {
        log::warn!("storing non-UTF-8 path {} with a lossy name", path.display());
    }
    parts.join("/")
}

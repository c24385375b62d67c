//! Resource directory export
//!
//! Packs every regular file under a root into a tar.gz under its
//! root-relative path. Names starting with `.` are skipped, and hidden
//! directories are not descended. Symlinks to files are archived with the
//! target's content; symlinks to directories are not followed.

use super::archive::ArchiveWriter;
use super::export::write_atomically;
use crate::errors::{io_error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Root-relative paths of every exportable file, in sorted order
pub fn collect_resources(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, Path::new(""), &mut files)?;
    Ok(files)
}

fn walk(root: &Path, relative: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let dir = root.join(relative);
    let mut entries = fs::read_dir(&dir)
        .map_err(|e| io_error("read_resource_dir", e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| io_error("read_resource_dir", e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = relative.join(&name);
        let file_type = entry
            .file_type()
            .map_err(|e| io_error("read_resource_dir", e))?;

        if file_type.is_dir() {
            walk(root, &path, files)?;
        } else if file_type.is_symlink() {
            // Dangling links fail here
            let target = fs::metadata(entry.path()).map_err(|e| io_error("read_resource", e))?;
            if target.is_file() {
                files.push(path);
            }
        } else if file_type.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// Write the resource archive for `root`; returns the number of files
pub fn export_resources<W: Write>(root: &Path, sink: W) -> Result<usize> {
    let files = collect_resources(root)?;
    let mut archive = ArchiveWriter::new(sink);

    for relative in &files {
        let file = File::open(root.join(relative)).map_err(|e| io_error("read_resource", e))?;
        let size = file
            .metadata()
            .map_err(|e| io_error("read_resource", e))?
            .len();
        archive.append(relative, size, file)?;
    }
    archive.finish()?;

    tracing::debug!(root = %root.display(), files = files.len(), "resources exported");
    Ok(files.len())
}

/// [`export_resources`] into a file that exists only if every file was read
pub fn export_resources_to_file(root: &Path, target: &Path) -> Result<usize> {
    write_atomically(target, |out| export_resources(root, out))
}

//! Archival capability: serialize directory trees into one container file.
//!
//! Two strategies behind one `archive` operation, selected as a tagged
//! variant rather than dynamic dispatch. Both archive each source with its
//! base name as the top-level entry and auto-create the destination's parent
//! directory.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crosspack_schema::ArchiveFormat;

/// Member extensions stored uncompressed in zip archives. Deflating content
/// that is already compressed wastes time for negative gain.
const STORED_EXTENSIONS: &[&str] = &[
    "7z", "bz2", "gif", "gz", "jar", "jpeg", "jpg", "png", "rar", "tgz", "xz", "zip", "zst",
];

/// Errors from the archival capability.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Filesystem or stream failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Zip container failure.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory walk failure while collecting members.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Archive strategy for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archiver {
    /// Zip with default-level deflate and selective compression.
    Zip,
    /// Tar wrapped in default-level gzip.
    TarGz,
}

impl From<ArchiveFormat> for Archiver {
    fn from(format: ArchiveFormat) -> Self {
        match format {
            ArchiveFormat::Zip => Self::Zip,
            ArchiveFormat::TarGz => Self::TarGz,
        }
    }
}

impl Archiver {
    /// Serialize `sources` into a single container at `dest`.
    ///
    /// Each source is archived as a tree rooted at its own base name, so a
    /// staging directory becomes the archive's top-level entry. The
    /// destination's parent directory is created when missing.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] if any source cannot be read or the
    /// container cannot be written.
    pub fn archive(self, sources: &[&Path], dest: &Path) -> Result<(), ArchiveError> {
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        tracing::debug!(?sources, dest = %dest.display(), strategy = ?self, "archiving");

        match self {
            Self::Zip => write_zip(sources, dest),
            Self::TarGz => write_tar_gz(sources, dest),
        }
    }
}

fn write_tar_gz(sources: &[&Path], dest: &Path) -> Result<(), ArchiveError> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    // Preserve symlinks instead of following them, so linked resources and
    // any symlinked build outputs stay links in the archive.
    builder.follow_symlinks(false);

    for source in sources {
        let name = base_name(source)?;
        if source.is_dir() {
            builder.append_dir_all(name, source)?;
        } else {
            builder.append_path_with_name(source, name)?;
        }
    }

    builder.finish()?;
    builder.into_inner()?.finish()?.flush()?;
    Ok(())
}

fn write_zip(sources: &[&Path], dest: &Path) -> Result<(), ArchiveError> {
    let file = File::create(dest)?;
    let mut writer = zip::ZipWriter::new(BufWriter::new(file));

    for source in sources {
        let name = base_name(source)?;
        if source.is_dir() {
            for entry in walkdir::WalkDir::new(source).sort_by_file_name() {
                let entry = entry?;
                let relative = entry
                    .path()
                    .strip_prefix(source)
                    .map_err(|e| ArchiveError::Io(io::Error::other(e)))?;
                let member = if relative.as_os_str().is_empty() {
                    name.to_string()
                } else {
                    format!("{name}/{}", relative.display())
                };
                if entry.file_type().is_dir() {
                    writer.add_directory(member, zip_options(entry.path())?)?;
                } else {
                    add_zip_file(&mut writer, entry.path(), &member)?;
                }
            }
        } else {
            add_zip_file(&mut writer, source, name)?;
        }
    }

    writer.finish()?.flush()?;
    Ok(())
}

fn add_zip_file(
    writer: &mut zip::ZipWriter<BufWriter<File>>,
    path: &Path,
    member: &str,
) -> Result<(), ArchiveError> {
    let method = if is_stored_extension(path) {
        CompressionMethod::Stored
    } else {
        CompressionMethod::Deflated
    };
    writer.start_file(member, zip_options(path)?.compression_method(method))?;

    let mut reader = BufReader::new(File::open(path)?);
    io::copy(&mut reader, writer)?;
    Ok(())
}

fn zip_options(path: &Path) -> Result<SimpleFileOptions, ArchiveError> {
    let options = SimpleFileOptions::default();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        Ok(options.unix_permissions(mode))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(options)
    }
}

fn is_stored_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            STORED_EXTENSIONS.contains(&ext.as_str())
        })
}

fn base_name(path: &Path) -> Result<&str, ArchiveError> {
    path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        ArchiveError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("source path has no usable base name: {}", path.display()),
        ))
    })
}

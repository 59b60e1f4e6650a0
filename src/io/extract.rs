//! Archive extraction module
//!
//! Handles the tar.zst and tar.gz archives the standalone builds ship as.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;
use zstd::stream::Decoder as ZstdDecoder;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("Archive layout error: missing {0} directory")]
    Layout(String),
}

/// Archive formats offered by the release assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarZst,
}

/// Detect archive format from file extension.
pub fn detect_format(path: &Path) -> Option<ArchiveFormat> {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".tar.zst") {
        Some(ArchiveFormat::TarZst)
    } else if path_str.ends_with(".tar.gz") || path_str.ends_with(".tgz") {
        Some(ArchiveFormat::TarGz)
    } else {
        None
    }
}

/// Extract an archive into `dest_dir`, auto-detecting its format.
///
/// The whole tree is unpacked as-is. The builds carry internal symlinks
/// (`bin/python` chains) and executable mode bits, both of which
/// [`tar::Archive::unpack`] preserves on Unix.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    let format = detect_format(archive_path).ok_or_else(|| {
        ExtractError::UnsupportedFormat(archive_path.to_string_lossy().into_owned())
    })?;

    let file = File::open(archive_path)?;
    let reader = BufReader::new(file);

    match format {
        ArchiveFormat::TarZst => extract_tar(ZstdDecoder::new(reader)?, dest_dir),
        ArchiveFormat::TarGz => extract_tar(flate2::read::GzDecoder::new(reader), dest_dir),
    }
}

/// Extract a tar archive from a reader.
fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let mut archive = tar::Archive::new(reader);
    archive.unpack(dest_dir)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn add_file(builder: &mut tar::Builder<impl Write>, path: &str, data: &[u8], mode: u32) {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }

    fn add_symlink(builder: &mut tar::Builder<impl Write>, path: &str, target: &str) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_size(0);
        header.set_cksum();
        builder.append_link(&mut header, path, target).unwrap();
    }

    fn write_tar_gz(path: &Path) {
        let gz = flate2::write::GzEncoder::new(
            File::create(path).unwrap(),
            flate2::Compression::default(),
        );
        let mut builder = tar::Builder::new(gz);
        add_file(
            &mut builder,
            "python/install/bin/python3.12",
            b"#!/bin/sh\necho 3.12.3\n",
            0o755,
        );
        add_symlink(&mut builder, "python/install/bin/python", "python3.12");
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn write_tar_zst(path: &Path) {
        let zst = zstd::stream::Encoder::new(File::create(path).unwrap(), 0).unwrap();
        let mut builder = tar::Builder::new(zst);
        add_file(&mut builder, "python/bin/python3.13", b"exe", 0o755);
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn detects_supported_formats() {
        assert_eq!(
            detect_format(Path::new("foo.tar.zst")),
            Some(ArchiveFormat::TarZst)
        );
        assert_eq!(
            detect_format(Path::new("foo.tar.gz")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(detect_format(Path::new("foo.tgz")), Some(ArchiveFormat::TarGz));
        assert_eq!(detect_format(Path::new("foo.zip")), None);
        assert_eq!(detect_format(Path::new("foo")), None);
    }

    #[test]
    fn extracts_tar_gz_tree() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("cpython-3.12.3.tar.gz");
        write_tar_gz(&archive);

        let dest = dir.path().join("out");
        extract_archive(&archive, &dest).unwrap();

        let exe = dest.join("python/install/bin/python3.12");
        assert!(exe.is_file());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&exe).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
            let link = dest.join("python/install/bin/python");
            assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
            assert_eq!(fs::read_link(&link).unwrap(), Path::new("python3.12"));
        }
    }

    #[test]
    fn extracts_tar_zst_tree() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("cpython-3.13.0.tar.zst");
        write_tar_zst(&archive);

        let dest = dir.path().join("out");
        extract_archive(&archive, &dest).unwrap();

        assert!(dest.join("python/bin/python3.13").is_file());
    }

    #[test]
    fn rejects_unknown_format() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("cpython-3.12.3.zip");
        fs::write(&archive, b"not an archive").unwrap();

        let err = extract_archive(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }
}

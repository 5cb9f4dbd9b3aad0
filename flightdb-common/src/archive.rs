//! ZIP compression for dump files
//!
//! Dumps compress well (SQL text is repetitive), and a zipped dump is what
//! the lab passes around. One file per archive on the compress side;
//! decompression extracts whatever the archive holds.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Compress a single file into a ZIP archive (Deflate). The entry is stored
/// under the input's file name with no directory components. Returns the
/// compressed archive size in bytes.
pub fn compress_file(input: &Path, output: &Path) -> Result<u64> {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("Input path has no file name: {:?}", input)))?;
    if !input.is_file() {
        return Err(Error::NotFound(format!(
            "Input file {} not found",
            input.display()
        )));
    }
    // File::create truncates the output before the input is read
    if output.exists() {
        let same = match (input.canonicalize(), output.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => input == output,
        };
        if same {
            return Err(Error::InvalidInput(format!(
                "Output {} is the input file itself",
                output.display()
            )));
        }
    }

    let mut reader = std::fs::File::open(input)?;
    let writer = std::fs::File::create(output)?;
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(file_name, options)?;
    std::io::copy(&mut reader, &mut zip)?;
    let writer = zip.finish()?;
    let size = writer.metadata()?.len();

    info!(
        input = %input.display(),
        output = %output.display(),
        compressed_bytes = size,
        "Compressed file"
    );
    Ok(size)
}

/// Extract every entry of a ZIP archive into `output_dir` (created if
/// missing). Returns the extracted file paths.
pub fn decompress_archive(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = std::fs::File::open(input)?;
    let mut archive = ZipArchive::new(file)?;
    std::fs::create_dir_all(output_dir)?;

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // enclosed_name rejects absolute paths and .. components
        let rel = match entry.enclosed_name() {
            Some(p) => p,
            None => {
                return Err(Error::InvalidInput(format!(
                    "Archive entry has an unsafe path: {}",
                    entry.name()
                )))
            }
        };
        let dest = output_dir.join(rel);
        if entry.is_dir() {
            std::fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = std::fs::File::create(&dest)?;
            std::io::copy(&mut entry, &mut out)?;
            extracted.push(dest);
        }
    }

    info!(
        input = %input.display(),
        output_dir = %output_dir.display(),
        files = extracted.len(),
        "Decompressed archive"
    );
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_compress_decompress_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dump.sql");
        let content = "CREATE TABLE Flight (flight_id INT);\n".repeat(100);
        fs::write(&input, &content).unwrap();

        let archive = dir.path().join("dump.zip");
        let size = compress_file(&input, &archive).unwrap();
        assert!(size > 0);
        // Repetitive SQL deflates well
        assert!(size < content.len() as u64);

        let out_dir = dir.path().join("extracted");
        let extracted = decompress_archive(&archive, &out_dir).unwrap();
        assert_eq!(extracted, vec![out_dir.join("dump.sql")]);
        assert_eq!(fs::read_to_string(&extracted[0]).unwrap(), content);
    }

    #[test]
    fn test_compress_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = compress_file(&dir.path().join("absent.sql"), &dir.path().join("out.zip"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_compress_input_without_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let result = compress_file(Path::new("/"), &dir.path().join("out.zip"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_compress_output_equal_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("backup.zip");
        let content = "INSERT INTO Booking VALUES (101, 1, 1, 120.00);\n".repeat(30);
        fs::write(&input, &content).unwrap();

        let result = compress_file(&input, &input);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        // The input survives untouched
        assert_eq!(fs::read_to_string(&input).unwrap(), content);

        // Same file reached through a different lexical path
        let aliased = dir.path().join(".").join("backup.zip");
        let result = compress_file(&input, &aliased);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(fs::read_to_string(&input).unwrap(), content);
    }

    #[test]
    fn test_decompress_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let result = decompress_archive(&dir.path().join("absent.zip"), dir.path());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_decompress_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.sql");
        fs::write(&input, "SELECT 1;").unwrap();
        let archive = dir.path().join("a.zip");
        compress_file(&input, &archive).unwrap();

        let nested = dir.path().join("deep").join("er");
        let extracted = decompress_archive(&archive, &nested).unwrap();
        assert!(extracted[0].starts_with(&nested));
        assert!(extracted[0].exists());
    }
}

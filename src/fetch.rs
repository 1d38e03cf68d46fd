//! Download and extraction of the RaspberrySet archive.
//!
//! RaspberrySet: Dataset of Annotated Raspberry Images for Object
//! Detection, published on Zenodo (https://zenodo.org/records/7014728).

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::config::DataDirs;
use crate::error::RaspberrySetError;

/// Fixed archive URL for the published RaspberrySet record.
pub const RASPBERRYSET_URL: &str = "https://zenodo.org/records/7014728/files/RaspberrySet.zip";

const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Download the RaspberrySet archive to the staging directory and
/// extract it under the processed-data directory keyed by `dataset`.
///
/// Re-running overwrites the staged archive and re-extracts; no
/// checksum verification is performed. Network and extraction failures
/// propagate to the caller without retries.
pub fn fetch_raspberryset(dataset: &str, dirs: &DataDirs) -> Result<(), RaspberrySetError> {
    info!("starting download of RaspberrySet from {RASPBERRYSET_URL}");

    let archive_path = dirs.archive_path(dataset);
    info!("downloading to {}", archive_path.display());
    download_archive(RASPBERRYSET_URL, &archive_path)?;
    info!("RaspberrySet archive downloaded to {}", archive_path.display());

    let extract_dir = dirs.dataset_dir(dataset);
    info!("extracting to {}", extract_dir.display());
    extract_archive(&archive_path, &extract_dir)?;
    info!("RaspberrySet extracted to {}", extract_dir.display());

    Ok(())
}

fn download_archive(url: &str, dest: &Path) -> Result<(), RaspberrySetError> {
    let mut response = ureq::get(url)
        .call()
        .map_err(|source| RaspberrySetError::Download {
            url: url.to_string(),
            source: Box::new(source),
        })?;

    let total_size = response
        .headers()
        .get("content-length")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    let bar = match total_size {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] [{wide_bar}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .expect("progress template is well-formed"),
            );
            bar
        }
        // No content-length: fall back to an unbounded byte counter.
        None => ProgressBar::new_spinner(),
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(dest)?;

    let mut reader = response.body_mut().as_reader();
    let mut chunk = [0u8; DOWNLOAD_CHUNK_SIZE];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        file.write_all(&chunk[..read])?;
        bar.inc(read as u64);
    }
    bar.finish_and_clear();

    Ok(())
}

fn extract_archive(archive_path: &Path, dest: &Path) -> Result<(), RaspberrySetError> {
    fs::create_dir_all(dest)?;

    let file = File::open(archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|source| RaspberrySetError::ArchiveExtract {
            path: archive_path.to_path_buf(),
            source,
        })?;

    archive
        .extract(dest)
        .map_err(|source| RaspberrySetError::ArchiveExtract {
            path: archive_path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;

    fn write_sample_zip(path: &Path) {
        let file = File::create(path).expect("create zip file");
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("classes.txt", SimpleFileOptions::default())
            .expect("start zip entry");
        writer
            .write_all(b"0 raspberry_ripe\n")
            .expect("write zip entry");
        writer
            .start_file("nested/img001.txt", SimpleFileOptions::default())
            .expect("start nested zip entry");
        writer
            .write_all(b"0 0.5 0.5 0.2 0.3\n")
            .expect("write nested zip entry");
        writer.finish().expect("finish zip");
    }

    #[test]
    fn extract_unpacks_all_entries() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let archive_path = temp.path().join("raspberryset.zip");
        write_sample_zip(&archive_path);

        let dest = temp.path().join("out");
        extract_archive(&archive_path, &dest).expect("extract archive");

        let classes = fs::read_to_string(dest.join("classes.txt")).expect("read classes.txt");
        assert_eq!(classes, "0 raspberry_ripe\n");
        let label =
            fs::read_to_string(dest.join("nested/img001.txt")).expect("read nested label");
        assert_eq!(label, "0 0.5 0.5 0.2 0.3\n");
    }

    #[test]
    fn extract_rejects_corrupt_archive() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let archive_path = temp.path().join("raspberryset.zip");
        fs::write(&archive_path, b"this is not a zip file").expect("write junk");

        let err = extract_archive(&archive_path, &temp.path().join("out"))
            .expect_err("corrupt archive should fail");
        assert!(matches!(err, RaspberrySetError::ArchiveExtract { .. }));
    }
}

//! Download of the Harvard-Oxford atlases into a local cache directory.
//!
//! The atlases ship inside the FSL atlas bundle, a gzip-compressed tar
//! archive. Only the two max-probability files are unpacked. A failed
//! download is fatal and not retried.

use crate::atlas::{Atlas, AtlasError, CORTICAL_ATLAS_FILE, SUBCORTICAL_ATLAS_FILE};

use flate2::read::GzDecoder;
use std::{
    fs,
    io::{self, Read},
    path::Path,
    time::Duration,
};
use tar::Archive;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Archive nilearn fetches the Harvard-Oxford atlases from
pub const HARVARD_OXFORD_URL: &str = "https://www.nitrc.org/frs/download.php/9902/HarvardOxford.tgz";

const ATLAS_FILES: [&str; 2] = [CORTICAL_ATLAS_FILE, SUBCORTICAL_ATLAS_FILE];
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Atlas download failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Atlas archive contains no {0}")]
    MissingFromArchive(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Atlas(#[from] AtlasError),
}

/// Whether both atlas files exist in `dir`
pub fn atlases_present(dir: &Path) -> bool {
    ATLAS_FILES.iter().all(|name| dir.join(name).is_file())
}

/// Load the atlases from `dir`, downloading them from `url` first if
/// either file is missing
pub fn load_or_fetch(dir: &Path, url: &str) -> Result<Atlas, FetchError> {
    if !atlases_present(dir) {
        fetch_atlases(dir, url)?;
    }
    Ok(Atlas::load_from_directory(dir)?)
}

/// Download the atlas archive and unpack both atlas files into `dir`
///
/// # Errors
///
/// Returns error if the request fails, the server does not answer with
/// success, or the archive lacks either atlas
pub fn fetch_atlases(dir: &Path, url: &str) -> Result<(), FetchError> {
    fs::create_dir_all(dir)?;
    info!(url, dir = %dir.display(), "downloading atlases");

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;
    let mut response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let mut archive = NamedTempFile::new_in(dir)?;
    let size = response.copy_to(archive.as_file_mut())?;
    debug!(bytes = size, "atlas archive downloaded");

    extract_atlases(archive.reopen()?, dir)
}

/// Unpack both atlas files from a gzip-compressed tar archive into `dir`
///
/// Entries are matched by file name wherever they sit in the archive. Each
/// file is written next to its destination and renamed into place.
pub fn extract_atlases<R: Read>(archive: R, dir: &Path) -> Result<(), FetchError> {
    let mut found = [false; ATLAS_FILES.len()];
    let mut archive = Archive::new(GzDecoder::new(archive));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let index = {
            let path = entry.path()?;
            path.file_name()
                .and_then(|name| ATLAS_FILES.iter().position(|file| name == *file))
        };
        let Some(index) = index else {
            continue;
        };

        let mut file = NamedTempFile::new_in(dir)?;
        io::copy(&mut entry, &mut file)?;
        file.persist(dir.join(ATLAS_FILES[index]))
            .map_err(|err| err.error)?;
        debug!(file = ATLAS_FILES[index], "atlas unpacked");
        found[index] = true;
    }

    match found.iter().position(|present| !present) {
        Some(missing) => Err(FetchError::MissingFromArchive(ATLAS_FILES[missing])),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::fixtures::int16_volume;
    use flate2::{Compression, write::GzEncoder};

    fn archive_with(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_extracts_nested_atlas_files() {
        let cortical = int16_volume((2, 2, 2), &[41; 8]);
        let subcortical = int16_volume((2, 2, 2), &[3; 8]);
        let archive = archive_with(&[
            ("data/atlases/HarvardOxford/HarvardOxford-cort-maxprob-thr0-1mm.nii.gz", b"skip"),
            (&format!("data/atlases/HarvardOxford/{CORTICAL_ATLAS_FILE}"), &cortical),
            (&format!("data/atlases/HarvardOxford/{SUBCORTICAL_ATLAS_FILE}"), &subcortical),
            ("data/atlases/HarvardOxford-Cortical.xml", b"<atlas/>"),
        ]);
        let dir = tempfile::tempdir().unwrap();

        extract_atlases(archive.as_slice(), dir.path()).unwrap();

        assert!(atlases_present(dir.path()));
        assert_eq!(fs::read(dir.path().join(CORTICAL_ATLAS_FILE)).unwrap(), cortical);
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names.len(), 2);

        let atlas = load_or_fetch(dir.path(), "http://127.0.0.1:9/unused").unwrap();
        assert_eq!(atlas.cortical().labels()[[1, 1, 1]], 41);
        assert_eq!(atlas.subcortical().labels()[[0, 0, 0]], 3);
    }

    #[test]
    fn test_archive_without_subcortical_atlas() {
        let archive = archive_with(&[(CORTICAL_ATLAS_FILE, b"cortical")]);
        let dir = tempfile::tempdir().unwrap();

        let err = extract_atlases(archive.as_slice(), dir.path()).unwrap_err();
        assert!(matches!(err, FetchError::MissingFromArchive(SUBCORTICAL_ATLAS_FILE)));
        assert!(!atlases_present(dir.path()));
    }

    #[test]
    fn test_corrupt_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_atlases(&b"not an archive"[..], dir.path()).unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }

    #[test]
    fn test_unreachable_server_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("HarvardOxford");

        let err = load_or_fetch(&cache, "http://127.0.0.1:9/HarvardOxford.tgz").unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
        assert!(!atlases_present(&cache));
    }
}

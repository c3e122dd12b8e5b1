use std::{
    fs,
    path::{Path, PathBuf},
};

/// Environment variable naming the Harvard-Oxford atlas directory
pub const ATLAS_DIR_ENV: &str = "DATSCAN_ATLAS_DIR";

pub const DEFAULT_FOLDER_PREFIX: &str = "Paciente ";
pub const DEFAULT_SCAN_SUBPATH: &str = "series4/Trodat1.dcm";

/// Location nilearn caches the FSL atlases in
pub fn default_atlas_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join("nilearn_data")
            .join("fsl")
            .join("data")
            .join("atlases")
            .join("HarvardOxford"),
    )
}

/// Directory convention of a patient folder tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLayout {
    /// Entry name prefix, followed by the patient number
    pub folder_prefix: String,
    /// Scan file below each patient entry
    pub scan_subpath: PathBuf,
}

impl Default for ScanLayout {
    fn default() -> Self {
        Self {
            folder_prefix: DEFAULT_FOLDER_PREFIX.to_owned(),
            scan_subpath: PathBuf::from(DEFAULT_SCAN_SUBPATH),
        }
    }
}

impl ScanLayout {
    pub fn matches(&self, folder_name: &str) -> bool {
        folder_name.starts_with(&self.folder_prefix)
    }

    pub fn scan_path(&self, patient_dir: &Path) -> PathBuf {
        patient_dir.join(&self.scan_subpath)
    }

    /// Number used to name report files
    ///
    /// Taken from the last word of the patient folder (two levels above the
    /// scan) when that folder follows the naming convention, the patient id
    /// otherwise.
    pub fn patient_number(&self, scan_path: &Path, patient_id: &str) -> String {
        let keyword = self.folder_prefix.trim();
        patient_folder_name(&resolve_scan_path(scan_path))
            .filter(|name| !keyword.is_empty() && name.contains(keyword))
            .and_then(|name| name.split_whitespace().last().map(str::to_owned))
            .unwrap_or_else(|| patient_id.to_owned())
    }
}

/// Absolute form of a scan path, so relative paths still have parent
/// directories to name the patient by
///
/// Paths that cannot be resolved are returned unchanged.
pub fn resolve_scan_path(scan_path: &Path) -> PathBuf {
    fs::canonicalize(scan_path).unwrap_or_else(|_| scan_path.to_path_buf())
}

/// Name of the directory two levels above a scan file
pub fn patient_folder_name(scan_path: &Path) -> Option<String> {
    scan_path
        .parent()?
        .parent()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Where reports and optional overlays are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    pub overlay_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overlay_dir: None,
        }
    }
}

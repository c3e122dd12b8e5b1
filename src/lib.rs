//! # DaTscan SBR library
//!
//! This crate computes striatal specific binding ratios (SBR) and their
//! left/right asymmetry from DaTscan SPECT volumes stored as multi-frame
//! DICOM files.
//!
//! The Harvard-Oxford maximum-probability atlases locate the caudate and
//! putamen (subcortical atlas) and the occipital cortex (cortical atlas),
//! which serves as the non-specific reference region. For every analysed
//! slice:
//!  - the paired atlas slice is picked at a fixed offset and rotated
//!  - it is resampled with linear interpolation and padded to the patient
//!    slice shape
//!  - the mean intensity under each label is compared to the occipital mean
//!
//! Slice ratios are averaged per patient and each structure is classified as
//! left-dominant, right-dominant or symmetric. Patient and atlas are not
//! registered; the fixed pairing is the default [`AlignmentStrategy`].
//!
//! Slices of one patient are processed in parallel using rayon. The atlas
//! is loaded once and borrowed by every analysis.
//!
//! # Examples
//!
//! ## Analysing a single scan
//!
//! ```no_run
//! # use datscan_sbr::{Analyzer, Atlas, ScanLayout, Structure};
//! let atlas = Atlas::load_from_directory("atlases/HarvardOxford")
//!     .expect("should have loaded the Harvard-Oxford atlases");
//! let analyzer = Analyzer::new(&atlas);
//! let analysis = analyzer
//!     .analyze_file("Paciente 1/series4/Trodat1.dcm", &ScanLayout::default())
//!     .expect("should have analysed the scan");
//! println!("caudate: {}", analysis.summary.asymmetry(Structure::Caudate).label);
//! ```
//!
//! ## Analysing a folder of patients
//!
//! ```no_run
//! # use datscan_sbr::{Analyzer, Atlas, ScanLayout, batch::run_batch};
//! # use std::path::Path;
//! # let atlas = Atlas::load_from_directory("atlases/HarvardOxford").unwrap();
//! let analyzer = Analyzer::new(&atlas);
//! let report = run_batch(&analyzer, Path::new("patients"), &ScanLayout::default())
//!     .expect("should have listed the patient folder");
//! for (entry, error) in report.failures() {
//!     eprintln!("{}: {error}", entry.folder_name);
//! }
//! ```

pub mod asymmetry;
pub mod atlas;
pub mod batch;
pub mod config;
pub mod enums;
pub mod fetch;
pub mod geometry;
mod interpolator;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod regions;
pub mod report;
pub mod sampler;
pub mod sbr;
pub mod volume;
pub mod volume_loader;

pub use atlas::{Atlas, AtlasError, AtlasVolume};
pub use config::ScanLayout;
pub use enums::{Asymmetry, AtlasKind, Rotation, Side, Structure};
pub use geometry::{AlignmentStrategy, FixedOffsetAlignment};
pub use pipeline::{AnalysisError, Analyzer, PatientAnalysis};
pub use regions::Region;
pub use sbr::{PatientSummary, SliceMetrics};
pub use volume::Volume;
pub use volume_loader::{ScanLoader, ScanLoaderError};

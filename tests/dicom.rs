mod common;

use common::*;
use datscan_sbr::{
    AnalysisError, Analyzer, Asymmetry, ScanLayout, ScanLoader, ScanLoaderError,
};
use ndarray::Array3;
use std::fs;

#[test]
fn test_load_multiframe_scan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.dcm");
    let frames = Array3::from_shape_fn((3, 4, 5), |(z, y, x)| (z * 100 + y * 10 + x) as u16);
    write_scan(&path, &frames, Some("TRODAT-01"));

    let volume = ScanLoader::load_from_file(&path).unwrap();

    assert_eq!(volume.dim(), (3, 4, 5));
    assert_eq!(volume.patient_id(), "TRODAT-01");
    assert_eq!(volume.data()[[2, 3, 4]], 234.0);
    assert_eq!(volume.data()[[1, 0, 2]], 102.0);
}

#[test]
fn test_missing_patient_id_uses_patient_folder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Paciente 9").join("series4").join("Trodat1.dcm");
    write_scan(&path, &Array3::from_elem((2, 3, 3), 7), None);

    let volume = ScanLoader::load_from_file(&path).unwrap();
    assert_eq!(volume.patient_id(), "Paciente 9");
}

#[test]
fn test_unreadable_scan_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.dcm");
    fs::write(&path, b"definitely not DICOM").unwrap();

    let err = ScanLoader::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ScanLoaderError::Dicom(_)));

    let missing = ScanLoader::load_from_file(dir.path().join("absent.dcm"));
    assert!(missing.is_err());
}

#[test]
fn test_analyze_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Paciente 12").join("series4").join("Trodat1.dcm");
    write_scan(&path, &phantom_frames(36, ROWS, COLS), Some("ID-12"));

    let atlas = phantom_atlas(50);
    let analyzer = Analyzer::new(&atlas);
    let analysis = analyzer.analyze_file(&path, &ScanLayout::default()).unwrap();

    assert_eq!(analysis.patient_id, "ID-12");
    assert_eq!(analysis.patient_number, "12");
    assert_eq!(analysis.source_path.as_deref(), Some(path.as_path()));
    assert_eq!(analysis.slices.len(), 32);
    assert_eq!(analysis.slices[0].source_slice, 4);
    assert_eq!(analysis.summary.caudate.label, Asymmetry::LeftDominant);
    assert_eq!(analysis.summary.putamen.label, Asymmetry::Symmetric);
}

#[test]
fn test_analyze_file_reports_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.dcm");
    fs::write(&path, b"DICM").unwrap();

    let atlas = phantom_atlas(50);
    let analyzer = Analyzer::new(&atlas);
    let err = analyzer.analyze_file(&path, &ScanLayout::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Load(_)));
}

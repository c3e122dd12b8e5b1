//! Runs alone in its own binary: it changes the working directory.

mod common;

use common::*;
use datscan_sbr::{Analyzer, ScanLayout, ScanLoader};
use std::env;

#[test]
fn test_relative_scan_path_without_patient_id() {
    let root = tempfile::tempdir().unwrap();
    let series = root.path().join("Paciente 5").join("series4");
    write_scan(&series.join("Trodat1.dcm"), &phantom_frames(32, ROWS, COLS), None);

    let previous = env::current_dir().unwrap();
    env::set_current_dir(&series).unwrap();

    let volume = ScanLoader::load_from_file("Trodat1.dcm");
    let atlas = phantom_atlas(50);
    let analysis = Analyzer::new(&atlas).analyze_file("Trodat1.dcm", &ScanLayout::default());

    env::set_current_dir(previous).unwrap();

    assert_eq!(volume.unwrap().patient_id(), "Paciente 5");
    let analysis = analysis.unwrap();
    assert_eq!(analysis.patient_id, "Paciente 5");
    assert_eq!(analysis.patient_number, "5");
}

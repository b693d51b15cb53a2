/*!
 * Tests for the CSV audit report and output naming
 */

use std::path::Path;

use chrono::{Local, TimeZone};

use cad_translator::document::{Drawing, Entity, JsonDrawingStore};
use cad_translator::file_utils::FileManager;
use cad_translator::pipeline::report::REPORT_HEADERS;
use cad_translator::pipeline::{PipelineRun, RunOptions};
use cad_translator::providers::mock::MockProvider;
use cad_translator::translation::PairKey;

use crate::common::{create_temp_dir, mock_service, sample_drawing, save_drawing};

/// Rows of a report, header included, after checking the byte order mark
fn read_report(path: &Path) -> Vec<Vec<String>> {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "report must start with a BOM");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(&bytes[3..]);
    reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_report_afterRun_shouldHoldOneRowPerItem() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();
    let output = dir.path().join("fr_plan.json");
    let report = FileManager::report_path(&output);
    let provider = MockProvider::working().with_responses([("天花", "variole")]);

    let mut run = PipelineRun::new(
        JsonDrawingStore::default(),
        mock_service(provider),
        RunOptions::new(PairKey::ZhToFr),
    );
    let summary = run.run(&input, &output, Some(&report)).await.unwrap();

    assert_eq!(summary.report.as_deref(), Some(report.as_path()));
    let rows = read_report(&report);
    assert_eq!(rows.len(), summary.found + 1);
    assert_eq!(rows[0], REPORT_HEADERS.to_vec());
    assert_eq!(rows[1], vec!["ANNO", "modelspace", "天花", "plafond"]);
    assert_eq!(rows[2][2], r"{\fSimSun|b0|i0|c134;卫生间}");
    assert_eq!(rows[2][3], "salle de bain");
    assert_eq!(rows[3][..2], ["TITLE", "A1"]);
}

#[tokio::test]
async fn test_report_withCommasAndBreaks_shouldStayOneRecordPerItem() {
    let dir = create_temp_dir().unwrap();
    let drawing = Drawing::new()
        .with_modelspace(Entity::text("A,B", "Sortie, secours"))
        .with_modelspace(Entity::text("0", "Escalier \"principal\""));
    let input = save_drawing(dir.path(), "plan.json", &drawing).unwrap();
    let output = dir.path().join("zh_plan.json");
    let report = FileManager::report_path(&output);

    let mut run = PipelineRun::new(
        JsonDrawingStore::default(),
        mock_service(MockProvider::working()),
        RunOptions::new(PairKey::FrToZh),
    );
    run.run(&input, &output, Some(&report)).await.unwrap();

    let rows = read_report(&report);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "A,B");
    assert_eq!(rows[1][2], "Sortie, secours");
    assert_eq!(rows[2][3], "[zh] Escalier \"principal\"");
}

#[test]
fn test_outputNaming_shouldBeRecognizedOnNextFolderRun() {
    let dir = create_temp_dir().unwrap();
    save_drawing(dir.path(), "b_niveau.json", &sample_drawing()).unwrap();
    save_drawing(dir.path(), "a_rdc.json", &sample_drawing()).unwrap();

    let timestamp = Local.with_ymd_and_hms(2025, 11, 30, 17, 45, 0).unwrap();
    let produced = dir
        .path()
        .join(FileManager::output_filename("a_rdc.json", "fr", timestamp));
    std::fs::write(&produced, "{}").unwrap();
    std::fs::write(FileManager::report_path(&produced), "").unwrap();

    assert_eq!(
        produced.file_name().unwrap().to_string_lossy(),
        "fr_a_rdc_17h45_30-11-25.json"
    );
    let drawings = FileManager::find_drawings(dir.path()).unwrap();
    let names: Vec<String> = drawings
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a_rdc.json", "b_niveau.json"]);
}

#[test]
fn test_generateOutputPath_shouldStayInOutputDir() {
    let dir = create_temp_dir().unwrap();
    let output = FileManager::generate_output_path("/plans/rdc.json", dir.path(), "zh");

    assert_eq!(output.parent(), Some(dir.path()));
    assert!(FileManager::is_produced_output(&output));
    assert!(
        FileManager::report_path(&output)
            .to_string_lossy()
            .ends_with("_report.csv")
    );
}

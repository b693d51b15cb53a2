/*!
 * End-to-end tests: drawing on disk -> translation -> drawing on disk
 */

use std::path::Path;

use encoding_rs::GBK;
use tokio::sync::mpsc;

use cad_translator::app_config::Config;
use cad_translator::app_controller::Controller;
use cad_translator::document::{Drawing, ElementRef, Entity, JsonDrawingStore, RegionRef};
use cad_translator::errors::PipelineError;
use cad_translator::pipeline::{
    CancellationToken, PipelineRun, ProgressEvent, RunOptions, RunState,
};
use cad_translator::providers::mock::MockProvider;
use cad_translator::sanitizer::RawText;
use cad_translator::translation::{PairKey, TranslationOutcome};

use crate::common::{
    create_temp_dir, init_test_logging, load_drawing, mock_service, sample_drawing, save_drawing,
};

fn text_at(drawing: &Drawing, region: RegionRef, index: usize) -> Option<RawText> {
    drawing
        .entity(ElementRef::new(region, index))
        .and_then(|entity| entity.raw_text())
        .cloned()
}

fn new_run(provider: MockProvider, options: RunOptions) -> PipelineRun<JsonDrawingStore> {
    init_test_logging();
    PipelineRun::new(JsonDrawingStore::default(), mock_service(provider), options)
}

#[tokio::test]
async fn test_run_withCeilingLabel_shouldWriteGlossaryTerm() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();
    let output = dir.path().join("plan_fr.json");
    let provider = MockProvider::working().with_responses([("天花", "variole")]);

    let mut run = new_run(provider.clone(), RunOptions::new(PairKey::ZhToFr));
    let summary = run.run(&input, &output, None).await.unwrap();

    let translated = load_drawing(&output).unwrap();
    assert_eq!(
        text_at(&translated, RegionRef::Primary, 0),
        Some(RawText::from("plafond"))
    );
    assert_eq!(summary.state, RunState::Done);
    assert_eq!(run.state(), RunState::Done);
    assert_eq!(summary.output.as_deref(), Some(output.as_path()));
    assert!(summary.report.is_none());
}

#[tokio::test]
async fn test_run_withSampleDrawing_shouldTranslateCanvasOnly() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();
    let output = dir.path().join("plan_fr.json");
    let provider = MockProvider::working();

    let mut run = new_run(provider.clone(), RunOptions::new(PairKey::ZhToFr));
    let summary = run.run(&input, &output, None).await.unwrap();

    assert_eq!(summary.found, 3);
    assert_eq!(summary.translated, 3);
    assert_eq!(summary.written, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(provider.request_count(), 3);

    let translated = load_drawing(&output).unwrap();
    assert_eq!(
        text_at(&translated, RegionRef::Primary, 2),
        Some(RawText::from("12.5"))
    );
    assert_eq!(
        text_at(&translated, RegionRef::Primary, 3),
        Some(RawText::from("salle de bain"))
    );
    assert_eq!(
        text_at(&translated, RegionRef::Layout(0), 0),
        Some(RawText::from("[fr] 一层平面图"))
    );
    assert_eq!(
        text_at(&translated, RegionRef::Group(0), 0),
        Some(RawText::from("门"))
    );
    assert_eq!(translated.modelspace[1], Entity::line("WALL"));

    // Input drawing is left untouched
    assert_eq!(load_drawing(&input).unwrap(), sample_drawing());
}

#[tokio::test]
async fn test_run_withBlocksIncluded_shouldSkipSystemBlocks() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();
    let output = dir.path().join("plan_fr.json");
    let provider = MockProvider::working().with_responses([("门", "porte")]);

    let options = RunOptions {
        include_groups: true,
        ..RunOptions::new(PairKey::ZhToFr)
    };
    let mut run = new_run(provider.clone(), options);
    let summary = run.run(&input, &output, None).await.unwrap();

    assert_eq!(summary.found, 4);
    let translated = load_drawing(&output).unwrap();
    assert_eq!(
        text_at(&translated, RegionRef::Group(0), 0),
        Some(RawText::from("porte"))
    );
    assert_eq!(
        text_at(&translated, RegionRef::Group(1), 0),
        Some(RawText::from("图框"))
    );
    let locations: Vec<&str> = run.items().iter().map(|i| i.location.as_str()).collect();
    assert!(locations.contains(&"block:DOOR"));
    assert!(!locations.iter().any(|l| l.contains("Paper_Space")));
}

#[tokio::test]
async fn test_run_withMTextFont_shouldWrapTranslatedMText() {
    let dir = create_temp_dir().unwrap();
    let drawing = Drawing::new()
        .with_modelspace(Entity::text("0", "Cuisine"))
        .with_modelspace(Entity::mtext("0", r"Salle\Pde bain"));
    let input = save_drawing(dir.path(), "plan.json", &drawing).unwrap();
    let output = dir.path().join("plan_zh.json");
    let provider = MockProvider::working().with_responses([("Cuisine", "厨房"), ("Salle de bain", "卫生间")]);

    let options = RunOptions {
        mtext_font: Some("SimSun".to_string()),
        ..RunOptions::new(PairKey::FrToZh)
    };
    let mut run = new_run(provider.clone(), options);
    run.run(&input, &output, None).await.unwrap();

    let translated = load_drawing(&output).unwrap();
    assert_eq!(
        text_at(&translated, RegionRef::Primary, 0),
        Some(RawText::from("厨房"))
    );
    assert_eq!(
        text_at(&translated, RegionRef::Primary, 1),
        Some(RawText::from(r"{\fSimSun|b0|i0|c134;卫生间}"))
    );
    assert_eq!(provider.requests()[1].text, "Salle de bain");
}

#[tokio::test]
async fn test_run_withFrenchLabels_shouldSkipChineseAndResolveLevels() {
    let dir = create_temp_dir().unwrap();
    let drawing = Drawing::new()
        .with_modelspace(Entity::text("ANNO", "RDC"))
        .with_modelspace(Entity::text("ANNO", "已有中文"))
        .with_modelspace(Entity::text("AXIS", "[A-1]"))
        .with_modelspace(Entity::text("ANNO", "Porte"));
    let input = save_drawing(dir.path(), "plan.json", &drawing).unwrap();
    let output = dir.path().join("plan_zh.json");
    let provider = MockProvider::working().with_responses([("Porte", "门")]);

    let mut run = new_run(provider.clone(), RunOptions::new(PairKey::FrToZh));
    let summary = run.run(&input, &output, None).await.unwrap();

    // Chinese text has no Latin letter and never becomes an item
    assert_eq!(summary.found, 3);
    assert_eq!(summary.skipped, 2);
    assert_eq!(provider.request_count(), 1);

    let outcomes: Vec<_> = run.items().iter().filter_map(|i| i.outcome.clone()).collect();
    assert_eq!(
        outcomes,
        vec![
            TranslationOutcome::ResolvedLocally,
            TranslationOutcome::SkippedCode,
            TranslationOutcome::Translated,
        ]
    );

    let translated = load_drawing(&output).unwrap();
    assert_eq!(text_at(&translated, RegionRef::Primary, 0), Some(RawText::from("底层")));
    assert_eq!(text_at(&translated, RegionRef::Primary, 1), Some(RawText::from("已有中文")));
    assert_eq!(text_at(&translated, RegionRef::Primary, 2), Some(RawText::from("[A-1]")));
    assert_eq!(text_at(&translated, RegionRef::Primary, 3), Some(RawText::from("门")));
}

#[tokio::test]
async fn test_run_withRejectedLanguage_shouldKeepOriginalAndFinish() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();
    let output = dir.path().join("plan_fr.json");
    let provider = MockProvider::rejecting_all();

    let mut run = new_run(provider.clone(), RunOptions::new(PairKey::ZhToFr));
    let summary = run.run(&input, &output, None).await.unwrap();

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.translated, 0);
    assert_eq!(summary.written, 0);
    assert_eq!(provider.request_count(), 6);

    let translated = load_drawing(&output).unwrap();
    assert_eq!(text_at(&translated, RegionRef::Primary, 0), Some(RawText::from("天花")));
    assert_eq!(
        text_at(&translated, RegionRef::Layout(0), 0),
        Some(RawText::from("一层平面图"))
    );
}

#[tokio::test]
async fn test_run_withDamagedStoredText_shouldPurgeEveryRegion() {
    let dir = create_temp_dir().unwrap();
    let drawing = Drawing::new()
        .with_modelspace(Entity::text("ANNO", "走廊\u{FEFF}"))
        .with_block("*Model_Space", vec![Entity::text("0", "图\u{0007}框")]);
    let input = save_drawing(dir.path(), "plan.json", &drawing).unwrap();
    let output = dir.path().join("plan_fr.json");

    let mut run = new_run(MockProvider::working(), RunOptions::new(PairKey::ZhToFr));
    run.run(&input, &output, None).await.unwrap();

    let translated = load_drawing(&output).unwrap();
    assert_eq!(text_at(&translated, RegionRef::Primary, 0), Some(RawText::from("couloir")));
    assert_eq!(text_at(&translated, RegionRef::Group(0), 0), Some(RawText::from("图框")));
}

#[tokio::test]
async fn test_run_withGbkDrawing_shouldReadAndSaveAsUtf8() {
    let dir = create_temp_dir().unwrap();
    let input = dir.path().join("legacy.json");
    let json = r#"{"modelspace":[{"type":"TEXT","layer":"ANNO","text":"楼梯","handle":"2F"}]}"#;
    let (bytes, _, _) = GBK.encode(json);
    std::fs::write(&input, bytes).unwrap();
    let output = dir.path().join("legacy_fr.json");

    let mut run = new_run(MockProvider::working(), RunOptions::new(PairKey::ZhToFr));
    run.run(&input, &output, None).await.unwrap();

    let saved = std::fs::read_to_string(&output).unwrap();
    assert!(saved.contains("escalier"));
    assert!(saved.contains("\"handle\""));
}

#[tokio::test]
async fn test_run_withProgressChannel_shouldEmitEveryItem() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();
    let output = dir.path().join("plan_fr.json");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut run = new_run(MockProvider::working(), RunOptions::new(PairKey::ZhToFr)).with_progress(tx);
    let run_id = run.run_id();
    let summary = run.run(&input, &output, None).await.unwrap();
    drop(run);

    let mut done = 0;
    let mut finished = None;
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::ItemDone { run_id: id, total, .. } => {
                assert_eq!(id, run_id);
                assert_eq!(total, 3);
                done += 1;
            }
            ProgressEvent::Finished(last) => finished = Some(last),
            _ => {}
        }
    }
    assert_eq!(done, summary.found);
    assert_eq!(finished, Some(summary));
}

#[tokio::test]
async fn test_run_withCancelledToken_shouldNotSaveDrawing() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();
    let output = dir.path().join("plan_fr.json");
    let report = dir.path().join("plan_fr_report.csv");
    let token = CancellationToken::new();
    token.cancel();
    let provider = MockProvider::working();

    let mut run = new_run(provider.clone(), RunOptions::new(PairKey::ZhToFr)).with_cancellation(token);
    let result = run.run(&input, &output, Some(&report)).await;

    assert!(matches!(
        result,
        Err(PipelineError::Cancelled { processed: 0, total: 3 })
    ));
    assert_eq!(run.state(), RunState::Cancelled);
    assert_eq!(provider.request_count(), 0);
    assert!(!output.exists());
    assert!(report.exists());
}

#[tokio::test]
async fn test_run_withUnwritableOutput_shouldStillWriteReport() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();
    let output = dir.path().join("missing").join("plan_fr.json");
    let report = dir.path().join("plan_fr_report.csv");

    let mut run = new_run(MockProvider::working(), RunOptions::new(PairKey::ZhToFr));
    let result = run.run(&input, &output, Some(&report)).await;

    match result {
        Err(PipelineError::DocumentWrite { report: written, .. }) => {
            assert_eq!(written.as_deref(), Some(report.as_path()));
        }
        other => panic!("expected a write failure, got {:?}", other),
    }
    assert_eq!(run.state(), RunState::Failed);
    assert!(report.exists());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_run_withUnreadableInput_shouldFailBeforeTranslating() {
    let dir = create_temp_dir().unwrap();
    let input = dir.path().join("broken.json");
    std::fs::write(&input, b"{\"modelspace\": [").unwrap();
    let provider = MockProvider::working();

    let mut run = new_run(provider.clone(), RunOptions::new(PairKey::ZhToFr));
    let result = run.run(&input, &dir.path().join("out.json"), None).await;

    assert!(matches!(result, Err(PipelineError::DocumentRead(_))));
    assert_eq!(run.state(), RunState::Failed);
    assert_eq!(provider.request_count(), 0);
}

#[test]
fn test_controllerExtract_shouldFollowBlockSetting() {
    let dir = create_temp_dir().unwrap();
    let input = save_drawing(dir.path(), "plan.json", &sample_drawing()).unwrap();

    let controller = Controller::with_config(Config::default()).unwrap();
    let extraction = controller.extract(&input).unwrap();
    assert_eq!(extraction.items.len(), 3);
    assert_eq!(extraction.skipped, 1);

    let mut config = Config::default();
    config.document.include_blocks = true;
    let controller = Controller::with_config(config).unwrap();
    let extraction = controller.extract(Path::new(&input)).unwrap();
    assert_eq!(extraction.items.len(), 4);
    assert!(extraction.items.iter().all(|item| item.translated_text.is_none()));
}

#[test]
fn test_controllerRun_withMissingInput_shouldFailBeforeTranslating() {
    let dir = create_temp_dir().unwrap();
    let mut config = Config::default();
    config.connectivity.enabled = false;
    let controller = Controller::with_config(config).unwrap();

    let result = tokio_test::block_on(async {
        controller
            .run(&dir.path().join("absent.json"), None, true)
            .await
    });

    let error = result.unwrap_err();
    assert!(error.to_string().contains("does not exist"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

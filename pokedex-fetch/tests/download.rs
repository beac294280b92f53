mod support;

use tokio::sync::mpsc;
use tokio::time::Duration;

use pokedex_core::{ArtifactLayout, EntityOutcome, MetadataRecord};
use pokedex_fetch::*;
use pokedex_lib::{ArtifactProcessor, MetadataWriter, sha256_hex};
use support::*;

fn writer(dir: &tempfile::TempDir) -> MetadataWriter {
    MetadataWriter::new(ArtifactLayout::new(dir.path().join("images")))
}

async fn run(
    resolver: &AssetResolver<StubTransport>,
    writer: &MetadataWriter,
    options: DownloadOptions,
    cancel: &CancellationFlag,
) -> (Result<DownloadReport, DownloadError>, Vec<DownloadEvent>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let result = run_download(
        resolver,
        &ArtifactProcessor::default(),
        writer,
        &options.without_pauses(),
        cancel,
        tx,
    )
    .await;
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    (result, events)
}

#[tokio::test]
async fn run_saves_each_entity_and_records_failures() {
    let dir = tempfile::tempdir().unwrap();
    let stub = StubTransport::new();
    let png1 = serve_entity(&stub, 1, "bulbasaur");
    serve_entity(&stub, 2, "ivysaur");
    stub.always(&detail_url(3), ok(detail_json(3, "venusaur", None, None)));
    serve_entity(&stub, 4, "charmander");
    let resolver = resolver(stub, 2);
    let writer = writer(&dir);

    let (result, events) = run(
        &resolver,
        &writer,
        DownloadOptions::new(1, 4, 2),
        &CancellationFlag::new(),
    )
    .await;
    let report = result.unwrap();

    assert_eq!(report.summary.results.len(), 4);
    assert_eq!(report.summary.saved_count(), 3);
    assert_eq!(report.summary.failed_count(), 1);
    assert!(report.summary_path.exists());

    let failed = report
        .summary
        .results
        .iter()
        .find(|r| !r.is_saved())
        .unwrap();
    assert_eq!(failed.id(), 3);

    let layout = writer.layout();
    let meta = std::fs::read_to_string(layout.meta_path(1, "bulbasaur")).unwrap();
    let record = MetadataRecord::from_json_str(&meta).unwrap();
    assert_eq!(record.checksum, sha256_hex(&png1));
    assert_eq!(record.bytes, png1.len() as u64);
    assert_eq!(record.source_url, art_url(1));
    assert_eq!(record.types, vec!["grass"]);
    assert_eq!(std::fs::read(layout.original_path(1, "bulbasaur", "png")).unwrap(), png1);
    assert!(layout.thumb_path(1, "bulbasaur", "webp").exists());

    assert!(matches!(events.first(), Some(DownloadEvent::Started { total: 4 })));
    assert!(matches!(
        events.last(),
        Some(DownloadEvent::Done { saved: 3, failed: 1 })
    ));
}

#[tokio::test]
async fn corrupt_image_is_saved_without_thumbnail() {
    let dir = tempfile::tempdir().unwrap();
    let stub = StubTransport::new();
    let mut broken = png_bytes(40, 40);
    broken.truncate(30);
    stub.always(
        &detail_url(25),
        ok(detail_json(25, "pikachu", Some(&art_url(25)), None)),
    );
    stub.always(&art_url(25), ok(broken.clone()));
    let resolver = resolver(stub, 1);
    let writer = writer(&dir);

    let (result, _) = run(
        &resolver,
        &writer,
        DownloadOptions::new(25, 25, 1),
        &CancellationFlag::new(),
    )
    .await;
    let report = result.unwrap();

    let EntityOutcome::Saved(record) = &report.summary.results[0] else {
        panic!("expected a saved record: {:?}", report.summary.results);
    };
    assert_eq!(record.image_mime, "image/png");
    assert_eq!(record.checksum, sha256_hex(&broken));
    assert!(record.saved_thumb.is_none());
    assert!(record.thumb_mime.is_none());
}

#[tokio::test]
async fn cancelled_run_records_every_id_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let stub = StubTransport::new();
    serve_entity(&stub, 1, "bulbasaur");
    let resolver = resolver(stub, 2);
    let writer = writer(&dir);
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let (result, _) = run(&resolver, &writer, DownloadOptions::new(1, 3, 2), &cancel).await;
    let report = result.unwrap();

    assert_eq!(report.summary.failed_count(), 3);
    assert!(report.summary.results.iter().all(|r| matches!(
        r,
        EntityOutcome::Failed { error, .. } if error == CANCELLED
    )));
    assert!(resolver.client().fetcher().transport().calls().is_empty());
    assert!(report.summary_path.exists());
}

#[tokio::test]
async fn invalid_options_fail_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver(StubTransport::new(), 1);
    let writer = writer(&dir);
    let cancel = CancellationFlag::new();

    let (result, _) = run(&resolver, &writer, DownloadOptions::new(5, 2, 1), &cancel).await;
    assert!(matches!(result, Err(DownloadError::InvalidRange { start: 5, end: 2 })));

    let (result, _) = run(&resolver, &writer, DownloadOptions::new(0, 2, 1), &cancel).await;
    assert!(matches!(result, Err(DownloadError::InvalidRange { .. })));

    let (result, _) = run(&resolver, &writer, DownloadOptions::new(1, 2, 0), &cancel).await;
    assert!(matches!(result, Err(DownloadError::InvalidConcurrency)));

    assert!(!writer.layout().root().exists());
}

#[tokio::test]
async fn pipelines_respect_concurrency() {
    let dir = tempfile::tempdir().unwrap();
    let stub = StubTransport::with_latency(Duration::from_millis(5));
    for id in 1..=8 {
        serve_entity(&stub, id, &format!("mon{id}"));
    }
    let resolver = resolver(stub, 2);
    let writer = writer(&dir);

    let (result, _) = run(
        &resolver,
        &writer,
        DownloadOptions::new(1, 8, 2),
        &CancellationFlag::new(),
    )
    .await;

    assert_eq!(result.unwrap().summary.saved_count(), 8);
    assert!(resolver.client().fetcher().transport().max_in_flight() <= 2);
}

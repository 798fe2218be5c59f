//! End-to-end runs through the public API with the real `image` backend.
//!
//! Sources are generated in memory; only the packaging tests touch disk.

use image::{ImageEncoder, RgbImage};
use pic_processor::batch::{Batch, BatchEvent, ItemStatus, run_batch};
use pic_processor::imaging::{Dimensions, OutputFormat, ProcessOptions, Quality, RustBackend};
use pic_processor::package::{self, ARCHIVE_NAME, DownloadPlan};
use pic_processor::scan;
use std::io::Read;
use std::sync::mpsc;
use tempfile::TempDir;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 90])
    });
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

fn decoded_dims(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

// =========================================================================
// Processing
// =========================================================================

#[test]
fn corrupt_item_does_not_stop_the_batch() {
    let backend = RustBackend::new();
    let mut batch = Batch::new();
    batch.add("first.png", png(120, 80));
    batch.add("broken.jpg", b"definitely not a jpeg".to_vec());
    batch.add("third.png", png(60, 60));

    assert_eq!(batch.probe_dimensions(&backend), 2);

    let options = ProcessOptions {
        format: OutputFormat::Webp,
        quality: Quality::new(0.6).unwrap(),
        width: Some(60),
        ..ProcessOptions::default()
    };
    let (tx, rx) = mpsc::channel();
    let summary = run_batch(&backend, &mut batch, &options, Some(tx), None);

    assert_eq!(summary.done, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.cancelled);

    let items: Vec<_> = batch.iter().collect();
    assert_eq!(items[0].status(), ItemStatus::Done);
    assert_eq!(items[1].status(), ItemStatus::Error);
    assert_eq!(items[2].status(), ItemStatus::Done);
    assert!(items[1].error_message().unwrap().contains("decode"));
    assert_eq!(items[1].original_dimensions(), None);

    let first = items[0].result().unwrap();
    assert_eq!(first.format, OutputFormat::Webp);
    assert_eq!(first.dimensions, Dimensions { width: 60, height: 40 });
    assert_eq!(decoded_dims(&first.data), (60, 40));

    let events: Vec<BatchEvent> = rx.iter().collect();
    assert!(matches!(events.first(), Some(BatchEvent::Started { total: 3 })));
    assert!(matches!(events.last(), Some(BatchEvent::Finished(s)) if s.done == 2));
    assert_eq!(events.len(), 1 + 3 * 2 + 1);
}

#[test]
fn png_without_resize_keeps_pixels() {
    let source = png(33, 17);
    let mut batch = Batch::new();
    batch.add("tiny.png", source.clone());

    let options = ProcessOptions {
        format: OutputFormat::Png,
        ..ProcessOptions::default()
    };
    run_batch(&RustBackend::new(), &mut batch, &options, None, None);

    let item = batch.iter().next().unwrap();
    let result = item.result().unwrap();
    let before = image::load_from_memory(&source).unwrap().to_rgb8();
    let after = image::load_from_memory(&result.data).unwrap().to_rgb8();
    assert_eq!(before, after);
}

#[test]
fn both_edges_keep_ratio_by_width_or_stretch() {
    let backend = RustBackend::new();
    let mut batch = Batch::new();
    batch.add("wide.png", png(200, 100));

    let keep = ProcessOptions {
        format: OutputFormat::Jpeg,
        width: Some(50),
        height: Some(200),
        ..ProcessOptions::default()
    };
    run_batch(&backend, &mut batch, &keep, None, None);
    let kept = batch.iter().next().unwrap().result().unwrap().dimensions;
    assert_eq!(kept, Dimensions { width: 50, height: 25 });

    let stretch = ProcessOptions {
        maintain_aspect_ratio: false,
        height: Some(50),
        ..keep
    };
    run_batch(&backend, &mut batch, &stretch, None, None);
    let item = batch.iter().next().unwrap();
    assert_eq!(decoded_dims(&item.result().unwrap().data), (50, 50));
}

#[test]
fn huge_target_is_refused_and_the_batch_continues() {
    let mut batch = Batch::new();
    batch.add("tall.png", png(1, 100));
    batch.add("strip.png", png(3000, 1));

    let options = ProcessOptions {
        format: OutputFormat::Png,
        width: Some(30_000),
        ..ProcessOptions::default()
    };
    let summary = run_batch(&RustBackend::new(), &mut batch, &options, None, None);

    assert_eq!(summary.failed, 1);
    let items: Vec<_> = batch.iter().collect();
    assert_eq!(items[0].status(), ItemStatus::Error);
    assert_eq!(items[1].status(), ItemStatus::Done);
    assert_eq!(
        items[1].result().unwrap().dimensions,
        Dimensions { width: 30_000, height: 10 }
    );
}

// =========================================================================
// Selection and packaging
// =========================================================================

#[test]
fn directory_in_bundle_out() {
    let input = TempDir::new().unwrap();
    std::fs::write(input.path().join("a.png"), png(40, 20)).unwrap();
    std::fs::create_dir(input.path().join("more")).unwrap();
    std::fs::write(input.path().join("more/a.PNG"), png(20, 40)).unwrap();
    std::fs::write(input.path().join("notes.txt"), "skip me").unwrap();

    let mut batch = scan::load_batch(&[input.path().to_path_buf()]).unwrap();
    assert_eq!(batch.len(), 2);

    let options = ProcessOptions {
        format: OutputFormat::Jpeg,
        ..ProcessOptions::default()
    };
    run_batch(&RustBackend::new(), &mut batch, &options, None, None);

    let plan = package::plan_download(&batch).unwrap();
    assert!(matches!(plan, DownloadPlan::Bundle { .. }));

    let out = TempDir::new().unwrap();
    let saved = package::save(&plan, out.path()).unwrap();
    assert_eq!(saved.path, out.path().join(ARCHIVE_NAME));
    assert_eq!(saved.entries, vec!["a.jpeg", "a-2.jpeg"]);

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&saved.path).unwrap()).unwrap();
    let mut second = Vec::new();
    archive
        .by_name("a-2.jpeg")
        .unwrap()
        .read_to_end(&mut second)
        .unwrap();
    assert_eq!(decoded_dims(&second), (20, 40));
}

#[test]
fn single_result_does_not_replace_its_source() {
    let dir = TempDir::new().unwrap();
    let source = png(30, 30);
    std::fs::write(dir.path().join("photo.png"), &source).unwrap();

    let mut batch = scan::load_batch(&[dir.path().join("photo.png")]).unwrap();
    let options = ProcessOptions {
        format: OutputFormat::Png,
        width: Some(10),
        ..ProcessOptions::default()
    };
    run_batch(&RustBackend::new(), &mut batch, &options, None, None);

    let plan = package::plan_download(&batch).unwrap();
    let saved = package::save(&plan, dir.path()).unwrap();
    assert_eq!(saved.path, dir.path().join("photo-2.png"));
    assert_eq!(std::fs::read(dir.path().join("photo.png")).unwrap(), source);
    assert_eq!(decoded_dims(&std::fs::read(&saved.path).unwrap()), (10, 10));
}

//! End-to-end runs of the organize pipeline through the public library API.

use filetime::FileTime;
use sortdir::config::{self, OrganizeConfig};
use sortdir::organize::{
    EntryOutcome, IndexOutcome, OrganizeOptions, SlideshowOutcome, organize,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup(names: &[&str]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().canonicalize().unwrap();
    for name in names {
        fs::write(base.join(name), name).unwrap();
    }
    (tmp, base)
}

fn options_for(base: &Path, config: &OrganizeConfig, dry_run: bool) -> OrganizeOptions {
    let out_dir = config.resolve_out_dir(base).unwrap();
    OrganizeOptions::from_config(config, out_dir, dry_run)
}

fn listing(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
            if path.is_dir() {
                out.push(format!("{rel}/"));
                walk(root, &path, out);
            } else {
                out.push(rel);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

fn write_png(path: &Path) {
    image::RgbImage::new(8, 4).save(path).unwrap();
}

// =========================================================================
// Full runs
// =========================================================================

#[test]
fn collision_with_existing_canonical_name() {
    let (_tmp, base) = setup(&["my_photo.jpg", "My Photo.JPG"]);
    let config = OrganizeConfig::default();
    let report = organize(&base, &options_for(&base, &config, false), None).unwrap();

    assert!(report.succeeded());
    assert_eq!(report.renamed_count(), 1);
    assert_eq!(fs::read_to_string(base.join("my_photo-1.jpg")).unwrap(), "My Photo.JPG");
    assert_eq!(fs::read_to_string(base.join("my_photo.jpg")).unwrap(), "my_photo.jpg");
    assert_eq!(
        fs::read_to_string(base.join("out/jpg/my_photo-1.jpg")).unwrap(),
        "My Photo.JPG"
    );
    assert_eq!(
        fs::read_to_string(base.join("out/jpg/my_photo.jpg")).unwrap(),
        "my_photo.jpg"
    );

    let index = fs::read_to_string(base.join("out/index.html")).unwrap();
    assert!(index.contains("<p>my_photo-1.jpg</p>"));
    assert!(index.contains("<p>my_photo.jpg</p>"));
    assert!(!index.contains("My Photo.JPG"));
}

#[test]
fn mixed_directory_layout() {
    let (_tmp, base) = setup(&["Report (final).PDF", "data.CSV", "LICENSE", ".env"]);
    fs::create_dir(base.join("archive")).unwrap();
    fs::write(base.join("archive/old.txt"), "nested").unwrap();

    let report = organize(&base, &options_for(&base, &OrganizeConfig::default(), false), None)
        .unwrap();

    assert_eq!(report.entries.len(), 3);
    assert_eq!(
        listing(&base),
        vec![
            ".env",
            "archive/",
            "archive/old.txt",
            "data.csv",
            "license",
            "out/",
            "out/csv/",
            "out/csv/data.csv",
            "out/index.html",
            "out/pdf/",
            "out/pdf/report_final.pdf",
            "out/unknown/",
            "out/unknown/license",
            "report_final.pdf",
        ]
    );
}

#[test]
fn second_run_is_stable() {
    let (_tmp, base) = setup(&["Quarterly Report.DOCX", "notes.txt"]);
    let config = OrganizeConfig::default();

    organize(&base, &options_for(&base, &config, false), None).unwrap();
    let second = organize(&base, &options_for(&base, &config, false), None).unwrap();

    assert_eq!(second.renamed_count(), 0);
    assert!(second.succeeded());
    assert!(base.join("out/docx/quarterly_report-1.docx").exists());
    assert!(base.join("out/txt/notes-1.txt").exists());
    let index = fs::read_to_string(base.join("out/index.html")).unwrap();
    assert!(index.contains("<p>quarterly_report.docx</p>"));
}

#[test]
fn config_file_changes_output_and_rename() {
    let (_tmp, base) = setup(&["Some File.TXT"]);
    fs::write(
        base.join(config::CONFIG_FILENAME),
        "out_dir = \"sorted\"\nrename = false\n",
    )
    .unwrap();

    let config = config::load_config(&base, None).unwrap();
    let report = organize(&base, &options_for(&base, &config, false), None).unwrap();

    assert!(report.succeeded());
    assert!(base.join("Some File.TXT").exists());
    assert!(base.join("sorted/txt/Some File.TXT").exists());
    assert!(base.join("sorted/toml/sortdir.toml").exists());
    assert!(!base.join("out").exists());
}

#[test]
fn copies_keep_modification_time() {
    let (_tmp, base) = setup(&["Old Scan.PNG"]);
    let mtime = FileTime::from_unix_time(1_234_567_890, 0);
    filetime::set_file_mtime(base.join("Old Scan.PNG"), mtime).unwrap();

    organize(&base, &options_for(&base, &OrganizeConfig::default(), false), None).unwrap();

    let copied = fs::metadata(base.join("out/png/old_scan.png")).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&copied), mtime);
}

// =========================================================================
// Dry run
// =========================================================================

#[test]
fn dry_run_changes_nothing_and_predicts_live_run() {
    let (_tmp, base) = setup(&["A B.txt", "a b.TXT", "a_b.txt", "Photo.JPG"]);
    fs::create_dir_all(base.join("out/txt")).unwrap();
    fs::write(base.join("out/txt/a_b.txt"), "earlier").unwrap();
    let before = listing(&base);
    let config = OrganizeConfig::default();

    let planned = organize(&base, &options_for(&base, &config, true), None).unwrap();
    assert_eq!(listing(&base), before);
    assert!(matches!(planned.index, Some(IndexOutcome::Planned { .. })));

    let live = organize(&base, &options_for(&base, &config, false), None).unwrap();
    assert_eq!(planned.entries, live.entries);

    for outcome in &live.entries {
        let EntryOutcome::Done { copy, .. } = outcome else {
            panic!("unexpected failure: {outcome:?}");
        };
        assert!(copy.destination.exists());
    }
    assert_eq!(fs::read_to_string(base.join("out/txt/a_b.txt")).unwrap(), "earlier");
}

// =========================================================================
// Slideshow
// =========================================================================

#[test]
fn slideshow_written_for_copied_images() {
    let (_tmp, base) = setup(&["notes.txt"]);
    write_png(&base.join("Cover Art.PNG"));
    fs::write(base.join("broken.jpg"), "not a jpeg").unwrap();

    let mut config = OrganizeConfig::default();
    config.slideshow.enabled = true;
    let report = organize(&base, &options_for(&base, &config, false), None).unwrap();

    let SlideshowOutcome::Written { path, stats } = &report.slideshow else {
        panic!("slideshow not written: {:?}", report.slideshow);
    };
    assert_eq!(path, &base.join("out/slideshow.html"));
    assert_eq!(stats.images, 1);
    assert_eq!(stats.notices, 1);

    let html = fs::read_to_string(path).unwrap();
    assert!(html.contains(r#"src="png/cover_art.png""#));
    assert!(html.contains("Unsupported image: broken.jpg"));
    assert!(!html.contains("notes.txt"));
}

#[test]
fn slideshow_skipped_without_images() {
    let (_tmp, base) = setup(&["notes.txt"]);
    let mut config = OrganizeConfig::default();
    config.slideshow.enabled = true;

    let report = organize(&base, &options_for(&base, &config, false), None).unwrap();

    assert_eq!(report.slideshow, SlideshowOutcome::NoImages);
    assert!(!base.join("out/slideshow.html").exists());
}

// =========================================================================
// Configuration guards
// =========================================================================

#[test]
fn output_equal_to_source_rejected() {
    let (_tmp, base) = setup(&["a.txt"]);
    let config = OrganizeConfig {
        out_dir: PathBuf::from("."),
        ..OrganizeConfig::default()
    };
    assert!(matches!(
        config.resolve_out_dir(&base),
        Err(config::ConfigError::OutputIsSource(_))
    ));
}

#[test]
fn empty_source_is_not_an_error() {
    let (_tmp, base) = setup(&[]);
    let report = organize(&base, &options_for(&base, &OrganizeConfig::default(), false), None)
        .unwrap();
    assert!(report.is_empty());
    assert!(!base.join("out").exists());
}

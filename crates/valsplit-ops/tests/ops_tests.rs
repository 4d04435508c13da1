use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use valsplit_ops::{Partitioner, RestoreEngine, SplitConfig, read_manifest};

fn write_with_mtime(path: &Path, age_secs: u64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, path.file_name().unwrap().to_string_lossy().as_bytes()).unwrap();
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
}

/// economia: ids 100..=114 plus 5 unnumbered; deportes: 3 unnumbered; breves: 2 files.
fn create_corpus() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    for id in 100..115 {
        write_with_mtime(&root.join(format!("economia/{id}-nota.html")), 86_400);
    }
    for i in 0..5 {
        write_with_mtime(&root.join(format!("economia/sub/extra-{i}.htm")), i);
    }
    write_with_mtime(&root.join("deportes/partido.html"), 300);
    write_with_mtime(&root.join("deportes/gol.html"), 10);
    write_with_mtime(&root.join("deportes/liga.html"), 600);
    write_with_mtime(&root.join("breves/1.html"), 10);
    write_with_mtime(&root.join("breves/2.html"), 10);
    fs::write(root.join("economia/readme.txt"), "not a document").unwrap();

    temp
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(files_under(&path));
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

#[test]
fn test_dry_run_touches_nothing() {
    let temp = create_corpus();
    let before = files_under(temp.path());

    let mut config = SplitConfig::new(temp.path());
    config.dry_run = true;
    let report = Partitioner::new(config).run().unwrap();

    assert!(report.dry_run);
    assert_eq!(report.total_planned(), 5);
    assert_eq!(report.total_moved(), 0);
    assert_eq!(files_under(temp.path()), before);
    assert!(!report.manifest.exists());
    assert!(!report.validation_root.exists());
}

#[test]
fn test_run_moves_newest_and_records_manifest() {
    let temp = create_corpus();
    let report = Partitioner::new(SplitConfig::new(temp.path())).run().unwrap();
    let root = report.root.clone();

    assert_eq!(report.total_moved(), 5);
    assert!(report.failures.is_empty());

    let economia = files_under(&root.join("Validacion/economia"));
    let names: Vec<_> = economia
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["111-nota.html", "112-nota.html", "113-nota.html", "114-nota.html"]
    );
    assert!(root.join("Validacion/deportes/gol.html").exists());
    assert!(!root.join("Validacion/breves").exists());

    let entries = read_manifest(&report.manifest).unwrap().entries;
    assert_eq!(entries.len(), 5);
    assert_eq!(entries, report.moved);

    let economia_ranks: Vec<_> = entries
        .iter()
        .filter(|e| e.category == "economia")
        .map(|e| e.id_rank)
        .collect();
    assert_eq!(economia_ranks, vec![Some(1), Some(2), Some(3), Some(4)]);

    let deportes = entries.iter().find(|e| e.category == "deportes").unwrap();
    assert_eq!(deportes.id_rank, None);
    assert_eq!(deportes.src, root.join("deportes/gol.html"));

    let header = fs::read_to_string(&report.manifest).unwrap();
    assert!(header.starts_with("moved_at,category,src,dst,id_rank\n"));
}

#[test]
fn test_round_trip_restore() {
    let temp = create_corpus();
    let before = files_under(temp.path());

    let report = Partitioner::new(SplitConfig::new(temp.path())).run().unwrap();
    let restore = RestoreEngine::new(&report.manifest).restore().unwrap();

    assert_eq!(restore.restored, report.moved.len());
    assert_eq!(restore.missing, 0);
    assert_eq!(restore.conflicts, 0);
    assert!(files_under(&report.validation_root).is_empty());

    let after: Vec<_> = files_under(temp.path())
        .into_iter()
        .filter(|p| p.file_name().unwrap() != "manifest_validacion.csv")
        .collect();
    assert_eq!(after, before);
}

#[test]
fn test_second_restore_reports_all_missing() {
    let temp = create_corpus();
    let report = Partitioner::new(SplitConfig::new(temp.path())).run().unwrap();

    let engine = RestoreEngine::new(&report.manifest);
    let first = engine.restore().unwrap();
    let second = engine.restore().unwrap();

    assert_eq!(first.restored, 5);
    assert_eq!(second.restored, 0);
    assert_eq!(second.missing, 5);
    assert_eq!(second.total(), 5);
}

#[test]
fn test_collision_in_validation_is_renamed() {
    let temp = create_corpus();
    let held = temp.path().join("Validacion/deportes/gol.html");
    fs::create_dir_all(held.parent().unwrap()).unwrap();
    fs::write(&held, "earlier run").unwrap();

    let report = Partitioner::new(SplitConfig::new(temp.path())).run().unwrap();

    let entry = report.moved.iter().find(|e| e.category == "deportes").unwrap();
    assert_eq!(entry.dst.file_name().unwrap(), "gol_1.html");
    assert_eq!(fs::read_to_string(&held).unwrap(), "earlier run");
    assert_eq!(fs::read_to_string(&entry.dst).unwrap(), "gol.html");
}

#[test]
fn test_failed_category_does_not_block_others() {
    let temp = create_corpus();
    fs::create_dir_all(temp.path().join("Validacion")).unwrap();
    // A plain file where the category directory should go.
    fs::write(temp.path().join("Validacion/economia"), "blocker").unwrap();

    let report = Partitioner::new(SplitConfig::new(temp.path())).run().unwrap();

    assert_eq!(report.failures.len(), 4);
    assert!(report.failures.iter().all(|f| f.category == "economia"));
    assert!(report.failures[0].message.contains("create directory"));
    assert_eq!(report.total_moved(), 1);

    let entries = read_manifest(&report.manifest).unwrap().entries;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].category, "deportes");
    assert!(temp.path().join("economia/114-nota.html").exists());
}

#[test]
fn test_repeated_runs_append_to_manifest() {
    let temp = create_corpus();

    let first = Partitioner::new(SplitConfig::new(temp.path())).run().unwrap();
    let second = Partitioner::new(SplitConfig::new(temp.path())).run().unwrap();

    // Second run sees 16 economia files left: round(3.2) = 3.
    let economia = second.outcomes.iter().find(|o| o.name == "economia").unwrap();
    assert_eq!(economia.total, 16);
    assert_eq!(economia.moved, 3);

    let content = fs::read_to_string(&first.manifest).unwrap();
    assert_eq!(content.matches("moved_at").count(), 1);

    let entries = read_manifest(&first.manifest).unwrap().entries;
    assert_eq!(entries.len(), first.total_moved() + second.total_moved());

    let restore = RestoreEngine::new(&first.manifest).restore().unwrap();
    assert_eq!(restore.restored, entries.len());
    assert!(temp.path().join("economia/114-nota.html").exists());
    assert!(temp.path().join("deportes/gol.html").exists());
}

#[test]
fn test_custom_validation_folder_and_manifest() {
    let temp = create_corpus();
    let logs = TempDir::new().unwrap();
    let manifest = logs.path().join("split.csv");

    let config = SplitConfig::builder()
        .root(temp.path())
        .validation_dir("holdout")
        .proportion(0.5)
        .manifest_path(&manifest)
        .build()
        .unwrap();
    let report = Partitioner::new(config).run().unwrap();

    assert_eq!(report.manifest, manifest);
    assert!(manifest.exists());
    assert!(report.validation_root.ends_with("holdout"));
    // economia 10, deportes round(1.5) = 2, breves 1
    assert_eq!(report.total_moved(), 13);
    assert!(!report.outcomes.iter().any(|o| o.name == "holdout"));
}

#[cfg(unix)]
#[test]
fn test_non_utf8_name_is_skipped_and_manifest_stays_readable() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    write_with_mtime(&temp.path().join("a_cat/900-ok.html"), 10);
    let odd = temp
        .path()
        .join("b_cat")
        .join(OsStr::from_bytes(b"999-\xff.html"));
    write_with_mtime(&odd, 10);

    let run = || {
        let config = SplitConfig::builder()
            .root(temp.path())
            .proportion(1.0)
            .build()
            .unwrap();
        Partitioner::new(config).run().unwrap()
    };

    let first = run();
    assert_eq!(first.total_moved(), 1);
    assert_eq!(first.failures.len(), 1);
    assert_eq!(first.failures[0].category, "b_cat");
    assert!(first.failures[0].path.ends_with(OsStr::from_bytes(b"999-\xff.html")));
    assert!(odd.exists());

    let b_cat = first.outcomes.iter().find(|o| o.name == "b_cat").unwrap();
    assert_eq!(b_cat.failed, 1);
    assert_eq!(b_cat.moved, 0);

    // A later run appends cleanly after the skipped file.
    write_with_mtime(&temp.path().join("a_cat/901-ok.html"), 5);
    let second = run();
    assert_eq!(second.total_moved(), 1);
    assert_eq!(second.failures.len(), 1);

    let records = read_manifest(&first.manifest).unwrap();
    assert_eq!(records.entries.len(), 2);
    assert!(records.rejected.is_empty());

    let restore = RestoreEngine::new(&first.manifest).restore().unwrap();
    assert_eq!(restore.restored, 2);
    assert_eq!(restore.malformed, 0);
    assert!(temp.path().join("a_cat/900-ok.html").exists());
    assert!(temp.path().join("a_cat/901-ok.html").exists());
    assert!(odd.exists());
}

#[test]
fn test_restore_skips_damaged_rows() {
    let temp = create_corpus();
    let report = Partitioner::new(SplitConfig::new(temp.path())).run().unwrap();

    let mut content = fs::read_to_string(&report.manifest).unwrap();
    content.push_str("2024-01-01T00:00:00,economia\n");
    content.push_str("2024-01-01T00:00:00,economia,/c/a.html,/c/b.html,not-a-rank\n");
    fs::write(&report.manifest, content).unwrap();

    let restore = RestoreEngine::new(&report.manifest).restore().unwrap();

    assert_eq!(restore.restored, 5);
    assert_eq!(restore.malformed, 2);
    assert_eq!(restore.total(), 7);
    assert!(files_under(&report.validation_root).is_empty());
    assert!(temp.path().join("economia/114-nota.html").exists());
}

use super::*;

fn run_dir(root: &Path, retention: TempRetention, success: bool) -> PathBuf {
    let mut wd = WorkDir::create(root, "Photosynthesis Basics", retention).unwrap();
    std::fs::write(wd.slides().join("1.png"), b"x").unwrap();
    if success {
        wd.mark_success();
    }
    wd.path().to_path_buf()
}

#[test]
fn layout_has_all_subdirectories() {
    let root = tempfile::tempdir().unwrap();
    let wd = WorkDir::create(root.path(), "t", TempRetention::Delete).unwrap();
    for d in [wd.slides(), wd.images(), wd.audio(), wd.videos()] {
        assert!(d.is_dir(), "{}", d.display());
    }
    let name = wd.path().file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("run-t-"));
}

#[test]
fn keep_on_failure_policy() {
    let root = tempfile::tempdir().unwrap();
    assert!(!run_dir(root.path(), TempRetention::KeepOnFailure, true).exists());
    assert!(run_dir(root.path(), TempRetention::KeepOnFailure, false).exists());
}

#[test]
fn delete_and_keep_policies() {
    let root = tempfile::tempdir().unwrap();
    assert!(!run_dir(root.path(), TempRetention::Delete, false).exists());
    assert!(run_dir(root.path(), TempRetention::Keep, true).exists());
}

#[test]
fn preserve_overrides_delete() {
    let root = tempfile::tempdir().unwrap();
    let path = {
        let mut wd = WorkDir::create(root.path(), "t", TempRetention::Delete).unwrap();
        wd.preserve();
        wd.path().to_path_buf()
    };
    assert!(path.exists());
}

#[test]
fn concurrent_runs_never_share_a_directory() {
    let root = tempfile::tempdir().unwrap();
    let a = WorkDir::create(root.path(), "same", TempRetention::Delete).unwrap();
    let b = WorkDir::create(root.path(), "same", TempRetention::Delete).unwrap();
    assert_ne!(a.path(), b.path());
}

#[test]
fn slug_is_filesystem_safe() {
    assert_eq!(slug("Photosynthesis / Light!"), "photosynthesis--light");
    assert_eq!(slug("प्रकाश"), "topic");
}

#[test]
fn retention_parses_snake_case() {
    let r: TempRetention = serde_json::from_str("\"keep_on_failure\"").unwrap();
    assert_eq!(r, TempRetention::KeepOnFailure);
    assert_eq!(TempRetention::default(), TempRetention::KeepOnFailure);
}

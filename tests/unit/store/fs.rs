use super::*;
use crate::slide::model::Slide;

fn record() -> TopicRecord {
    TopicRecord {
        slides: vec![Slide {
            content: "Photosynthesis converts light into energy".into(),
            image_description: "a green leaf diagram".into(),
        }],
        video_blob_id: Some("abc".into()),
        notes: vec!["प्रकाश संश्लेषण".into()],
    }
}

#[test]
fn records_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    FsContentStore::open(dir.path())
        .unwrap()
        .upsert("Photosynthesis / basics", &record())
        .unwrap();

    let store = FsContentStore::open(dir.path()).unwrap();
    assert_eq!(store.find("Photosynthesis / basics").unwrap(), Some(record()));
    assert_eq!(store.find("Photosynthesis").unwrap(), None);
}

#[test]
fn upsert_replaces_previous_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsContentStore::open(dir.path()).unwrap();
    store.upsert("t", &record()).unwrap();
    store.upsert("t", &TopicRecord::default()).unwrap();
    assert_eq!(store.find("t").unwrap(), Some(TopicRecord::default()));
    assert_eq!(std::fs::read_dir(dir.path().join("topics")).unwrap().count(), 1);
}

#[test]
fn blobs_keep_a_readable_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsContentStore::open(dir.path()).unwrap();
    let id = store.put_blob(b"\x00\x01", "final video.mp4").unwrap();
    assert!(id.ends_with("-final_video.mp4"), "{id}");
    assert_eq!(store.get_blob(&id).unwrap(), vec![0, 1]);
}

#[test]
fn blob_ids_cannot_escape_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsContentStore::open(dir.path()).unwrap();
    assert!(store.get_blob("../topics").is_err());
    assert!(store.get_blob("a/b").is_err());
    assert!(store.get_blob("").is_err());
}

#[test]
fn corrupt_record_is_a_serde_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsContentStore::open(dir.path()).unwrap();
    std::fs::write(store.topic_path("t"), "{ broken").unwrap();
    assert!(matches!(store.find("t"), Err(SlidecastError::Serde(_))));
}

use biograph_protocol::{
    ArchiveStore, BiographyBasics, BiographyRecord, EntityCategory, JsonFileArchiveStore, Letter,
};
use pretty_assertions::assert_eq;

fn sample_record() -> BiographyRecord {
    let letter = Letter::new("1888-05-01", "Jo", "Vincent")
        .with_places("Amsterdam", "Arles")
        .with_content("Dear Vincent, Paris is cold.")
        .with_mentions(EntityCategory::Place, ["Paris"]);

    BiographyRecord {
        basics: Some(BiographyBasics {
            first_name: "Vincent".into(),
            last_name: "van Gogh".into(),
            birth_year: 1853,
            death_year: Some(1890),
            short_bio: String::new(),
        }),
        letters: vec![letter],
        ..Default::default()
    }
}

#[tokio::test]
async fn json_store_roundtrips_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileArchiveStore::new(dir.path().join("archive"));

    assert!(store.load("vincent").await.expect("load").is_none());

    let record = sample_record();
    store.save("vincent", &record).await.expect("save");

    let loaded = store.load("vincent").await.expect("load").expect("present");
    assert_eq!(loaded, record);
    assert_eq!(loaded.subject_name().as_deref(), Some("Vincent van Gogh"));
}

#[tokio::test]
async fn json_store_overwrites_previous_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileArchiveStore::new(dir.path());

    store
        .save("bio", &BiographyRecord::default())
        .await
        .expect("save empty");
    store.save("bio", &sample_record()).await.expect("save full");

    let loaded = store.load("bio").await.expect("load").expect("present");
    assert_eq!(loaded.letters.len(), 1);
    assert!(!dir.path().join("bio.json.tmp").exists());
}

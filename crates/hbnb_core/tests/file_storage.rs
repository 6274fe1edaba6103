use hbnb_core::{AttrValue, FileStorage, Kind, ObjectStore, Record, StorageError};
use std::fs;

#[test]
fn reload_without_file_leaves_store_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");

    let storage = FileStorage::open(&path).unwrap();
    assert!(storage.all().is_empty());
    assert!(!path.exists());
}

#[test]
fn save_then_reload_reconstructs_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let mut storage = FileStorage::new(&path);

    let mut place = Record::new(Kind::Place);
    place
        .set_attribute("number_rooms", AttrValue::Int(3))
        .unwrap();
    place
        .set_attribute("longitude", AttrValue::Float(-122.4))
        .unwrap();
    place
        .set_attribute("description", AttrValue::from("Sunny, quiet"))
        .unwrap();
    let mut user = Record::new(Kind::User);
    user.set_attribute("email", AttrValue::from("a@b.com"))
        .unwrap();

    storage.insert(place);
    storage.insert(user);
    storage.insert(Record::new(Kind::BaseModel));
    storage.save().unwrap();

    let reloaded = FileStorage::open(&path).unwrap();
    assert_eq!(reloaded.all(), storage.all());
    assert_eq!(reloaded.count_kind("Place"), 1);
    assert_eq!(reloaded.count_kind("Review"), 0);
}

#[test]
fn saved_document_is_flat_json_keyed_by_kind_and_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let mut storage = FileStorage::new(&path);

    let mut review = Record::new(Kind::Review);
    review
        .set_attribute("text", AttrValue::from("Great stay"))
        .unwrap();
    let key = review.key();
    let id = review.id.clone();
    storage.insert(review);
    storage.save().unwrap();

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let entry = &document[key.as_str()];
    assert_eq!(entry["__class__"], "Review");
    assert_eq!(entry["id"], id.as_str());
    assert_eq!(entry["text"], "Great stay");
    assert!(entry["created_at"].is_string());
    assert!(entry["updated_at"].is_string());
}

#[test]
fn save_replaces_file_without_leaving_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let mut storage = FileStorage::new(&path);

    storage.insert(Record::new(Kind::Amenity));
    storage.save().unwrap();
    storage.insert(Record::new(Kind::Amenity));
    storage.save().unwrap();

    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
    assert_eq!(FileStorage::open(&path).unwrap().all().len(), 2);
}

#[test]
fn reload_reads_documents_written_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    fs::write(
        &path,
        r#"{
            "State.0001": {
                "__class__": "State",
                "id": "0001",
                "created_at": "2017-09-28T21:03:54.052298",
                "updated_at": "2017-09-28T21:03:54",
                "name": "California"
            },
            "Place.0002": {
                "id": "0002",
                "created_at": "2017-09-28T21:03:54.052298",
                "updated_at": "2017-09-28T21:05:54.119427",
                "max_guest": 4,
                "latitude": 37.77
            }
        }"#,
    )
    .unwrap();

    let storage = FileStorage::open(&path).unwrap();
    let state = storage.get("State.0001").unwrap();
    assert_eq!(state.kind, Kind::State);
    assert_eq!(state.value("name"), Some(AttrValue::from("California")));

    let place = storage.get("Place.0002").unwrap();
    assert_eq!(place.kind, Kind::Place);
    assert_eq!(place.value("max_guest"), Some(AttrValue::Int(4)));
    assert_eq!(place.value("latitude"), Some(AttrValue::Float(37.77)));
    assert_eq!(place.value("number_rooms"), Some(AttrValue::Int(0)));
}

#[test]
fn malformed_document_is_an_error_and_keeps_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let mut storage = FileStorage::new(&path);
    storage.insert(Record::new(Kind::City));

    fs::write(&path, "{ not json").unwrap();
    let err = storage.reload().unwrap_err();
    assert!(matches!(err, StorageError::Json(_)));
    assert_eq!(storage.all().len(), 1);

    let err = FileStorage::open(&path).unwrap_err();
    assert!(err.to_string().starts_with("malformed storage document"));
}

#[test]
fn unknown_kind_in_document_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    fs::write(
        &path,
        r#"{"Ghost.1": {"id": "1", "created_at": "2017-09-28T21:03:54", "updated_at": "2017-09-28T21:03:54"}}"#,
    )
    .unwrap();

    let err = FileStorage::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

#[test]
fn remove_drops_record_from_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path().join("file.json"));
    let record = Record::new(Kind::User);
    let key = record.key();
    storage.insert(record);

    assert!(storage.get_mut(&key).is_some());
    assert!(storage.remove(&key).is_some());
    assert!(storage.remove(&key).is_none());
    assert!(storage.all().is_empty());
}

use pokedex_db::*;

fn row(id: u32, name: &str) -> CatalogRow {
    CatalogRow {
        id,
        name: name.to_string(),
        types: vec!["grass".to_string(), "poison".to_string()],
        meta_json: format!(r#"{{"id":{id},"name":"{name}"}}"#),
        image_blob: vec![0x89, b'P', b'N', b'G', id as u8],
        image_mime: "image/png".to_string(),
        thumb_blob: Some(vec![b'R', b'I', b'F', b'F']),
        thumb_mime: Some("image/webp".to_string()),
        checksum: format!("{id:064x}"),
    }
}

fn count(db: &CatalogDb) -> i64 {
    db.conn()
        .query_row("SELECT COUNT(*) FROM catalog", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn insert_then_update_same_id() {
    let db = CatalogDb::open_memory().unwrap();
    assert_eq!(db.upsert(&row(1, "bulbasaur")).unwrap(), UpsertOutcome::Inserted);

    let mut changed = row(1, "bulbasaur-renamed");
    changed.types = vec!["grass".to_string()];
    changed.image_blob = vec![1, 2, 3, 4, 5, 6];
    changed.checksum = "ff".repeat(32);
    assert_eq!(db.upsert(&changed).unwrap(), UpsertOutcome::Updated);

    assert_eq!(count(&db), 1);
    let entry = db.entry(1).unwrap().unwrap();
    assert_eq!(entry.name, "bulbasaur-renamed");
    assert_eq!(entry.types, vec!["grass"]);
    assert_eq!(entry.image_size, 6);
    assert_eq!(entry.checksum, "ff".repeat(32));
    assert_eq!(db.image(1).unwrap().unwrap().bytes, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn upsert_is_idempotent() {
    let db = CatalogDb::open_memory().unwrap();
    let r = row(25, "pikachu");
    db.upsert(&r).unwrap();
    let first = db.entry(25).unwrap().unwrap();
    db.upsert(&r).unwrap();
    let second = db.entry(25).unwrap().unwrap();

    assert_eq!(count(&db), 1);
    assert_eq!(first, second);
}

#[test]
fn created_at_survives_updates() {
    let db = CatalogDb::open_memory().unwrap();
    db.upsert(&row(4, "charmander")).unwrap();
    db.conn()
        .execute(
            "UPDATE catalog SET created_at = '2020-01-01T00:00:00.000Z' WHERE id = 4",
            [],
        )
        .unwrap();

    db.upsert(&row(4, "charmander")).unwrap();
    assert_eq!(
        db.entry(4).unwrap().unwrap().created_at,
        "2020-01-01T00:00:00.000Z"
    );
}

#[test]
fn update_clears_thumbnail_when_absent() {
    let db = CatalogDb::open_memory().unwrap();
    db.upsert(&row(7, "squirtle")).unwrap();
    assert!(db.thumb(7).unwrap().is_some());

    let mut no_thumb = row(7, "squirtle");
    no_thumb.thumb_blob = None;
    no_thumb.thumb_mime = None;
    db.upsert(&no_thumb).unwrap();

    assert!(db.thumb(7).unwrap().is_none());
    assert_eq!(db.entry(7).unwrap().unwrap().thumb_mime, None);
}

#[test]
fn half_thumbnail_is_stored_as_none() {
    let db = CatalogDb::open_memory().unwrap();
    let mut r = row(8, "wartortle");
    r.thumb_mime = None;
    db.upsert(&r).unwrap();

    let (blob, mime): (Option<Vec<u8>>, Option<String>) = db
        .conn()
        .query_row(
            "SELECT thumb_blob, thumb_mime FROM catalog WHERE id = 8",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert!(blob.is_none() && mime.is_none());
}

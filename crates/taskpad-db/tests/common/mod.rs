// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` so that the same logic
// can be exercised against both the SQLite and Postgres backends.

use taskpad_core::task::{CreateTask, ReplaceTask};
use taskpad_db::{Database, DbError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_task(title: &str) -> CreateTask {
    CreateTask::new(title, "")
}

fn full_state(title: &str, description: &str, done: bool, image: Option<&str>) -> ReplaceTask {
    ReplaceTask {
        title: title.to_string(),
        description: description.to_string(),
        is_completed: done,
        image_reference: image.map(String::from),
    }
}

// ---------------------------------------------------------------------------
// Task tests
// ---------------------------------------------------------------------------

/// create, get, list, replace, delete.
pub async fn test_task_crud(db: &dyn Database) {
    let t = db.create_task(&make_task("Buy milk")).await.unwrap();
    assert_eq!(t.title, "Buy milk");
    assert_eq!(t.description, "");
    assert!(!t.is_completed);
    assert!(t.image_reference.is_none());

    let fetched = db.get_task(t.id).await.unwrap();
    assert_eq!(fetched, t);

    let all = db.list_tasks().await.unwrap();
    assert_eq!(all.len(), 1);

    let replaced = db
        .replace_task(t.id, &full_state("Buy milk", "2%", true, None))
        .await
        .unwrap();
    assert!(replaced.is_completed);
    assert_eq!(replaced.description, "2%");

    let removed = db.delete_task(t.id).await.unwrap();
    assert_eq!(removed.id, t.id);
    assert!(db.list_tasks().await.unwrap().is_empty());
}

/// Blank titles never reach storage, on create or replace.
pub async fn test_title_validation(db: &dyn Database) {
    for title in ["", "   ", "\n\t"] {
        let err = db.create_task(&make_task(title)).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)), "{title:?}");
    }
    assert!(db.list_tasks().await.unwrap().is_empty());

    let t = db.create_task(&CreateTask::new("ok", "desc")).await.unwrap();
    let err = db
        .replace_task(t.id, &full_state(" ", "changed", true, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidInput(_)));
    assert_eq!(db.get_task(t.id).await.unwrap(), t);
}

/// replace(id, X) then get(id) yields X; doing it twice changes nothing.
pub async fn test_replace_roundtrip(db: &dyn Database) {
    let t = db.create_task(&make_task("orig")).await.unwrap();
    let x = full_state(
        "new title",
        "new description",
        true,
        Some("0123456789abcdef0123456789abcdef.png"),
    );

    let first = db.replace_task(t.id, &x).await.unwrap();
    let got = db.get_task(t.id).await.unwrap();
    assert_eq!(got.to_replace(), x);
    assert_eq!(got.id, t.id);
    assert_eq!(got.created_at, t.created_at);

    let second = db.replace_task(t.id, &x).await.unwrap();
    assert_eq!(first, second);
}

/// Fields left out of a replace are cleared, not preserved.
pub async fn test_sparse_replace_clears(db: &dyn Database) {
    let t = db.create_task(&CreateTask::new("t", "keep?")).await.unwrap();
    db.replace_task(
        t.id,
        &full_state("t", "keep?", true, Some("0123456789abcdef0123456789abcdef.gif")),
    )
    .await
    .unwrap();

    let sparse = ReplaceTask {
        title: "t".into(),
        ..Default::default()
    };
    let after = db.replace_task(t.id, &sparse).await.unwrap();
    assert_eq!(after.description, "");
    assert!(!after.is_completed);
    assert!(after.image_reference.is_none());
}

/// Two writers racing on the same task: the later replace wins completely.
pub async fn test_last_write_wins(db: &dyn Database) {
    let t = db.create_task(&make_task("shared")).await.unwrap();

    // Both writers started from the same stale copy.
    let mut a = t.to_replace();
    a.description = "from a".into();
    let mut b = t.to_replace();
    b.is_completed = true;

    db.replace_task(t.id, &a).await.unwrap();
    let last = db.replace_task(t.id, &b).await.unwrap();

    assert!(last.is_completed);
    assert_eq!(last.description, "", "writer a's change is silently lost");
}

/// Every operation on a deleted id reports NotFound.
pub async fn test_deleted_is_not_found(db: &dyn Database) {
    let t = db.create_task(&make_task("doomed")).await.unwrap();
    db.delete_task(t.id).await.unwrap();

    assert!(matches!(db.get_task(t.id).await, Err(DbError::NotFound(_))));
    assert!(matches!(
        db.replace_task(t.id, &full_state("x", "", false, None)).await,
        Err(DbError::NotFound(_))
    ));
    assert!(matches!(db.delete_task(t.id).await, Err(DbError::NotFound(_))));
}

/// Ids are unique and the list keeps insertion order.
pub async fn test_list_order(db: &dyn Database) {
    let mut ids = Vec::new();
    for title in ["first", "second", "third"] {
        ids.push(db.create_task(&make_task(title)).await.unwrap().id);
    }
    let listed: Vec<i64> = db.list_tasks().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(listed, ids);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    // Replacing does not move a task.
    db.replace_task(ids[0], &full_state("first!", "", true, None))
        .await
        .unwrap();
    let listed: Vec<i64> = db.list_tasks().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(listed, ids);
}

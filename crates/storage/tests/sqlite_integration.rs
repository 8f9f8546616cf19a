use quiz_core::model::{TestId, TestProgress, TestStatus};
use quiz_core::time::fixed_now;
use quiz_storage::{ProgressMap, ProgressStore, SqliteRepository, StoreScope};

fn completed(id: &str, score: u8) -> (TestId, TestProgress) {
    let mut progress = TestProgress::not_started(TestId::new(id));
    progress.record_attempt(score, fixed_now());
    (TestId::new(id), progress)
}

async fn connect(url: &str, scope: StoreScope) -> SqliteRepository {
    let repo = SqliteRepository::connect(url, scope).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_round_trips_the_snapshot() {
    let repo = connect(
        "sqlite:file:memdb_roundtrip?mode=memory&cache=shared",
        StoreScope::Device,
    )
    .await;

    let map: ProgressMap = [completed("html-basics", 70), completed("js-fundamentals", 40)]
        .into_iter()
        .collect();
    repo.save(&map).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded, map);

    let html = &loaded[&TestId::new("html-basics")];
    assert_eq!(html.best_score(), 70);
    assert_eq!(html.status(), TestStatus::Completed);
    assert_eq!(html.last_attempt_date(), Some(fixed_now()));
}

#[tokio::test]
async fn sqlite_save_replaces_the_previous_snapshot() {
    let repo = connect(
        "sqlite:file:memdb_replace?mode=memory&cache=shared",
        StoreScope::Device,
    )
    .await;

    let first: ProgressMap = [completed("html-basics", 60), completed("css-styling", 80)]
        .into_iter()
        .collect();
    repo.save(&first).await.unwrap();

    // The second snapshot drops css-styling entirely; it must not linger.
    let second: ProgressMap = [completed("html-basics", 90)].into_iter().collect();
    repo.save(&second).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded, second);
    assert!(!loaded.contains_key(&TestId::new("css-styling")));
}

#[tokio::test]
async fn sqlite_scopes_are_isolated() {
    let url = "sqlite:file:memdb_scopes?mode=memory&cache=shared";
    let device = connect(url, StoreScope::Device).await;
    let user = connect(url, StoreScope::User("jane".into())).await;

    let map: ProgressMap = [completed("html-basics", 100)].into_iter().collect();
    device.save(&map).await.unwrap();

    assert!(user.load().await.unwrap().is_empty());
    assert_eq!(device.load().await.unwrap(), map);

    let user_map: ProgressMap = [completed("css-styling", 50)].into_iter().collect();
    user.save(&user_map).await.unwrap();
    assert_eq!(device.load().await.unwrap(), map);
    assert_eq!(user.load().await.unwrap(), user_map);
}

#[tokio::test]
async fn sqlite_empty_database_loads_as_absent() {
    let repo = connect(
        "sqlite:file:memdb_empty?mode=memory&cache=shared",
        StoreScope::Device,
    )
    .await;
    assert!(repo.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_persists_in_progress_status() {
    let repo = connect(
        "sqlite:file:memdb_started?mode=memory&cache=shared",
        StoreScope::Device,
    )
    .await;

    let mut progress = TestProgress::not_started(TestId::new("html-basics"));
    assert!(progress.mark_started());
    let map: ProgressMap = [(TestId::new("html-basics"), progress)].into_iter().collect();
    repo.save(&map).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert_eq!(
        loaded[&TestId::new("html-basics")].status(),
        TestStatus::InProgress
    );
}

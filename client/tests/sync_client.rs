//! `SyncClient` driven through the runtime store against an in-memory repository.

#![allow(clippy::expect_used)] // Test code uses expect for clear failure messages
#![allow(clippy::unwrap_used)]

use composable_todo_client::{Filter, Operation, RepositoryApi, SyncClient, SyncEnvironment};
use composable_todo_core::{NewTodo, TodoId, TodoRepository};
use composable_todo_testing::InMemoryTodoRepository;
use std::sync::Arc;
use std::time::Duration;

fn client_for(repo: &InMemoryTodoRepository) -> SyncClient {
    let api = RepositoryApi::new(Arc::new(repo.clone()));
    SyncClient::new(SyncEnvironment::new(Arc::new(api)))
}

async fn titles(client: &SyncClient) -> Vec<String> {
    client.view().await.into_iter().map(|t| t.title).collect()
}

async fn id_of(client: &SyncClient, title: &str) -> TodoId {
    client
        .mirror()
        .await
        .into_iter()
        .find(|t| t.title == title)
        .expect("title is in the mirror")
        .id
}

#[tokio::test]
async fn create_create_toggle_scenario() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);

    client.add("A", None).await.unwrap();
    client.add("B", None).await.unwrap();
    client.toggle(id_of(&client, "A").await).await.unwrap();

    assert_eq!(titles(&client).await, vec!["B", "A"]);
    client.set_filter(Filter::Active).await.unwrap();
    assert_eq!(titles(&client).await, vec!["B"]);
    client.set_filter(Filter::Completed).await.unwrap();
    assert_eq!(titles(&client).await, vec!["A"]);

    let counts = client.counts().await;
    assert_eq!((counts.active, counts.completed), (1, 1));
    assert!(client.notices().await.is_empty());
}

#[tokio::test]
async fn mirror_matches_server_after_each_mutation() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);

    client.add("  Padded  ", Some(" note ".into())).await.unwrap();
    let id = id_of(&client, "Padded").await;
    assert_eq!(client.mirror().await[0], repo.get(id).await.unwrap());

    client.toggle(id).await.unwrap();
    assert_eq!(client.mirror().await[0], repo.get(id).await.unwrap());

    client.toggle(id).await.unwrap();
    let server = repo.get(id).await.unwrap();
    assert!(!server.completed);
    assert_eq!(client.mirror().await[0], server);

    client.remove(id).await.unwrap();
    assert!(client.mirror().await.is_empty());
    assert!(repo.is_empty());
}

#[tokio::test]
async fn reload_picks_up_out_of_band_changes() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);
    repo.create(NewTodo::new("Made elsewhere", None).unwrap()).await.unwrap();

    assert!(client.view().await.is_empty());
    client.reload().await.unwrap();
    assert_eq!(titles(&client).await, vec!["Made elsewhere"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn overlapping_toggle_and_reload_both_land() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);
    client.add("Contended", None).await.unwrap();
    let id = id_of(&client, "Contended").await;

    for _ in 0..10 {
        let before = repo.get(id).await.unwrap();
        let (toggled, reloaded) = tokio::join!(client.toggle(id), client.reload());
        toggled.unwrap();
        reloaded.unwrap();
        let after = repo.get(id).await.unwrap();

        let mirrored = client.mirror().await;
        assert_eq!(mirrored.len(), 1);
        assert!(
            mirrored[0] == before || mirrored[0] == after,
            "mirror holds {:?}, server went {:?} -> {:?}",
            mirrored[0],
            before,
            after
        );
    }

    assert!(client.notices().await.is_empty());
    client.reload().await.unwrap();
    assert_eq!(client.mirror().await, repo.list().await.unwrap());
}

#[tokio::test]
async fn failures_leave_mirror_and_raise_one_notice_each() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);
    client.add("Stable", None).await.unwrap();
    let before = client.mirror().await;
    let id = before[0].id;

    repo.set_failing(true);
    client.reload().await.unwrap();
    client.add("Nope", None).await.unwrap();
    client.toggle(id).await.unwrap();
    client.remove(id).await.unwrap();

    assert_eq!(client.mirror().await, before);
    let notices = client.notices().await;
    let operations: Vec<_> = notices.iter().map(|n| n.operation).collect();
    assert_eq!(
        operations,
        vec![Operation::Load, Operation::Create, Operation::Update, Operation::Delete]
    );
    assert_eq!(notices[0].message, "Failed to load todos: Internal server error");
    assert_eq!(notices[3].message, "Failed to delete todo: Internal server error");
}

#[tokio::test]
async fn deleting_an_id_removed_elsewhere_reports_not_found() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);
    client.add("Ghost", None).await.unwrap();
    let id = id_of(&client, "Ghost").await;
    repo.delete(id).await.unwrap();

    client.remove(id).await.unwrap();

    assert_eq!(client.mirror().await.len(), 1);
    assert_eq!(
        client.notices().await[0].message,
        format!("Failed to delete todo: Todo with id {id} not found")
    );
}

#[tokio::test(start_paused = true)]
async fn notices_dismiss_themselves() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);

    client.add("", None).await.unwrap();
    assert_eq!(client.notices().await.len(), 1);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(client.notices().await.len(), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(client.notices().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn auto_reload_converges_on_interval() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);

    client.start_auto_reload().await.unwrap();
    assert!(client.view().await.is_empty());

    repo.create(NewTodo::new("Appears later", None).unwrap()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(29)).await;
    assert!(client.view().await.is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(titles(&client).await, vec!["Appears later"]);

    client.stop_auto_reload().await.unwrap();
    repo.create(NewTodo::new("Never seen", None).unwrap()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(client.view().await.len(), 1);
}

#[tokio::test]
async fn commands_are_rejected_after_shutdown() {
    let repo = InMemoryTodoRepository::new();
    let client = client_for(&repo);
    client.shutdown(Duration::from_secs(1)).await.unwrap();

    assert!(client.reload().await.is_err());
}

//! Integration tests for the dashboard data path: todos through the
//! service layer on a file-backed store, and wallpaper resolution against a
//! signing endpoint.

use std::sync::Arc;

use moodelix_core::integrations::RemotePresigner;
use moodelix_core::storage::task_progress_pct;
use moodelix_core::wallpaper::{live_wallpapers, WallpaperResolver};
use moodelix_core::{Database, Presigner, TodoPatch, TodoService};

#[tokio::test]
async fn test_todos_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("moodelix.db");

    let token = {
        let db = Database::open_path(&path).unwrap();
        db.upsert_profile("u1", "a@example.com", "Ada").unwrap();
        let token = db.create_session("u1").unwrap();
        let todos = TodoService::new(Arc::new(db), Some(token.clone()));

        let a = todos.add_todo("Outline chapter").await.unwrap();
        todos.add_todo("Review notes").await.unwrap();
        assert!(todos.add_todo("  ").await.is_none());
        todos
            .update_todo(&a.id, &TodoPatch::completed(true))
            .await
            .unwrap();
        token
    };

    let db = Database::open_path(&path).unwrap();
    let todos = TodoService::new(Arc::new(db), Some(token));
    let list = todos.fetch_todos().await;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].title, "Review notes");
    assert_eq!(task_progress_pct(&list), 50);

    assert!(todos.delete_todo(&list[0].id).await);
    assert!(!todos.delete_todo(&list[0].id).await);
    assert_eq!(task_progress_pct(&todos.fetch_todos().await), 100);
}

#[tokio::test]
async fn test_rejected_signing_falls_back_without_caching() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/wallpapers")
        .with_status(403)
        .with_body(r#"{"error":"Forbidden"}"#)
        .expect(2)
        .create_async()
        .await;

    let presigner: Arc<dyn Presigner> = Arc::new(RemotePresigner::new(&format!(
        "{}/api/wallpapers",
        server.url()
    )));
    let mut resolver = WallpaperResolver::new(Some(presigner), None);

    let key = "live-wallpapers/cyberpunk.mp4";
    assert_eq!(resolver.resolve(key).await, "/wallpaper/live wallpapers/cyberpunk.mp4");
    assert!(resolver.cached(key).is_none());
    assert_eq!(resolver.resolve(key).await, "/wallpaper/live wallpapers/cyberpunk.mp4");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_preload_uses_signed_urls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/wallpapers")
        .with_status(200)
        .with_body(r#"{"signedUrl":"https://signed.example/clip.mp4"}"#)
        .expect(3)
        .create_async()
        .await;

    let presigner: Arc<dyn Presigner> = Arc::new(RemotePresigner::new(&format!(
        "{}/api/wallpapers",
        server.url()
    )));
    let mut resolver = WallpaperResolver::new(Some(presigner), None);
    let live = live_wallpapers();
    resolver.preload_neighbors(&live, 1).await;

    assert!(resolver.cached(live[1].key).is_none());
    assert_eq!(resolver.cached(live[2].key), Some("https://signed.example/clip.mp4"));
    assert_eq!(resolver.cached(live[0].key), Some("https://signed.example/clip.mp4"));
    assert_eq!(resolver.cached(live[3].key), Some("https://signed.example/clip.mp4"));
    mock.assert_async().await;
}

//! Service-level integration tests for the artifact store, running
//! against a fresh migrated database per test.

use std::collections::HashSet;
use std::time::Duration;

use sqlx::SqlitePool;

use config_depot::error::AppError;
use config_depot::services::artifact_service::{ArtifactService, NewArtifact, MAX_PAGE_SIZE};
use config_depot::services::changelog_service::ChangelogService;
use config_depot::services::stats_service::StatsService;
use config_depot::services::token_service::UpdateTokenStore;

fn sample(name: &str, category: Option<&str>, uploader: &str) -> NewArtifact {
    NewArtifact {
        name: name.into(),
        description: "A sample configuration".into(),
        uploader_name: uploader.into(),
        category: category.map(Into::into),
        data: r#"{"a":1}"#.into(),
        point_count: Some(12),
        config_name: None,
    }
}

#[sqlx::test]
async fn create_then_get_round_trips_payload_and_metadata(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    let mut new = sample("  cfgA  ", Some("Racing"), "  alice ");
    new.description = "  described  ".into();
    let created = service.create(new).await.unwrap();

    let artifact = service.get(created.id).await.unwrap();
    assert_eq!(artifact.payload, br#"{"a":1}"#);
    assert_eq!(artifact.name, "cfgA");
    assert_eq!(artifact.description, "described");
    assert_eq!(artifact.uploader_name, "alice");
    assert_eq!(artifact.category, "Racing");
    assert_eq!(artifact.point_count, 12);
    assert_eq!(artifact.config_name, "Default");
    assert_eq!(artifact.version, None);
    assert_eq!(artifact.uploaded_at, created.uploaded_at);
    assert_eq!(artifact.last_update, None);
}

#[sqlx::test]
async fn ids_are_unique_and_increasing(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    let mut previous = 0;
    for i in 0..5 {
        let created = service
            .create(sample(&format!("cfg{i}"), None, "u"))
            .await
            .unwrap();
        assert!(created.id > previous);
        previous = created.id;
    }
}

#[sqlx::test]
async fn create_validates_required_and_bounded_fields(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    let mut missing_name = sample("   ", None, "u");
    missing_name.name = "   ".into();
    assert!(matches!(
        service.create(missing_name).await,
        Err(AppError::Validation(_))
    ));

    let long_name = sample(&"x".repeat(101), None, "u");
    assert!(matches!(
        service.create(long_name).await,
        Err(AppError::Validation(_))
    ));

    let mut long_description = sample("cfg", None, "u");
    long_description.description = "x".repeat(501);
    assert!(matches!(
        service.create(long_description).await,
        Err(AppError::Validation(_))
    ));

    let mut bad_payload = sample("cfg", None, "u");
    bad_payload.data = "{not json".into();
    assert!(matches!(
        service.create(bad_payload).await,
        Err(AppError::Validation(_))
    ));
}

#[sqlx::test]
async fn empty_category_defaults_to_general(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    let created = service.create(sample("cfg", Some("   "), "u")).await.unwrap();
    let artifact = service.get(created.id).await.unwrap();
    assert_eq!(artifact.category, "General");
}

#[sqlx::test]
async fn pagination_pages_are_disjoint_and_cover_everything(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    let mut all_ids = HashSet::new();
    for i in 0..25 {
        let created = service
            .create(sample(&format!("cfg{i}"), None, "u"))
            .await
            .unwrap();
        all_ids.insert(created.id);
    }

    let mut seen = HashSet::new();
    for page in 1..=3 {
        let (entries, total) = service.list(page, 10, None).await.unwrap();
        assert_eq!(total, 25);
        assert_eq!(entries.len(), if page == 3 { 5 } else { 10 });
        for entry in entries {
            assert!(seen.insert(entry.id), "id {} appeared twice", entry.id);
        }
    }
    assert_eq!(seen, all_ids);
}

#[sqlx::test]
async fn list_is_sorted_newest_first(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    for i in 0..6 {
        service
            .create(sample(&format!("cfg{i}"), None, "u"))
            .await
            .unwrap();
    }

    let (entries, _) = service.list(1, 10, None).await.unwrap();
    for pair in entries.windows(2) {
        assert!(pair[0].uploaded_at >= pair[1].uploaded_at);
    }
    assert_eq!(entries[0].name, "cfg5");
}

#[sqlx::test]
async fn list_clamps_page_size(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    for i in 0..60 {
        service
            .create(sample(&format!("cfg{i}"), None, "u"))
            .await
            .unwrap();
    }

    let (entries, total) = service.list(1, 500, None).await.unwrap();
    assert_eq!(total, 60);
    assert_eq!(entries.len(), MAX_PAGE_SIZE as usize);
}

#[sqlx::test]
async fn category_filter_is_case_insensitive_with_all_sentinel(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    service.create(sample("a", Some("Racing"), "u")).await.unwrap();
    service.create(sample("b", Some("racing"), "u")).await.unwrap();
    service.create(sample("c", Some("Drift"), "u")).await.unwrap();

    let (entries, total) = service.list(1, 10, Some("RACING")).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(entries.len(), 2);

    let (_, total_all) = service.list(1, 10, Some("All")).await.unwrap();
    assert_eq!(total_all, 3);
    let (_, total_none) = service.list(1, 10, None).await.unwrap();
    assert_eq!(total_none, 3);
}

#[sqlx::test]
async fn search_matches_across_fields_case_insensitively(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    service.create(sample("Alpha Setup", None, "carol")).await.unwrap();
    let mut by_description = sample("other", None, "dave");
    by_description.description = "tuned for alpha tracks".into();
    service.create(by_description).await.unwrap();
    service.create(sample("unrelated", Some("AlphaCars"), "erin")).await.unwrap();
    service.create(sample("nothing here", None, "frank")).await.unwrap();

    let results = service.search("ALPHA").await.unwrap();
    assert_eq!(results.len(), 3);

    let by_uploader = service.search("carol").await.unwrap();
    assert_eq!(by_uploader.len(), 1);

    assert!(matches!(
        service.search("   ").await,
        Err(AppError::Validation(_))
    ));
}

#[sqlx::test]
async fn search_treats_like_metacharacters_literally(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    service.create(sample("100% done", None, "u")).await.unwrap();
    service.create(sample("100 done", None, "u")).await.unwrap();
    service.create(sample("a_b setup", None, "u")).await.unwrap();
    service.create(sample("aXb setup", None, "u")).await.unwrap();

    let results = service.search("100%").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "100% done");

    let results = service.search("a_b").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "a_b setup");
}

#[sqlx::test]
async fn replace_payload_bumps_patch_and_appends_changelog(pool: SqlitePool) {
    let service = ArtifactService::new(pool.clone());
    let changelog = ChangelogService::new(pool);

    let created = service.create(sample("cfg", None, "u")).await.unwrap();

    for n in 1..=3u32 {
        let next = service
            .replace_payload(created.id, &format!(r#"{{"a":{n}}}"#), &format!("change {n}"))
            .await
            .unwrap();
        assert_eq!(next.to_string(), format!("1.0.{n}"));
    }

    let artifact = service.get(created.id).await.unwrap();
    assert_eq!(artifact.version.as_deref(), Some("1.0.3"));
    assert_eq!(artifact.payload, br#"{"a":3}"#);
    assert_eq!(artifact.last_changes.as_deref(), Some("change 3"));
    assert!(artifact.last_update.is_some());

    let history = changelog.history(&artifact).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].version, "1.0.3");
    assert_eq!(history[2].version, "1.0.1");
    for pair in history.windows(2) {
        assert!(pair[0].date >= pair[1].date);
    }
}

#[sqlx::test]
async fn replace_payload_rejects_malformed_stored_version(pool: SqlitePool) {
    let service = ArtifactService::new(pool.clone());
    let created = service.create(sample("cfg", None, "u")).await.unwrap();

    sqlx::query("UPDATE artifacts SET version = 'not-a-version' WHERE id = ?")
        .bind(created.id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(matches!(
        service.replace_payload(created.id, "{}", "change").await,
        Err(AppError::Internal(_))
    ));
}

#[sqlx::test]
async fn replace_payload_unknown_id_is_not_found(pool: SqlitePool) {
    let service = ArtifactService::new(pool);
    assert!(matches!(
        service.replace_payload(9999, "{}", "change").await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test]
async fn download_normalizes_legacy_payload_encodings(pool: SqlitePool) {
    let service = ArtifactService::new(pool.clone());
    let canonical: &[u8] = br#"{"a":1}"#;

    let created = service.create(sample("cfg", None, "u")).await.unwrap();
    let (_, bytes) = service.download(created.id).await.unwrap();
    assert_eq!(bytes, canonical);

    // Rewrite the stored payload the way the legacy tagged-buffer path
    // did and confirm reads still normalize to identical bytes.
    let data: Vec<String> = canonical.iter().map(|b| b.to_string()).collect();
    let tagged = format!(r#"{{"type":"Buffer","data":[{}]}}"#, data.join(","));
    sqlx::query("UPDATE artifacts SET payload = ? WHERE id = ?")
        .bind(tagged.as_bytes())
        .bind(created.id)
        .execute(&pool)
        .await
        .unwrap();

    let (_, bytes) = service.download(created.id).await.unwrap();
    assert_eq!(bytes, canonical);
}

#[sqlx::test]
async fn download_round_trips_documents_shaped_like_legacy_encodings(pool: SqlitePool) {
    let service = ArtifactService::new(pool);

    // Uploaded documents whose shape coincides with a historical
    // payload encoding must still come back byte-identical.
    for doc in [
        r#"[1,2,3]"#,
        r#""aGVsbG8=""#,
        r#"{"type":"Buffer","data":[1,2,3]}"#,
    ] {
        let mut new = sample("cfg", None, "u");
        new.data = doc.into();
        let created = service.create(new).await.unwrap();
        let (_, bytes) = service.download(created.id).await.unwrap();
        assert_eq!(bytes, doc.as_bytes());
    }
}

#[sqlx::test]
async fn delete_is_permanent_and_removes_history(pool: SqlitePool) {
    let service = ArtifactService::new(pool.clone());
    let changelog_count = |pool: SqlitePool, id: i64| async move {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM changelog WHERE artifact_id = ?")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap()
    };

    assert!(matches!(
        service.delete(9999).await,
        Err(AppError::NotFound(_))
    ));

    let created = service.create(sample("cfg", None, "u")).await.unwrap();
    service
        .replace_payload(created.id, "{}", "change")
        .await
        .unwrap();
    assert_eq!(changelog_count(pool.clone(), created.id).await, 1);

    service.delete(created.id).await.unwrap();
    assert!(matches!(
        service.get(created.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(changelog_count(pool, created.id).await, 0);
}

#[sqlx::test]
async fn changelog_falls_back_to_reconstruction(pool: SqlitePool) {
    let service = ArtifactService::new(pool.clone());
    let changelog = ChangelogService::new(pool.clone());

    // Fresh artifact, nothing to reconstruct from: empty history.
    let created = service.create(sample("cfg", None, "u")).await.unwrap();
    let artifact = service.get(created.id).await.unwrap();
    assert!(changelog.history(&artifact).await.unwrap().is_empty());

    // Simulate a pre-ledger artifact that carries update fields but
    // has no changelog rows.
    sqlx::query(
        "UPDATE artifacts SET version = '1.0.4', last_changes = 'old tweak', last_update = uploaded_at WHERE id = ?",
    )
    .bind(created.id)
    .execute(&pool)
    .await
    .unwrap();

    let artifact = service.get(created.id).await.unwrap();
    let history = changelog.history(&artifact).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version, "1.0.4");
    assert_eq!(history[0].changes, "old tweak");
}

#[sqlx::test]
async fn stats_aggregate_counts_and_recent_uploads(pool: SqlitePool) {
    let service = ArtifactService::new(pool.clone());
    let stats = StatsService::new(pool);

    for i in 0..7 {
        let category = if i % 2 == 0 { "Racing" } else { "Drift" };
        let uploader = if i < 5 { "alice" } else { "bob" };
        service
            .create(sample(&format!("cfg{i}"), Some(category), uploader))
            .await
            .unwrap();
    }

    let usage = stats.usage().await.unwrap();
    assert_eq!(usage.total_artifacts, 7);
    assert_eq!(usage.by_category.len(), 2);
    assert_eq!(usage.by_category[0].category, "Racing");
    assert_eq!(usage.by_category[0].count, 4);
    assert_eq!(usage.by_uploader[0].uploader_name, "alice");
    assert_eq!(usage.by_uploader[0].count, 5);
    assert_eq!(usage.recent.len(), 5);
    assert_eq!(usage.recent[0].name, "cfg6");
}

#[tokio::test]
async fn update_tokens_expire_after_their_lifetime() {
    let store = UpdateTokenStore::new(Duration::from_millis(25));
    let token = store.issue(1);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!store.redeem(1, &token));
}

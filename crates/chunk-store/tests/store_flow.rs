//! End-to-end flows: insert, query semantics, persistence, concurrency.

use pretty_assertions::assert_eq;
use rag_chunk_store::{ChunkStore, ChunkStoreError, QueryParams, StoreConfig};
use serde_json::{json, Value};
use tempfile::TempDir;

fn store2d() -> ChunkStore {
    ChunkStore::new(StoreConfig::with_dimension(2)).unwrap()
}

async fn seed_axis_corpus(store: &ChunkStore) {
    store
        .insert("doc", "exact", 0, vec![1.0, 0.0], Value::Null)
        .await
        .unwrap();
    store
        .insert("doc", "orthogonal", 1, vec![0.0, 1.0], Value::Null)
        .await
        .unwrap();
    store
        .insert("doc", "near", 2, vec![0.9, 0.1], Value::Null)
        .await
        .unwrap();
}

#[tokio::test]
async fn ranks_near_matches_and_excludes_orthogonal() {
    let store = store2d();
    seed_axis_corpus(&store).await;

    let params = QueryParams {
        match_threshold: 0.5,
        match_count: 5,
    };
    let matches = store.search_similar(&[1.0, 0.0], &params).await.unwrap();

    let texts: Vec<&str> = matches.iter().map(|m| m.chunk_text.as_str()).collect();
    assert_eq!(texts, vec!["exact", "near"]);

    assert!((matches[0].similarity - 1.0).abs() < 1e-6);
    assert!(matches[1].similarity > 0.99);
    // The orthogonal chunk sits exactly at similarity 0.0, below threshold.
    assert!(matches.iter().all(|m| m.similarity > 0.5));
}

#[tokio::test]
async fn empty_corpus_yields_empty_result() {
    let store = store2d();
    let matches = store
        .search_similar(&[1.0, 0.0], &QueryParams::default())
        .await
        .unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn threshold_is_a_strict_bound() {
    let store = store2d();
    seed_axis_corpus(&store).await;

    // Similarity exactly 1.0 for the duplicate chunk is not > 1.0.
    let params = QueryParams {
        match_threshold: 1.0,
        match_count: 5,
    };
    assert!(store
        .search_similar(&[1.0, 0.0], &params)
        .await
        .unwrap()
        .is_empty());

    // Similarity exactly 0.0 for the orthogonal chunk is not > 0.0.
    let params = QueryParams {
        match_threshold: 0.0,
        match_count: 5,
    };
    let matches = store.search_similar(&[0.0, 1.0], &params).await.unwrap();
    assert!(matches.iter().all(|m| m.similarity > 0.0));
    assert!(matches.iter().all(|m| m.chunk_text != "exact"));
    assert_eq!(matches[0].chunk_text, "orthogonal");
}

#[tokio::test]
async fn zero_match_count_yields_empty_result() {
    let store = store2d();
    seed_axis_corpus(&store).await;

    let params = QueryParams {
        match_threshold: -2.0,
        match_count: 0,
    };
    assert!(store
        .search_similar(&[1.0, 0.0], &params)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn out_of_range_threshold_is_accepted_as_is() {
    let store = store2d();
    seed_axis_corpus(&store).await;

    // Below -1 admits everything the index surfaces.
    let params = QueryParams {
        match_threshold: -2.0,
        match_count: 10,
    };
    assert_eq!(
        store
            .search_similar(&[1.0, 0.0], &params)
            .await
            .unwrap()
            .len(),
        3
    );

    // Above 1 can never admit anything.
    let params = QueryParams {
        match_threshold: 2.0,
        match_count: 10,
    };
    assert!(store
        .search_similar(&[1.0, 0.0], &params)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn results_are_bounded_and_sorted() {
    let store = store2d();
    for i in 0..40u64 {
        let angle = i as f32 * 0.03;
        store
            .insert(
                "doc",
                format!("chunk {i}"),
                i as usize,
                vec![angle.cos(), angle.sin()],
                Value::Null,
            )
            .await
            .unwrap();
    }

    let params = QueryParams {
        match_threshold: 0.5,
        match_count: 7,
    };
    let matches = store.search_similar(&[1.0, 0.0], &params).await.unwrap();

    assert!(matches.len() <= 7);
    assert!(!matches.is_empty());
    for pair in matches.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
    assert!(matches.iter().all(|m| m.similarity > 0.5));
}

#[tokio::test]
async fn repeated_queries_are_idempotent() {
    let store = store2d();
    seed_axis_corpus(&store).await;

    let params = QueryParams::default();
    let first = store.search_similar(&[0.7, 0.3], &params).await.unwrap();
    let second = store.search_similar(&[0.7, 0.3], &params).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn chunk_is_queryable_immediately_after_insert() {
    let store = store2d();
    let id = store
        .insert("doc", "fresh", 0, vec![0.6, 0.8], json!({"k": "v"}))
        .await
        .unwrap();

    let matches = store
        .search_similar(&[0.6, 0.8], &QueryParams::default())
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, id);
    assert_eq!(matches[0].metadata, json!({"k": "v"}));
}

#[tokio::test]
async fn save_and_load_preserve_records_and_rankings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store").join("chunks.json");

    let store = store2d();
    seed_axis_corpus(&store).await;
    let before = store
        .search_similar(&[1.0, 0.0], &QueryParams::default())
        .await
        .unwrap();
    let chunk_before = store.get(2).await.unwrap();
    store.save(&path).await.unwrap();

    let reloaded = ChunkStore::load(&path, StoreConfig::with_dimension(2))
        .await
        .unwrap();
    assert_eq!(reloaded.len().await, 3);
    assert_eq!(reloaded.get(2).await.unwrap(), chunk_before);

    let after = reloaded
        .search_similar(&[1.0, 0.0], &QueryParams::default())
        .await
        .unwrap();
    assert_eq!(before, after);

    // Ids keep advancing from where the snapshot left off.
    let next = reloaded
        .insert("doc", "later", 3, vec![0.5, 0.5], Value::Null)
        .await
        .unwrap();
    assert_eq!(next, 3);
}

#[tokio::test]
async fn load_rejects_mismatched_dimension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chunks.json");

    let store = store2d();
    seed_axis_corpus(&store).await;
    store.save(&path).await.unwrap();

    let err = ChunkStore::load(&path, StoreConfig::with_dimension(3))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ChunkStoreError::DimensionMismatch { .. }));
}

#[tokio::test]
async fn concurrent_writers_and_readers_stay_consistent() {
    let store = store2d();

    let mut tasks = Vec::new();
    for w in 0..4u64 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            for i in 0..25u64 {
                let angle = (w * 25 + i) as f32 * 0.01;
                store
                    .insert(
                        format!("doc-{w}"),
                        format!("chunk {i}"),
                        i as usize,
                        vec![angle.cos(), angle.sin()],
                        Value::Null,
                    )
                    .await
                    .unwrap();
            }
        }));
    }
    for r in 0..4u64 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            let params = QueryParams {
                match_threshold: 0.5,
                match_count: 5,
            };
            for _ in 0..25 {
                // Never errors and never exceeds the bound, whatever subset
                // of the concurrent inserts is visible.
                let matches = store.search_similar(&[1.0, 0.0], &params).await.unwrap();
                assert!(matches.len() <= 5);
                let _ = r;
                tokio::task::yield_now().await;
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.len().await, 100);
    assert_eq!(store.list_documents().await.len(), 4);

    // Ids were never reused across concurrent writers.
    let mut seen = std::collections::HashSet::new();
    for doc in 0..4u64 {
        for chunk in store.document_chunks(&format!("doc-{doc}")).await {
            assert!(seen.insert(chunk.id));
        }
    }
    assert_eq!(seen.len(), 100);
}

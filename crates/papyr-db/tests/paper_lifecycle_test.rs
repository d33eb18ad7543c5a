//! Postgres-backed paper lifecycle tests.

use futures::future::join_all;
use papyr_db::test_fixtures::connect_test_database;
use papyr_db::{Error, FinalizePaper, NewPaper, PaperRepository, PaperStatus};
use uuid::Uuid;

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_insert_then_fetch_uploaded_paper() {
    let db = connect_test_database().await.expect("Failed to connect");
    let paper = db
        .papers
        .insert(NewPaper {
            title: "attention is all you need".to_string(),
            raw_text: "We propose the Transformer".to_string(),
        })
        .await
        .expect("insert");

    let fetched = db.papers.fetch(paper.id).await.expect("fetch");
    assert_eq!(fetched.status, PaperStatus::Uploaded);
    assert_eq!(fetched.raw_text, "We propose the Transformer");
    assert!(fetched.summary.is_empty());
    assert!(fetched.keywords.is_empty());
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_finalize_twice_conflicts() {
    let db = connect_test_database().await.expect("Failed to connect");
    let paper = db
        .papers
        .insert(NewPaper {
            title: "draft".to_string(),
            raw_text: String::new(),
        })
        .await
        .expect("insert");

    let keywords = vec!["machine learning".to_string(), "Transformer".to_string()];
    let input = FinalizePaper::new("Final title", "Summary.", &keywords).expect("valid");

    let done = db.papers.finalize(paper.id, input.clone()).await.expect("finalize");
    assert_eq!(done.status, PaperStatus::Finalized);
    assert_eq!(done.keywords, keywords);

    let err = db.papers.finalize(paper.id, input).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_concurrent_finalize_single_winner() {
    let db = connect_test_database().await.expect("Failed to connect");
    let paper = db
        .papers
        .insert(NewPaper {
            title: "race".to_string(),
            raw_text: String::new(),
        })
        .await
        .expect("insert");

    let inputs: Vec<FinalizePaper> = (0..6)
        .map(|i| FinalizePaper::new("T", &format!("summary {i}"), &[]).expect("valid"))
        .collect();
    let results = join_all(inputs.into_iter().map(|input| db.papers.finalize(paper.id, input))).await;

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(Error::Conflict(_))))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 5);
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_fetch_missing_paper() {
    let db = connect_test_database().await.expect("Failed to connect");
    let err = db.papers.fetch(Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, Error::PaperNotFound(_)));
    assert!(!db.papers.exists(Uuid::now_v7()).await.expect("exists"));
}

// tests/store_tests.rs

use std::{path::PathBuf, sync::Arc, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use sweepstake::{
    config::default_catalog,
    error::AppError,
    models::{guest::SubmissionTarget, question::{Question, QuestionKind}},
    store::{guests, leaderboard, questions, responses, seed, submission},
    utils::answer::RawAnswer,
};

/// In-memory database with migrations applied and the default catalog loaded.
/// A single connection keeps every query on the same in-memory database.
async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    seed::setup(&pool, &default_catalog())
        .await
        .expect("Failed to set up database");

    pool
}

/// On-disk database with several connections, so transactions can overlap.
async fn file_pool() -> (SqlitePool, PathBuf) {
    let path = std::env::temp_dir().join(format!("sweepstake-{}.db", uuid::Uuid::new_v4()));
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .expect("Failed to open SQLite file");

    seed::setup(&pool, &default_catalog())
        .await
        .expect("Failed to set up database");

    (pool, path)
}

async fn remove_file_pool(pool: SqlitePool, path: PathBuf) {
    pool.close().await;
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        std::fs::remove_file(file).ok();
    }
}

async fn question_by_order(pool: &SqlitePool, order: i64) -> Question {
    questions::list_active_questions(pool)
        .await
        .unwrap()
        .into_iter()
        .find(|q| q.order == order)
        .expect("question with that order")
}

async fn add_guest(pool: &SqlitePool, first: &str, last: &str) -> i64 {
    guests::insert_guest(pool, first, last).await.unwrap()
}

/// Adds a guest and commits their answers as a final submission.
async fn submitted_guest(pool: &SqlitePool, first: &str, answers: &[(i64, f64)]) -> i64 {
    let id = add_guest(pool, first, "Guest").await;
    let token = format!("token-{}", first);
    submission::commit_submission(
        pool,
        &SubmissionTarget::Listed(id),
        answers,
        &token,
        &format!("qr_codes/{}.svg", token),
    )
    .await
    .unwrap();
    id
}

async fn response_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM responses")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn setup_is_idempotent() {
    let pool = test_pool().await;
    seed::setup(&pool, &default_catalog()).await.unwrap();

    let questions = questions::list_active_questions(&pool).await.unwrap();
    assert_eq!(questions.len(), 7);
    assert!(questions.iter().all(|q| q.actual_answer.is_none()));
    assert_eq!(questions[1].kind, QuestionKind::Time);
    assert_eq!(questions[1].min_hint.as_deref(), Some("13:00"));
}

#[tokio::test]
async fn saving_twice_keeps_one_response_with_latest_value() {
    let pool = test_pool().await;
    let guest = add_guest(&pool, "Ada", "Lovelace").await;
    let photos = question_by_order(&pool, 1).await;

    let mut conn = pool.acquire().await.unwrap();
    responses::save_response(&mut conn, guest, photos.id, &RawAnswer::from("500"))
        .await
        .unwrap();
    let stored = responses::save_response(&mut conn, guest, photos.id, &RawAnswer::from("750"))
        .await
        .unwrap();
    drop(conn);

    assert_eq!(stored, 750.0);
    let answers = responses::list_guest_answers(&pool, guest).await.unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].answer, 750.0);
}

#[tokio::test]
async fn time_answers_are_stored_as_minutes() {
    let pool = test_pool().await;
    let guest = add_guest(&pool, "Ada", "Lovelace").await;
    let ceremony = question_by_order(&pool, 2).await;

    let mut conn = pool.acquire().await.unwrap();
    let stored = responses::save_response(&mut conn, guest, ceremony.id, &RawAnswer::from("13:35"))
        .await
        .unwrap();

    assert_eq!(stored, 815.0);
}

#[tokio::test]
async fn malformed_answers_persist_nothing() {
    let pool = test_pool().await;
    let guest = add_guest(&pool, "Ada", "Lovelace").await;
    let ceremony = question_by_order(&pool, 2).await;
    let photos = question_by_order(&pool, 1).await;

    let mut conn = pool.acquire().await.unwrap();
    for (question_id, raw) in [
        (ceremony.id, "18"),
        (ceremony.id, "18:xx"),
        (ceremony.id, ""),
        (photos.id, "-"),
        (photos.id, ""),
    ] {
        let result = responses::save_response(&mut conn, guest, question_id, &RawAnswer::from(raw)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))), "accepted {:?}", raw);
    }
    drop(conn);

    assert_eq!(response_count(&pool).await, 0);
}

#[tokio::test]
async fn saving_for_unknown_guest_or_question_is_not_found() {
    let pool = test_pool().await;
    let guest = add_guest(&pool, "Ada", "Lovelace").await;
    let photos = question_by_order(&pool, 1).await;

    let mut conn = pool.acquire().await.unwrap();
    let unknown_guest = responses::save_response(&mut conn, 999, photos.id, &RawAnswer::from("1")).await;
    let unknown_question = responses::save_response(&mut conn, guest, 999, &RawAnswer::from("1")).await;
    drop(conn);

    assert!(matches!(unknown_guest, Err(AppError::NotFound(_))));
    assert!(matches!(unknown_question, Err(AppError::NotFound(_))));
    assert_eq!(response_count(&pool).await, 0);
}

#[tokio::test]
async fn set_actual_answer_parses_or_clears() {
    let pool = test_pool().await;
    let photos = question_by_order(&pool, 1).await;
    let cake = question_by_order(&pool, 6).await;

    let set = questions::set_actual_answer(&pool, photos.id, Some(&RawAnswer::from("1200"))).await;
    assert_eq!(set.unwrap(), Some(1200.0));

    let set = questions::set_actual_answer(&pool, cake.id, Some(&RawAnswer::from("19:45"))).await;
    assert_eq!(set.unwrap(), Some(1185.0));

    let cleared = questions::set_actual_answer(&pool, photos.id, Some(&RawAnswer::from("lots"))).await;
    assert_eq!(cleared.unwrap(), None);
    let reloaded = questions::get_question(&pool, photos.id).await.unwrap().unwrap();
    assert_eq!(reloaded.actual_answer, None);

    let cleared = questions::set_actual_answer(&pool, cake.id, None).await;
    assert_eq!(cleared.unwrap(), None);

    let missing = questions::set_actual_answer(&pool, 999, Some(&RawAnswer::from("1"))).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn score_is_unset_without_known_actual_answers() {
    let pool = test_pool().await;
    let photos = question_by_order(&pool, 1).await;
    let guest = submitted_guest(&pool, "Ada", &[(photos.id, 900.0)]).await;

    assert_eq!(leaderboard::guest_score(&pool, guest).await.unwrap(), None);
    assert!(leaderboard::overall_leaderboard(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn score_is_mean_percentage_error() {
    let pool = test_pool().await;
    let photos = question_by_order(&pool, 1).await;
    let speeches = question_by_order(&pool, 3).await;
    let dance = question_by_order(&pool, 5).await;
    let thanks = question_by_order(&pool, 7).await;

    for q in [&photos, &speeches, &dance] {
        questions::set_actual_answer(&pool, q.id, Some(&RawAnswer::Number(100.0)))
            .await
            .unwrap();
    }

    // The unanswered-by-admin question does not count.
    let guest = submitted_guest(
        &pool,
        "Ada",
        &[(photos.id, 90.0), (speeches.id, 110.0), (dance.id, 100.0), (thanks.id, 3.0)],
    )
    .await;

    let score = leaderboard::guest_score(&pool, guest).await.unwrap().unwrap();
    assert!((score - 20.0 / 3.0).abs() < 1e-9);

    let board = leaderboard::overall_leaderboard(&pool).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].score, 6.67);
    assert_eq!(board[0].rank, 1);
}

#[tokio::test]
async fn zero_actual_uses_absolute_error() {
    let pool = test_pool().await;
    let thanks = question_by_order(&pool, 7).await;
    questions::set_actual_answer(&pool, thanks.id, Some(&RawAnswer::from("0")))
        .await
        .unwrap();

    let guest = submitted_guest(&pool, "Ada", &[(thanks.id, 5.0)]).await;

    assert_eq!(leaderboard::guest_score(&pool, guest).await.unwrap(), Some(5.0));
}

#[tokio::test]
async fn overall_leaderboard_excludes_unsubmitted_guests() {
    let pool = test_pool().await;
    let photos = question_by_order(&pool, 1).await;
    questions::set_actual_answer(&pool, photos.id, Some(&RawAnswer::Number(1000.0)))
        .await
        .unwrap();

    let far = submitted_guest(&pool, "Far", &[(photos.id, 1500.0)]).await;
    let close = submitted_guest(&pool, "Close", &[(photos.id, 990.0)]).await;

    let drafting = add_guest(&pool, "Drafting", "Guest").await;
    let mut conn = pool.acquire().await.unwrap();
    responses::save_response(&mut conn, drafting, photos.id, &RawAnswer::from("1000"))
        .await
        .unwrap();
    drop(conn);

    let board = leaderboard::overall_leaderboard(&pool).await.unwrap();
    let ids: Vec<i64> = board.iter().map(|e| e.guest_id).collect();
    assert_eq!(ids, vec![close, far]);
    assert_eq!(board[0].score, 1.0);
    assert_eq!(board[1].score, 50.0);
    assert_eq!(board[1].rank, 2);
}

#[tokio::test]
async fn question_leaderboard_ranks_by_distance() {
    let pool = test_pool().await;
    let photos = question_by_order(&pool, 1).await;
    questions::set_actual_answer(&pool, photos.id, Some(&RawAnswer::Number(100.0)))
        .await
        .unwrap();

    let low = submitted_guest(&pool, "Low", &[(photos.id, 95.0)]).await;
    let high = submitted_guest(&pool, "High", &[(photos.id, 105.0)]).await;
    let far = submitted_guest(&pool, "Far", &[(photos.id, 80.0)]).await;

    let board = leaderboard::question_leaderboard(&pool, photos.id).await.unwrap();
    let rows: Vec<(i64, usize, &str)> = board
        .iter()
        .map(|e| (e.guest_id, e.rank, e.distance_display.as_str()))
        .collect();
    assert_eq!(rows, vec![(low, 1, "5"), (high, 2, "5"), (far, 3, "20")]);

    // Clearing the actual answer empties the board on the next read.
    questions::set_actual_answer(&pool, photos.id, Some(&RawAnswer::from("")))
        .await
        .unwrap();
    assert!(leaderboard::question_leaderboard(&pool, photos.id).await.unwrap().is_empty());

    let missing = leaderboard::question_leaderboard(&pool, 999).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn second_submission_is_rejected_and_changes_nothing() {
    let pool = test_pool().await;
    let photos = question_by_order(&pool, 1).await;
    let guest = submitted_guest(&pool, "Ada", &[(photos.id, 500.0)]).await;

    let again = submission::commit_submission(
        &pool,
        &SubmissionTarget::Listed(guest),
        &[(photos.id, 9999.0)],
        "other-token",
        "qr_codes/other-token.svg",
    )
    .await;

    assert!(matches!(again, Err(AppError::Conflict(_))));
    let answers = responses::list_guest_answers(&pool, guest).await.unwrap();
    assert_eq!(answers[0].answer, 500.0);
    let stored = guests::get_guest_by_id(&pool, guest).await.unwrap().unwrap();
    assert_eq!(stored.unique_token.as_deref(), Some("token-Ada"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_commit_once() {
    let (pool, path) = file_pool().await;
    let photo_id = question_by_order(&pool, 1).await.id;
    let guest = add_guest(&pool, "Ada", "Lovelace").await;
    let barrier = Arc::new(tokio::sync::Barrier::new(6));

    let attempts: Vec<_> = (0..6)
        .map(|i| {
            let pool = pool.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                let token = format!("tok-{}", i);
                barrier.wait().await;
                submission::commit_submission(
                    &pool,
                    &SubmissionTarget::Listed(guest),
                    &[(photo_id, i as f64)],
                    &token,
                    &format!("qr_codes/{}.svg", token),
                )
                .await
            })
        })
        .collect();

    let mut committed = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => committed += 1,
            Err(e) => assert!(matches!(e, AppError::Conflict(_)), "unexpected error: {:?}", e),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(response_count(&pool).await, 1);
    assert!(guests::has_submitted(&pool, guest).await.unwrap());

    remove_file_pool(pool, path).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submission_waits_for_open_transaction_then_conflicts() {
    let (pool, path) = file_pool().await;
    let photo_id = question_by_order(&pool, 1).await.id;
    let guest = add_guest(&pool, "Ada", "Lovelace").await;

    // First submission holds its write transaction open.
    let mut tx = pool.begin().await.unwrap();
    let marked = guests::mark_submitted(
        &mut *tx,
        guest,
        "qr_codes/first.svg",
        "first",
        chrono::Utc::now(),
    )
    .await
    .unwrap();
    assert!(marked);

    let second = tokio::spawn({
        let pool = pool.clone();
        async move {
            submission::commit_submission(
                &pool,
                &SubmissionTarget::Listed(guest),
                &[(photo_id, 2.0)],
                "second",
                "qr_codes/second.svg",
            )
            .await
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!second.is_finished());
    tx.commit().await.unwrap();

    let result = second.await.unwrap();
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(response_count(&pool).await, 0);
    let stored = guests::get_guest_by_id(&pool, guest).await.unwrap().unwrap();
    assert_eq!(stored.unique_token.as_deref(), Some("first"));

    remove_file_pool(pool, path).await;
}

#[tokio::test]
async fn manual_submission_creates_guest() {
    let pool = test_pool().await;
    let photos = question_by_order(&pool, 1).await;

    let committed = submission::commit_submission(
        &pool,
        &SubmissionTarget::Manual("Grace Brewster Hopper".to_string()),
        &[(photos.id, 321.0)],
        "manual-token",
        "qr_codes/manual-token.svg",
    )
    .await
    .unwrap();

    assert_eq!(committed.guest_name, "Grace Brewster Hopper");
    let guest = guests::get_guest_by_token(&pool, "manual-token").await.unwrap().unwrap();
    assert_eq!(guest.id, committed.guest_id);
    assert_eq!(guest.first_name, "Grace");
    assert_eq!(guest.last_name, "Brewster Hopper");
    assert!(guest.has_submitted);
    assert!(guest.submission_time.is_some());
    assert_eq!(guest.qr_code_path.as_deref(), Some("qr_codes/manual-token.svg"));
}

#[tokio::test]
async fn unknown_guest_submission_is_not_found() {
    let pool = test_pool().await;
    let result = submission::commit_submission(
        &pool,
        &SubmissionTarget::Listed(42),
        &[],
        "tok",
        "qr_codes/tok.svg",
    )
    .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(!guests::has_submitted(&pool, 42).await.unwrap());
}

#[tokio::test]
async fn search_and_counts() {
    let pool = test_pool().await;
    add_guest(&pool, "Ada", "Lovelace").await;
    add_guest(&pool, "Alan", "Turing").await;
    submitted_guest(&pool, "Grace", &[]).await;

    let found = guests::search_guests(&pool, "lov").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].full_name, "Ada Lovelace");

    let found = guests::search_guests(&pool, "a").await.unwrap();
    assert_eq!(found.len(), 3);
    assert!(guests::search_guests(&pool, "  ").await.unwrap().is_empty());

    let count = guests::submission_count(&pool).await.unwrap();
    assert_eq!((count.submitted, count.total), (1, 3));

    let submitted = guests::list_submitted_guests(&pool).await.unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].full_name, "Grace Guest");
}

#[tokio::test]
async fn reset_reloads_questions_and_guests() {
    let pool = test_pool().await;
    let photos = question_by_order(&pool, 1).await;
    submitted_guest(&pool, "Old", &[(photos.id, 1.0)]).await;

    let dir = std::env::temp_dir().join(format!("sweepstake-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let csv_path = dir.join("guests.csv");
    std::fs::write(&csv_path, "first_name,last_name\nAda,Lovelace\nAlan,Turing\n,Nobody\n").unwrap();

    let summary = seed::reset_event(&pool, &default_catalog(), &csv_path).await.unwrap();
    assert_eq!(summary, seed::ResetSummary { questions: 7, guests: 2 });

    assert_eq!(response_count(&pool).await, 0);
    let names: Vec<String> = guests::list_guests(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.full_name)
        .collect();
    assert_eq!(names, vec!["Ada Lovelace", "Alan Turing"]);
    assert_eq!(questions::list_active_questions(&pool).await.unwrap().len(), 7);

    // Without a CSV file the guest list is simply emptied.
    let summary = seed::reset_event(&pool, &default_catalog(), &dir.join("missing.csv"))
        .await
        .unwrap();
    assert_eq!(summary.guests, 0);

    std::fs::remove_dir_all(dir).ok();
}

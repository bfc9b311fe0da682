//! Integration tests for [`RelevantTasksService`] and engine concurrency.

use std::time::Duration;

use chrono::Utc;
use helpmatch_core::test_support::MemorySource;
use helpmatch_core::{
    CandidateTask, Requester, RequesterId, RequesterIdError, ScoreSource, SimilarityError,
    SourceError, TaskStatus,
};
use helpmatch_ranker::test_support::StubSimilarity;
use helpmatch_ranker::{
    RankingConfig, RankingEngine, RankingError, RelevantTasksError, RelevantTasksService,
};
use rstest::{fixture, rstest};
use tokio_util::sync::CancellationToken;

fn requester_id() -> RequesterId {
    RequesterId::new("vol-1").expect("valid id")
}

fn task(id: &str, title: &str) -> CandidateTask {
    CandidateTask::new(id, title, "", Utc::now())
}

#[fixture]
fn source() -> MemorySource {
    MemorySource::new()
        .with_requester(Requester::new(requester_id()).with_skills(["cooking"]))
        .with_tasks([
            task("a", "Walk dogs"),
            task("b", "Cook meals"),
            task("c", "Sort donations").with_status(TaskStatus::Completed),
        ])
}

fn service<S: helpmatch_core::Similarity>(
    profiles: MemorySource,
    tasks: MemorySource,
    similarity: S,
) -> RelevantTasksService<MemorySource, MemorySource, S> {
    let engine = RankingEngine::new(similarity, RankingConfig::default()).expect("valid config");
    RelevantTasksService::new(profiles, tasks, engine)
}

#[rstest]
#[tokio::test]
async fn ranks_only_open_tasks(source: MemorySource) {
    let similarity = StubSimilarity::scoring(20).with_title_score("Cook meals", 75);
    let svc = service(source.clone(), source, similarity.clone());

    let ranked = svc
        .relevant_tasks_for("vol-1", &CancellationToken::new())
        .await
        .expect("ranking succeeds");

    let ids: Vec<&str> = ranked.iter().map(|entry| entry.task().id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(similarity.calls(), 2);
}

#[rstest]
#[case("")]
#[case("vol 1")]
#[case("vol/1")]
#[tokio::test]
async fn malformed_id_fails_before_any_source_call(#[case] raw: &str) {
    let unavailable = MemorySource::new().unavailable("should not be called");
    let similarity = StubSimilarity::scoring(50);
    let svc = service(unavailable.clone(), unavailable, similarity.clone());

    let err = svc
        .relevant_tasks_for(raw, &CancellationToken::new())
        .await
        .expect_err("malformed id");

    assert!(matches!(err, RelevantTasksError::InvalidRequesterId(_)));
    assert_eq!(similarity.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn overlong_id_is_rejected() {
    let svc = service(MemorySource::new(), MemorySource::new(), StubSimilarity::scoring(1));
    let raw = "v".repeat(65);

    let err = svc
        .relevant_tasks_for(&raw, &CancellationToken::new())
        .await
        .expect_err("id too long");

    assert!(matches!(
        err,
        RelevantTasksError::InvalidRequesterId(RequesterIdError::TooLong { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn unknown_requester_is_reported(source: MemorySource) {
    let svc = service(source.clone(), source, StubSimilarity::scoring(1));

    let err = svc
        .relevant_tasks_for("vol-2", &CancellationToken::new())
        .await
        .expect_err("unknown requester");

    assert_eq!(
        err,
        RelevantTasksError::RequesterNotFound {
            id: RequesterId::new("vol-2").expect("valid id"),
        }
    );
}

#[rstest]
#[tokio::test]
async fn profile_source_failure_is_reported(source: MemorySource) {
    let svc = service(
        MemorySource::new().unavailable("profiles offline"),
        source,
        StubSimilarity::scoring(1),
    );

    let err = svc
        .relevant_tasks_for("vol-1", &CancellationToken::new())
        .await
        .expect_err("profile source down");

    assert!(matches!(
        err,
        RelevantTasksError::ProfileSource(SourceError::Unavailable { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn task_source_failure_is_reported(source: MemorySource) {
    let similarity = StubSimilarity::scoring(1);
    let svc = service(
        source,
        MemorySource::new().unavailable("tasks offline"),
        similarity.clone(),
    );

    let err = svc
        .relevant_tasks_for("vol-1", &CancellationToken::new())
        .await
        .expect_err("task source down");

    assert!(matches!(err, RelevantTasksError::TaskSource(_)));
    assert_eq!(similarity.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn cancelled_token_short_circuits(source: MemorySource) {
    let similarity = StubSimilarity::scoring(1);
    let svc = service(source.clone(), source, similarity.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = svc
        .relevant_tasks_for("vol-1", &cancel)
        .await
        .expect_err("cancelled");

    assert_eq!(err, RelevantTasksError::Cancelled);
    assert_eq!(similarity.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn requester_without_skills_is_still_ranked() {
    let source = MemorySource::new()
        .with_requester(Requester::new(requester_id()))
        .with_tasks([task("a", "Walk dogs")]);
    let svc = service(source.clone(), source, StubSimilarity::scoring(12));

    let ranked = svc
        .relevant_tasks_for("vol-1", &CancellationToken::new())
        .await
        .expect("ranking succeeds");

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked.as_slice().first().map(|e| e.score()), Some(12));
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(8)]
#[tokio::test(start_paused = true)]
async fn oracle_calls_respect_max_in_flight(#[case] limit: usize) {
    let similarity = StubSimilarity::scoring(40).with_delay(Duration::from_secs(5));
    let engine = RankingEngine::new(
        similarity.clone(),
        RankingConfig::default().with_max_in_flight(limit),
    )
    .expect("valid config");
    let tasks: Vec<CandidateTask> = (0..10)
        .map(|n| task(&format!("t{n}"), &format!("Task {n}")))
        .collect();

    let ranked = engine
        .rank(
            &Requester::new(requester_id()),
            tasks,
            &CancellationToken::new(),
        )
        .await
        .expect("ranking succeeds");

    assert_eq!(ranked.len(), 10);
    assert_eq!(similarity.calls(), 10);
    assert_eq!(similarity.peak_in_flight(), limit);
}

#[rstest]
#[tokio::test]
async fn one_failing_task_does_not_abort_the_batch() {
    let similarity = StubSimilarity::scoring(30).with_title_error(
        "Task 1",
        SimilarityError::NoScore {
            response: "unsure".to_owned(),
        },
    );
    let engine = RankingEngine::new(similarity, RankingConfig::default()).expect("valid config");
    let tasks: Vec<CandidateTask> = (0..3)
        .map(|n| task(&format!("t{n}"), &format!("Task {n}")))
        .collect();

    let ranked = engine
        .rank(
            &Requester::new(requester_id()),
            tasks,
            &CancellationToken::new(),
        )
        .await
        .expect("ranking succeeds");

    let summary: Vec<(&str, u8, ScoreSource)> = ranked
        .iter()
        .map(|entry| (entry.task().id.as_str(), entry.score(), entry.source()))
        .collect();
    assert_eq!(
        summary,
        [
            ("t0", 30, ScoreSource::Oracle),
            ("t2", 30, ScoreSource::Oracle),
            ("t1", 0, ScoreSource::OracleUnavailable),
        ]
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn cancellation_mid_batch_returns_no_partial_list() {
    let similarity = StubSimilarity::scoring(40).with_delay(Duration::from_secs(30));
    let engine = RankingEngine::new(similarity, RankingConfig::default()).expect("valid config");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let result = engine
        .rank(
            &Requester::new(requester_id()),
            vec![task("a", "A"), task("b", "B")],
            &cancel,
        )
        .await;

    assert_eq!(result, Err(RankingError::Cancelled));
}

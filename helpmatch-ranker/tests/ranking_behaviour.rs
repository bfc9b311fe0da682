//! Behavioural tests for [`RankingEngine`].
//!
//! The engine is driven through the real [`SimilarityOracleClient`] backed by
//! a [`ScriptedOracle`], so prompt parsing and fallback rules are exercised
//! together.

use std::cell::RefCell;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use helpmatch_core::{
    CandidateTask, OracleError, Priority, RankedList, Requester, RequesterId, ScoreSource,
};
use helpmatch_data::oracle::SimilarityOracleClient;
use helpmatch_data::oracle::test_support::ScriptedOracle;
use helpmatch_ranker::{
    FallbackPolicy, RankingConfig, RankingEngine, RankingError, ScoringStrategy,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio_util::sync::CancellationToken;

/// State shared between steps.
#[derive(Debug)]
struct World {
    requester: Requester,
    tasks: Vec<CandidateTask>,
    oracle: ScriptedOracle,
    config: RankingConfig,
    result: Option<Result<RankedList, RankingError>>,
}

fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn world() -> RefCell<World> {
    RefCell::new(World {
        requester: Requester::new(RequesterId::new("vol-1").expect("valid id")),
        tasks: Vec::new(),
        oracle: ScriptedOracle::answering("I have no idea"),
        config: RankingConfig::default(),
        result: None,
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("runtime should build")
}

fn network_error() -> OracleError {
    OracleError::Network {
        url: "http://oracle.example.com".to_owned(),
        message: "connection refused".to_owned(),
    }
}

// --- Given steps ---

#[given("a requester skilled in cooking")]
fn requester_cooking(#[from(world)] world: &RefCell<World>) {
    let mut state = world.borrow_mut();
    state.requester = state.requester.clone().with_skills(["cooking"]);
}

#[given("open tasks titled Walk dogs, Cook meals and Drive patients")]
fn three_tasks(#[from(world)] world: &RefCell<World>) {
    let now = reference_now();
    world.borrow_mut().tasks = vec![
        CandidateTask::new("walk", "Walk dogs", "Twice a day", now + chrono::Duration::days(10))
            .with_skills(["dog walking"])
            .with_priority(Priority::Low),
        CandidateTask::new("cook", "Cook meals", "For the shelter", now + chrono::Duration::days(2))
            .with_skills(["cooking"])
            .with_priority(Priority::Medium),
        CandidateTask::new(
            "drive",
            "Drive patients",
            "To the clinic",
            now + chrono::Duration::hours(12),
        )
        .with_skills(["driving"])
        .with_priority(Priority::High),
    ];
}

#[given("no open tasks")]
fn no_tasks(#[from(world)] world: &RefCell<World>) {
    world.borrow_mut().tasks.clear();
}

#[given("an oracle that rates Cook meals as \"87 is the match\"")]
fn oracle_rates_cook(#[from(world)] world: &RefCell<World>) {
    let mut state = world.borrow_mut();
    state.oracle = state
        .oracle
        .clone()
        .with_title_answer("Cook meals", "87 is the match");
}

#[given("an oracle that cannot rate Walk dogs")]
fn oracle_cannot_rate_walk(#[from(world)] world: &RefCell<World>) {
    let mut state = world.borrow_mut();
    state.oracle = state
        .oracle
        .clone()
        .with_title_answer("Walk dogs", "I cannot determine a score");
}

#[given("an oracle that rates Drive patients as \"150\"")]
fn oracle_rates_drive(#[from(world)] world: &RefCell<World>) {
    let mut state = world.borrow_mut();
    state.oracle = state.oracle.clone().with_title_answer("Drive patients", "150");
}

#[given("an oracle that is unreachable")]
fn oracle_unreachable(#[from(world)] world: &RefCell<World>) {
    world.borrow_mut().oracle = ScriptedOracle::failing(network_error());
}

#[given("an oracle that takes a minute to answer")]
fn oracle_slow(#[from(world)] world: &RefCell<World>) {
    world.borrow_mut().oracle = ScriptedOracle::answering("50").with_delay(Duration::from_secs(60));
}

#[given("the deterministic fallback is enabled")]
fn deterministic_fallback(#[from(world)] world: &RefCell<World>) {
    let mut state = world.borrow_mut();
    state.config = state.config.with_fallback(FallbackPolicy::Deterministic);
}

#[given("the deterministic strategy is selected")]
fn deterministic_strategy(#[from(world)] world: &RefCell<World>) {
    let mut state = world.borrow_mut();
    state.config = state.config.with_strategy(ScoringStrategy::Deterministic);
}

// --- When steps ---

fn rank(world: &RefCell<World>, cancel_after: Option<Duration>) {
    let mut state = world.borrow_mut();
    let engine = RankingEngine::new(SimilarityOracleClient::new(state.oracle.clone()), state.config)
        .expect("config should be valid");
    let tasks = state.tasks.clone();
    let requester = state.requester.clone();
    let result = runtime().block_on(async {
        let cancel = CancellationToken::new();
        if let Some(delay) = cancel_after {
            let trigger = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                trigger.cancel();
            });
        }
        engine.rank_at(reference_now(), &requester, tasks, &cancel).await
    });
    state.result = Some(result);
}

#[when("the tasks are ranked")]
fn when_ranked(#[from(world)] world: &RefCell<World>) {
    rank(world, None);
}

#[when("the tasks are ranked and the request is cancelled after one second")]
fn when_ranked_and_cancelled(#[from(world)] world: &RefCell<World>) {
    rank(world, Some(Duration::from_secs(1)));
}

// --- Then steps ---

fn ranked(world: &World) -> &RankedList {
    world
        .result
        .as_ref()
        .expect("ranking should have run")
        .as_ref()
        .expect("ranking should succeed")
}

fn expected_list(raw: &str) -> Vec<String> {
    raw.split(", ").map(str::to_owned).collect()
}

#[then("the ranking is {order}")]
fn then_order(order: String, #[from(world)] world: &RefCell<World>) {
    let state = world.borrow();
    let titles: Vec<String> = ranked(&state)
        .iter()
        .map(|entry| entry.task().title.clone())
        .collect();
    assert_eq!(titles, expected_list(&order));
}

#[then("no tasks are ranked")]
fn then_empty(#[from(world)] world: &RefCell<World>) {
    assert!(ranked(&world.borrow()).is_empty());
}

#[then("the request reports cancellation")]
fn then_cancelled(#[from(world)] world: &RefCell<World>) {
    let state = world.borrow();
    assert!(
        matches!(state.result, Some(Err(RankingError::Cancelled))),
        "expected cancellation, got {:?}",
        state.result
    );
}

#[then("the scores are {scores}")]
fn then_scores(scores: String, #[from(world)] world: &RefCell<World>) {
    let state = world.borrow();
    let actual: Vec<String> = ranked(&state)
        .iter()
        .map(|entry| entry.score().to_string())
        .collect();
    assert_eq!(actual, expected_list(&scores));
}

#[then("the sources are {sources}")]
fn then_sources(sources: String, #[from(world)] world: &RefCell<World>) {
    let state = world.borrow();
    let actual: Vec<&str> = ranked(&state)
        .iter()
        .map(|entry| match entry.source() {
            ScoreSource::Oracle => "oracle",
            ScoreSource::OracleUnavailable => "oracle_unavailable",
            ScoreSource::Deterministic => "deterministic",
        })
        .collect();
    assert_eq!(actual, expected_list(&sources));
}

#[then("the oracle was not consulted")]
fn then_oracle_unused(#[from(world)] world: &RefCell<World>) {
    assert!(world.borrow().oracle.prompts().is_empty());
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/ranking.feature", name = $title)]
        fn $fn_name(world: RefCell<World>) {
            let _ = world;
        }
    };
}

register_scenario!(oracle_scores, "ranking tasks by oracle score");
register_scenario!(deterministic_fallback_scores, "falling back to deterministic scores");
register_scenario!(
    deterministic_only,
    "ranking deterministically without the oracle"
);
register_scenario!(oracle_down, "keeping input order when the oracle is down");
register_scenario!(empty_pool, "ranking an empty pool");
register_scenario!(cancelled_ranking, "cancelling a ranking in flight");

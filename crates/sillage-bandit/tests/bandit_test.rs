//! Posterior updates, concurrent feedback, degraded selection, context
//! partitions, realtime notifications, and regret on a simulated workload.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::json;
use sillage_bandit::{
    implicit_reward, ContextualBanditSelector, FeedbackProcessor, InMemoryArmStore,
    MultiArmedBanditStrategy, RegretBoundsCalculator, RoundOutcome, SelectionReason,
    ThompsonSamplingSelector,
};
use sillage_core::config::BanditConfig;
use sillage_core::models::{ActivityEvent, ActivityType, BanditArm, RealtimeMessage};
use test_fixtures::load_fixture;
use test_fixtures::mocks::{BrokenArmStore, RecordingPublisher};

fn seeded(seed: u64) -> BanditConfig {
    BanditConfig {
        seed: Some(seed),
        ..BanditConfig::default()
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Feedback
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn feedback_moves_the_posterior() {
    let store = Arc::new(InMemoryArmStore::new());
    let processor = FeedbackProcessor::new(Arc::clone(&store), &seeded(1));

    processor.process("hybrid", None, 1.0).await.unwrap();
    processor.process("hybrid", None, 0.0).await.unwrap();
    let last = processor.process("hybrid", None, 0.75).await.unwrap();

    let arm = store.get(None, "hybrid").unwrap();
    assert!((arm.alpha - 2.75).abs() < 1e-12);
    assert!((arm.beta - 2.25).abs() < 1e-12);
    assert_eq!(arm.pulls, 3);
    assert_eq!(last.alpha_after, arm.alpha);
    assert!((last.expected_reward() - 2.75 / 5.0).abs() < 1e-12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_feedback_loses_no_updates() {
    let store = Arc::new(InMemoryArmStore::new());
    let processor = Arc::new(FeedbackProcessor::new(Arc::clone(&store), &seeded(2)));

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let processor = Arc::clone(&processor);
            tokio::spawn(async move {
                let reward = if i % 2 == 0 { 1.0 } else { 0.0 };
                processor.process("collaborative", None, reward).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let arm = store.get(None, "collaborative").unwrap();
    assert_eq!(arm.pulls, 100);
    assert!((arm.alpha - 51.0).abs() < 1e-9);
    assert!((arm.beta - 51.0).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn arm_locks_are_released_after_updates() {
    let store = Arc::new(InMemoryArmStore::new());
    let processor = Arc::new(FeedbackProcessor::new(Arc::clone(&store), &seeded(12)));

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let processor = Arc::clone(&processor);
            tokio::spawn(async move {
                let algorithm = format!("algo-{}", i % 40);
                processor.process(&algorithm, None, 1.0).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(processor.in_flight_arms(), 0);
    assert_eq!(store.get(None, "algo-7").unwrap().pulls, 5);
}

#[tokio::test]
async fn feedback_against_a_broken_store_is_an_error() {
    let processor = FeedbackProcessor::new(BrokenArmStore::failing(), &seeded(3));
    assert!(processor.process("hybrid", None, 1.0).await.is_err());
    assert_eq!(processor.in_flight_arms(), 0);
}

#[derive(Debug, Deserialize)]
struct ImplicitCase {
    event: ActivityType,
    reward: Option<f64>,
}

#[test]
fn implicit_rewards_match_golden_table() {
    let cases: Vec<ImplicitCase> = load_fixture("golden/implicit_feedback.json");
    assert!(!cases.is_empty());
    for case in cases {
        let got = implicit_reward(&case.event);
        match (got, case.reward) {
            (Some(g), Some(w)) => assert!((g - w).abs() < 1e-12, "{:?}: {g} != {w}", case.event),
            (g, w) => assert_eq!(g, w, "{:?}", case.event),
        }
    }
}

#[tokio::test]
async fn user_feedback_publishes_recommendation_update() {
    let publisher = Arc::new(RecordingPublisher::new());
    let processor = FeedbackProcessor::new(InMemoryArmStore::new(), &seeded(4))
        .with_publisher(publisher.clone());

    let purchase = ActivityEvent {
        event_type: ActivityType::Purchase,
        user_id: "u-17".to_string(),
        fragrance_id: Some("f-3".to_string()),
        payload: serde_json::Value::Null,
        session_id: "s-1".to_string(),
    };
    let update = processor
        .process_event(&purchase, "content_based", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.reward, 1.0);

    let search = ActivityEvent {
        event_type: ActivityType::Search,
        ..purchase.clone()
    };
    assert!(processor
        .process_event(&search, "content_based", None)
        .await
        .unwrap()
        .is_none());

    let messages = publisher.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0],
        (
            "u-17".to_string(),
            RealtimeMessage::RecommendationUpdate {
                user_id: "u-17".to_string(),
                algorithm: "content_based".to_string(),
                expected_reward: 2.0 / 3.0,
            }
        )
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Selection
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn strong_arm_dominates_selection() {
    let store = InMemoryArmStore::with_arms([
        BanditArm::with_params("content_based", 2.0, 30.0, None),
        BanditArm::with_params("collaborative", 40.0, 2.0, None),
        BanditArm::with_params("hybrid", 3.0, 25.0, None),
    ]);
    let selector = ThompsonSamplingSelector::new(store, &seeded(5));

    let mut wins = 0;
    for _ in 0..200 {
        let selection = selector.select(&[], None).await;
        assert_eq!(selection.reason, SelectionReason::ThompsonSample);
        if selection.algorithm == "collaborative" {
            wins += 1;
            assert!(!selection.is_exploration);
        }
    }
    assert!(wins > 190, "collaborative won {wins}/200");
}

#[tokio::test]
async fn failing_store_selects_the_fallback() {
    let config = seeded(6);
    let selector = ThompsonSamplingSelector::new(BrokenArmStore::failing(), &config);
    let selection = selector.select(&names(&["a", "b"]), None).await;
    assert!(selection.is_fallback);
    assert_eq!(selection.reason, SelectionReason::Fallback);
    assert_eq!(selection.algorithm, config.fallback_algorithm);
    let degradations = selector.drain_degradations();
    assert_eq!(degradations.len(), 1);
    assert!(degradations[0].failure.contains("arm store offline"));
}

#[tokio::test]
async fn hanging_store_times_out_to_the_fallback() {
    let config = BanditConfig {
        arm_store_timeout_ms: 20,
        ..seeded(7)
    };
    let selector =
        ThompsonSamplingSelector::new(BrokenArmStore::hanging(Duration::from_secs(5)), &config);
    let started = std::time::Instant::now();
    let selection = selector.select(&[], None).await;
    assert!(selection.is_fallback);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn contexts_are_independent_partitions() {
    let store = Arc::new(InMemoryArmStore::new());
    let config = seeded(8);
    let processor = FeedbackProcessor::new(Arc::clone(&store), &config);
    let selector =
        ContextualBanditSelector::new(ThompsonSamplingSelector::new(Arc::clone(&store), &config));

    let winter = json!({"season": "winter", "occasion": "evening"});
    let winter_reordered = json!({"occasion": "evening", "season": "winter"});
    let summer = json!({"season": "summer", "occasion": "evening"});
    let (winter, winter_reordered, summer) = (
        winter.as_object().unwrap().clone(),
        winter_reordered.as_object().unwrap().clone(),
        summer.as_object().unwrap().clone(),
    );

    let winter_key = ContextualBanditSelector::<Arc<InMemoryArmStore>>::context_key(&winter);
    assert_eq!(
        winter_key,
        ContextualBanditSelector::<Arc<InMemoryArmStore>>::context_key(&winter_reordered)
    );
    for _ in 0..30 {
        processor.process("hybrid", Some(&winter_key), 1.0).await.unwrap();
        processor.process("collaborative", Some(&winter_key), 0.0).await.unwrap();
    }

    let candidates = names(&["collaborative", "hybrid"]);
    let in_winter = selector.select(&candidates, &winter_reordered).await;
    assert_eq!(in_winter.context_key, winter_key);
    assert_eq!(in_winter.selection.reason, SelectionReason::ThompsonSample);
    assert_eq!(in_winter.selection.algorithm, "hybrid");

    let in_summer = selector.select(&candidates, &summer).await;
    assert_ne!(in_summer.context_key, winter_key);
    assert_eq!(in_summer.selection.reason, SelectionReason::ColdStart);
    assert!(store.get(None, "hybrid").is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// Exploration and regret
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn epsilon_greedy_explores_less_over_time() {
    let strategy = MultiArmedBanditStrategy::new(0.95, 0.05, Some(9));
    let arms = vec![
        BanditArm::with_params("a", 1.0, 4.0, None),
        BanditArm::with_params("b", 4.0, 1.0, None),
    ];
    let decisions: Vec<_> = (0..400).map(|_| strategy.select(&arms).unwrap()).collect();
    let explored = |range: std::ops::Range<usize>| {
        decisions[range].iter().filter(|d| d.explored).count()
    };
    assert!(explored(0..20) > explored(300..320));
    assert_eq!(decisions.last().unwrap().exploration_rate, 0.05);
}

#[tokio::test]
async fn thompson_regret_stays_within_the_bound() {
    let truth = [("low", 0.3), ("mid", 0.5), ("high", 0.7)];
    let config = BanditConfig {
        algorithms: truth.iter().map(|(name, _)| name.to_string()).collect(),
        ..seeded(10)
    };
    let store = Arc::new(InMemoryArmStore::new());
    let selector = ThompsonSamplingSelector::new(Arc::clone(&store), &config);
    let processor = FeedbackProcessor::new(Arc::clone(&store), &config);
    let mut env = StdRng::seed_from_u64(11);

    let mut rounds = Vec::with_capacity(500);
    for _ in 0..500 {
        let selection = selector.select(&[], None).await;
        let p = truth
            .iter()
            .find(|(name, _)| *name == selection.algorithm)
            .map(|(_, p)| *p)
            .unwrap();
        let reward = if env.gen::<f64>() < p { 1.0 } else { 0.0 };
        processor.process(&selection.algorithm, None, reward).await.unwrap();
        rounds.push(RoundOutcome {
            chosen_mean: p,
            optimal_mean: 0.7,
        });
    }

    let report = RegretBoundsCalculator::evaluate(truth.len(), &rounds);
    assert_eq!(report.rounds, 500);
    assert!(report.within_bound, "{report:?}");
    assert!(store.get(None, "high").unwrap().pulls > store.get(None, "low").unwrap().pulls);
}

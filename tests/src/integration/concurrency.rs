//! # Concurrency
//!
//! Multi-threaded properties of the gate and the reconciled insert:
//!
//! - Concurrent inserts of distinct keys all succeed, each counted once
//! - Concurrent inserts of one key commit exactly one record
//! - Keys committed while a rebuild runs are present in the rebuilt filter
//! - Readers never see a preloaded key go missing across rebuilds

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use futures::future::join_all;
    use membership_gate::{
        GateConfig, InMemoryUserStore, NewUser, NormalizedKey, RegistrationService,
    };

    async fn empty_service(config: GateConfig) -> Arc<RegistrationService<InMemoryUserStore>> {
        let store = Arc::new(InMemoryUserStore::new());
        Arc::new(
            RegistrationService::initialize(store, config)
                .await
                .expect("gate builds from empty store"),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_keys_insert_exactly_once() {
        let service = empty_service(GateConfig::default()).await;

        let tasks = (0..16).map(|worker| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                for i in 0..50 {
                    let result = service
                        .try_insert(&format!("w{worker}-u{i}@example.com"), NewUser::new("U"))
                        .await
                        .expect("store is healthy");
                    assert!(result.outcome.is_success());
                }
            })
        });
        for joined in join_all(tasks).await {
            joined.expect("worker panicked");
        }

        assert_eq!(service.store().len(), 800);
        assert_eq!(service.current_filter_stats().current_items, 800);
        assert_eq!(service.metrics().store_errors, 0);
        for worker in 0..16 {
            for i in 0..50 {
                assert!(
                    service
                        .check_membership(&format!("w{worker}-u{i}@example.com"))
                        .maybe_present
                );
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_key_race_commits_one_record() {
        let service = empty_service(GateConfig::default()).await;

        let tasks = (0..32).map(|i| {
            let service = Arc::clone(&service);
            // Mixed case: every variant normalizes to the same key
            let raw = if i % 2 == 0 {
                "contested@example.com".to_string()
            } else {
                " Contested@Example.COM ".to_string()
            };
            tokio::spawn(async move { service.try_insert(&raw, NewUser::new(format!("#{i}"))).await })
        });

        let outcomes: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.expect("task panicked").expect("store is healthy").outcome)
            .collect();

        let successes = outcomes.iter().filter(|o| o.is_success()).count();
        let conflicts = outcomes.iter().filter(|o| o.is_conflict()).count();
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 31);

        let key = NormalizedKey::new("contested@example.com");
        assert_eq!(service.store().records_for(&key), 1);
        assert_eq!(service.current_filter_stats().current_items, 1);
        assert!(service.gate().probably_contains(&key));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_inserts_during_rebuilds_are_never_lost() {
        let service = empty_service(GateConfig::default()).await;

        let inserters: Vec<_> = (0..4)
            .map(|worker| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    let mut committed = Vec::new();
                    for i in 0..300 {
                        let raw = format!("r{worker}-{i}@example.com");
                        let result = service
                            .try_insert(&raw, NewUser::new("U"))
                            .await
                            .expect("store is healthy");
                        assert!(result.outcome.is_success());
                        committed.push(result.key);
                        tokio::task::yield_now().await;
                    }
                    committed
                })
            })
            .collect();

        let rebuilder = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                for _ in 0..25 {
                    service.rebuild_from_store().await.expect("rebuild succeeds");
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut all_keys = Vec::new();
        for joined in join_all(inserters).await {
            all_keys.extend(joined.expect("inserter panicked"));
        }
        rebuilder.await.expect("rebuilder panicked");

        for key in &all_keys {
            assert!(service.gate().probably_contains(key), "lost {key}");
        }

        let stats = service.current_filter_stats();
        assert_eq!(stats.generation, 26);
        // Journaled keys may also be enumerated, so the counter only bounds
        assert!(stats.current_items >= 1200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_see_preloaded_keys_throughout_rebuilds() {
        let store = Arc::new(InMemoryUserStore::new());
        store.seed_if_empty();
        let service = Arc::new(
            RegistrationService::initialize(store, GateConfig::default())
                .await
                .unwrap(),
        );
        let anchor = NormalizedKey::new("ada@example.com");
        let stop = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let service = Arc::clone(&service);
                let stop = Arc::clone(&stop);
                let anchor = anchor.clone();
                tokio::spawn(async move {
                    while !stop.load(Ordering::Relaxed) {
                        assert!(service.gate().probably_contains(&anchor));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for i in 0..20 {
            service
                .try_insert(&format!("bulk{i}@example.com"), NewUser::new("B"))
                .await
                .unwrap();
            service.rebuild_from_store().await.unwrap();
        }

        stop.store(true, Ordering::Relaxed);
        for joined in join_all(readers).await {
            joined.expect("reader panicked");
        }
        assert_eq!(service.current_filter_stats().generation, 21);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_rebuild_requests_are_serialized() {
        let service = empty_service(GateConfig::default()).await;

        let rebuilds = (0..8).map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.rebuild_from_store().await })
        });
        for joined in join_all(rebuilds).await {
            joined.expect("task panicked").expect("rebuild succeeds");
        }

        assert_eq!(service.current_filter_stats().generation, 9);
        assert_eq!(service.metrics().rebuilds, 9);
    }
}

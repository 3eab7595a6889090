//! # Registration Flows
//!
//! End-to-end flows over the in-memory user store:
//!
//! 1. **Startup**: seeded users are loaded into the gate
//! 2. **Fast path**: unseen keys insert without a lookup
//! 3. **Conflicts**: seeded and previously inserted keys are rejected,
//!    including case and whitespace variants
//! 4. **Runtime wiring**: configuration from variables, stats as JSON

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use gate_runtime::{GateRuntime, RuntimeConfig};
    use membership_gate::{
        ConflictSource, GateConfig, InMemoryUserStore, InsertOutcome, NewUser, NormalizedKey,
        RegistrationApi, RegistrationService, UniqueKeyStore, UserRecord, SAMPLE_USERS,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn seeded_service() -> RegistrationService<InMemoryUserStore> {
        let store = Arc::new(InMemoryUserStore::new());
        store.seed_if_empty();
        RegistrationService::initialize(store, GateConfig::default())
            .await
            .expect("gate builds from seeded store")
    }

    // =============================================================================
    // STARTUP
    // =============================================================================

    #[tokio::test]
    async fn test_seeded_users_are_maybe_present() {
        let service = seeded_service().await;

        for (_, email) in SAMPLE_USERS {
            assert!(service.check_membership(email).maybe_present, "{email}");
        }

        let stats = service.current_filter_stats();
        assert_eq!(stats.current_items, SAMPLE_USERS.len() as u64);
        assert_eq!(stats.expected_capacity, 1000);
        assert_eq!(stats.bits, 9600);
        assert_eq!(stats.hash_count, 7);
    }

    #[tokio::test]
    async fn test_seeded_user_registration_is_a_confirmed_conflict() {
        let service = seeded_service().await;

        let result = service
            .try_insert("  GRACE@example.com", NewUser::new("Grace Again"))
            .await
            .unwrap();

        assert_eq!(
            result.outcome,
            InsertOutcome::Conflict {
                detected_by: ConflictSource::Lookup
            }
        );
        assert_eq!(result.key.as_str(), "grace@example.com");
        assert_eq!(service.store().len(), SAMPLE_USERS.len());
    }

    // =============================================================================
    // INSERT FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_new_user_then_duplicate() {
        let service = seeded_service().await;

        let first = service
            .try_insert("new@x.com", NewUser::new("New User"))
            .await
            .unwrap();
        assert!(first.outcome.is_success());
        let record = first.record.expect("record on success");
        assert_eq!(record.email, "new@x.com");
        assert_eq!(record.id, SAMPLE_USERS.len() as u64 + 1);

        assert!(service.check_membership("NEW@X.COM").maybe_present);

        let again = service
            .try_insert("new@x.com", NewUser::new("Other"))
            .await
            .unwrap();
        assert!(again.outcome.is_conflict());
        assert_eq!(
            service.store().records_for(&NormalizedKey::new("new@x.com")),
            1
        );
    }

    #[tokio::test]
    async fn test_many_new_users_commit_exactly_once() {
        let service = seeded_service().await;

        for i in 0..200 {
            let result = service
                .try_insert(&format!("member{i}@example.org"), NewUser::new("M"))
                .await
                .unwrap();
            assert!(result.outcome.is_success(), "member{i}");
        }

        let snapshot = service.metrics();
        assert_eq!(
            snapshot.fast_path_inserts + snapshot.false_positive_inserts,
            200
        );
        assert_eq!(service.store().len(), SAMPLE_USERS.len() + 200);
        assert_eq!(
            service.current_filter_stats().current_items,
            (SAMPLE_USERS.len() + 200) as u64
        );
    }

    #[tokio::test]
    async fn test_api_trait_object_drives_the_flow() {
        let service = seeded_service().await;
        let api: Arc<dyn RegistrationApi<Payload = NewUser, Record = UserRecord>> = Arc::new(service);

        let result = api
            .try_insert("trait@example.com", NewUser::new("Trait"))
            .await
            .unwrap();
        assert!(result.outcome.is_success());

        let stats = api.rebuild().await.unwrap();
        assert_eq!(stats.generation, 2);
        assert_eq!(stats.current_items, SAMPLE_USERS.len() as u64 + 1);
        assert!(api.check_membership("trait@example.com").maybe_present);
    }

    // =============================================================================
    // RUNTIME WIRING
    // =============================================================================

    #[tokio::test]
    async fn test_runtime_from_variables() {
        let vars: HashMap<&str, &str> = [
            ("GATE_TARGET_FPP", "0.001"),
            ("GATE_MIN_CAPACITY", "2000"),
            ("GATE_REBUILD_INTERVAL_SECS", "0"),
        ]
        .into_iter()
        .collect();
        let config =
            RuntimeConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        let store = Arc::new(InMemoryUserStore::new());
        store.seed_if_empty();
        let mut runtime = GateRuntime::initialize(store, config).await.unwrap();
        runtime.start();

        let stats = runtime.service().current_filter_stats();
        assert_eq!(stats.expected_capacity, 2000);
        assert_eq!(stats.target_false_positive_probability, 0.001);
        assert_eq!(stats.bits % 32, 0);

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_stats_serialize_for_observability() {
        let service = seeded_service().await;
        let json = serde_json::to_value(service.current_filter_stats()).unwrap();

        assert_eq!(json["expectedCapacity"], 1000);
        assert_eq!(json["targetFalsePositiveProbability"], 0.01);
        assert_eq!(json["bits"], 9600);
        assert_eq!(json["hashCount"], 7);
        assert_eq!(json["currentItems"], 6);

        let outcome = serde_json::to_value(InsertOutcome::Conflict {
            detected_by: ConflictSource::FastPathRace,
        })
        .unwrap();
        assert_eq!(outcome["via"], "conflict");
        assert_eq!(outcome["detected_by"], "fast-path-race");
    }

    #[tokio::test]
    async fn test_bypassed_write_is_caught_by_the_store() {
        let service = seeded_service().await;
        let key = NormalizedKey::new("backdoor@example.com");
        service
            .store()
            .insert_unique(&key, NewUser::new("Backdoor"))
            .await
            .unwrap();

        let result = service
            .try_insert("backdoor@example.com", NewUser::new("Front Door"))
            .await
            .unwrap();

        assert!(result.outcome.is_conflict());
        assert_eq!(service.store().records_for(&key), 1);
    }
}

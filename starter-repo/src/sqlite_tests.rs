//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use starter_types::{
        Currency, DomainError, Money, NewOrder, NewUser, OrderRepository, OrderStatus,
        OrderTransition, OrderUpdate, RepoError, UserChanges, UserId, UserRepository,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn new_user(provider_id: &str) -> NewUser {
        NewUser {
            provider_id: provider_id.to_string(),
            email: format!("{}@example.com", provider_id),
            name: Some("Ada Lovelace".to_string()),
        }
    }

    async fn setup_order(repo: &SqliteRepo, gateway_order_id: &str) -> UserId {
        let user = repo.upsert_user(new_user("user_orders")).await.unwrap();
        repo.create_order(NewOrder {
            user_id: user.id,
            gateway_order_id: gateway_order_id.to_string(),
            amount: Money::new(10000, Currency::INR).unwrap(),
        })
        .await
        .unwrap();
        user.id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_upsert_and_get_user() {
        let repo = setup_repo().await;

        let created = repo.upsert_user(new_user("user_1")).await.unwrap();
        let fetched = repo
            .get_user_by_provider_id("user_1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.email, "user_1@example.com");
        assert_eq!(fetched.name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let repo = setup_repo().await;

        let result = repo.get_user_by_provider_id("missing").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_first_writer_wins() {
        let repo = setup_repo().await;

        let first = repo.upsert_user(new_user("user_1")).await.unwrap();
        let second = repo
            .upsert_user(NewUser {
                provider_id: "user_1".to_string(),
                email: "other@example.com".to_string(),
                name: None,
            })
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.email, "user_1@example.com");
    }

    #[tokio::test]
    async fn test_concurrent_upserts_yield_one_row() {
        let repo = std::sync::Arc::new(setup_repo().await);

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.upsert_user(new_user("user_race")).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }

        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let repo = setup_repo().await;
        repo.upsert_user(new_user("user_1")).await.unwrap();

        let updated = repo
            .update_user(
                "user_1",
                UserChanges {
                    name: Some("Ada King".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Ada King"));
        assert_eq!(updated.email, "user_1@example.com");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let repo = setup_repo().await;

        let result = repo
            .update_user("ghost", UserChanges::default())
            .await
            .unwrap();

        assert!(result.is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_and_get_order() {
        let repo = setup_repo().await;
        let user_id = setup_order(&repo, "order_1").await;

        let order = repo
            .get_order_by_gateway_id("order_1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(order.user_id, user_id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.amount.amount(), 10000);
        assert_eq!(order.amount.currency(), Currency::INR);
        assert!(order.gateway_payment_id.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_gateway_order_conflicts() {
        let repo = setup_repo().await;
        let user_id = setup_order(&repo, "order_1").await;

        let result = repo
            .create_order(NewOrder {
                user_id,
                gateway_order_id: "order_1".to_string(),
                amount: Money::new(500, Currency::INR).unwrap(),
            })
            .await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_transition_pending_to_completed() {
        let repo = setup_repo().await;
        setup_order(&repo, "order_1").await;

        let transition = repo
            .transition_order(
                "order_1",
                OrderUpdate::completed("pay_1", Some("sig_1".to_string())),
            )
            .await
            .unwrap();

        let OrderTransition::Applied(order) = transition else {
            panic!("expected applied transition");
        };
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_1"));
        assert_eq!(order.gateway_signature.as_deref(), Some("sig_1"));
    }

    #[tokio::test]
    async fn test_second_transition_is_noop() {
        let repo = setup_repo().await;
        setup_order(&repo, "order_1").await;

        repo.transition_order("order_1", OrderUpdate::completed("pay_1", None))
            .await
            .unwrap();
        let again = repo
            .transition_order("order_1", OrderUpdate::failed("pay_2"))
            .await
            .unwrap();

        let OrderTransition::AlreadySettled(order) = again else {
            panic!("expected already settled");
        };
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.gateway_payment_id.as_deref(), Some("pay_1"));
    }

    #[tokio::test]
    async fn test_transition_unknown_order() {
        let repo = setup_repo().await;

        let result = repo
            .transition_order("order_missing", OrderUpdate::failed("pay_2"))
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_transition_back_to_pending_rejected() {
        let repo = setup_repo().await;
        setup_order(&repo, "order_1").await;

        let result = repo
            .transition_order(
                "order_1",
                OrderUpdate {
                    status: OrderStatus::Pending,
                    payment_id: None,
                    signature: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::InvalidTransition { .. }))
        ));
    }
}

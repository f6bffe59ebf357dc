//! Application Service
//!
//! Orchestrates identity sync, order lifecycle and webhook handling through
//! the repository, payment gateway and identity provider ports.
//! Contains NO infrastructure logic - pure business orchestration.

use std::sync::Arc;

use tracing::{error, info, warn};

use starter_types::{
    AppError, CreateGatewayOrder, CreateOrderRequest, CreateOrderResponse, DomainError,
    ExampleFormRequest, ExampleFormResponse, GatewayError, IdentityError, IdentityEvent,
    IdentityProvider, IdentityWebhook, MessageResponse, Money, NewOrder, OrderStatus,
    OrderTransition, OrderUpdate, PaymentEvent, PaymentGateway, RepoError, Repository, Session,
    SuccessResponse, UpdateUserRequest, User, ValidationErrors, VerifyPaymentRequest,
};

/// Application service for the starter backend.
///
/// Generic over `R: Repository` - the storage adapter is injected at compile
/// time; the gateway and identity adapters are trait objects so tests can
/// swap them freely.
pub struct AppService<R: Repository> {
    repo: R,
    gateway: Arc<dyn PaymentGateway>,
    identity: Arc<dyn IdentityProvider>,
}

impl<R: Repository> AppService<R> {
    pub fn new(
        repo: R,
        gateway: Arc<dyn PaymentGateway>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            repo,
            gateway,
            identity,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────────────

    /// Verifies a bearer session token.
    pub async fn authenticate(&self, token: &str) -> Result<Session, AppError> {
        self.identity.verify_session(token).await.map_err(|e| {
            if !matches!(e, IdentityError::InvalidToken(_)) {
                warn!(error = %e, "Session verification failed");
            }
            AppError::Unauthorized("Unauthorized".into())
        })
    }

    /// Returns the caller's local user, creating it from the provider profile
    /// on first sight.
    pub async fn current_user(&self, session: &Session) -> Result<User, AppError> {
        if let Some(user) = self
            .repo
            .get_user_by_provider_id(&session.provider_id)
            .await?
        {
            return Ok(user);
        }

        let profile = self
            .identity
            .fetch_user(&session.provider_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let email = profile.best_email().unwrap_or_default().to_string();
        let user = self.repo.upsert_user(profile.to_new_user(email)).await?;

        info!(
            provider_id = %user.provider_id,
            user_id = %user.id,
            "Created local user on first request"
        );
        Ok(user)
    }

    /// Applies a profile update to the caller's user.
    pub async fn update_user(
        &self,
        session: &Session,
        req: UpdateUserRequest,
    ) -> Result<User, AppError> {
        self.repo
            .update_user(&session.provider_id, req.into())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a gateway order and records it as pending.
    pub async fn create_order(
        &self,
        session: &Session,
        req: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, AppError> {
        let currency = req.currency.unwrap_or_default();
        let amount = req
            .amount
            .ok_or(DomainError::InvalidAmount)
            .and_then(|major| Money::from_major(major, currency))
            .map_err(|_| {
                let mut errors = ValidationErrors::new();
                errors.push("amount", "Invalid amount");
                AppError::Validation(errors)
            })?;

        let user = self.current_user(session).await?;

        let receipt = format!("order_{}", chrono::Utc::now().timestamp_millis());
        let gateway_order = self
            .gateway
            .create_order(CreateGatewayOrder {
                amount: amount.amount(),
                currency,
                receipt,
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Gateway order creation failed");
                AppError::Upstream("Failed to create order".into())
            })?;

        let order = self
            .repo
            .create_order(NewOrder {
                user_id: user.id,
                gateway_order_id: gateway_order.id.clone(),
                amount,
            })
            .await?;

        info!(
            gateway_order_id = %order.gateway_order_id,
            amount = order.amount.amount(),
            "Order created"
        );

        Ok(CreateOrderResponse {
            order_id: gateway_order.id,
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            key_id: self.gateway.key_id().to_string(),
        })
    }

    /// Verifies a checkout callback and settles the order as completed.
    pub async fn verify_payment(
        &self,
        session: &Session,
        req: VerifyPaymentRequest,
    ) -> Result<SuccessResponse, AppError> {
        if !self.gateway.verify_payment_signature(
            &req.razorpay_order_id,
            &req.razorpay_payment_id,
            &req.razorpay_signature,
        ) {
            warn!(gateway_order_id = %req.razorpay_order_id, "Payment signature mismatch");
            return Err(AppError::BadRequest("Invalid signature".into()));
        }

        let order = self
            .repo
            .get_order_by_gateway_id(&req.razorpay_order_id)
            .await?
            .ok_or_else(order_not_found)?;
        let owner = self
            .repo
            .get_user_by_provider_id(&session.provider_id)
            .await?;
        if owner.map(|u| u.id) != Some(order.user_id) {
            return Err(order_not_found());
        }

        let update = OrderUpdate::completed(req.razorpay_payment_id, Some(req.razorpay_signature));
        match self
            .repo
            .transition_order(&req.razorpay_order_id, update)
            .await
            .map_err(map_order_error)?
        {
            OrderTransition::Applied(order) => {
                info!(gateway_order_id = %order.gateway_order_id, "Payment verified");
                Ok(SuccessResponse::ok())
            }
            OrderTransition::AlreadySettled(order) if order.status == OrderStatus::Completed => {
                info!(gateway_order_id = %order.gateway_order_id, "Payment already completed");
                Ok(SuccessResponse::ok())
            }
            OrderTransition::AlreadySettled(_) => Err(AppError::BadRequest(
                "Order already settled as failed".into(),
            )),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Webhooks
    // ─────────────────────────────────────────────────────────────────────────────

    /// Reconciles an order from a payment gateway webhook delivery.
    ///
    /// Redeliveries are no-ops once the order has settled.
    pub async fn handle_payment_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<SuccessResponse, AppError> {
        let signature = signature
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing signature".into()))?;

        let event = self
            .gateway
            .parse_webhook(body, signature)
            .map_err(|e| match e {
                GatewayError::InvalidSignature => {
                    warn!("Payment webhook signature mismatch");
                    AppError::BadRequest("Invalid signature".into())
                }
                GatewayError::InvalidPayload(msg) => {
                    AppError::BadRequest(format!("Invalid payload: {}", msg))
                }
                other => AppError::Internal(other.to_string()),
            })?;

        let (gateway_order_id, update) = match &event {
            PaymentEvent::Captured {
                gateway_order_id,
                payment_id,
            } => (
                gateway_order_id,
                OrderUpdate::completed(payment_id.clone(), None),
            ),
            PaymentEvent::Failed {
                gateway_order_id,
                payment_id,
            } => (
                gateway_order_id,
                OrderUpdate::failed(payment_id.clone()),
            ),
            PaymentEvent::Other(name) => {
                info!(event = %name, "Unhandled payment webhook event");
                return Ok(SuccessResponse::ok());
            }
        };

        match self
            .repo
            .transition_order(gateway_order_id, update)
            .await
            .map_err(map_order_error)?
        {
            OrderTransition::Applied(order) => {
                info!(
                    event = event.name(),
                    gateway_order_id = %order.gateway_order_id,
                    status = %order.status,
                    "Order settled from webhook"
                );
            }
            OrderTransition::AlreadySettled(order) => {
                info!(
                    event = event.name(),
                    gateway_order_id = %order.gateway_order_id,
                    status = %order.status,
                    "Order already settled, webhook ignored"
                );
            }
        }

        Ok(SuccessResponse::ok())
    }

    /// Applies an identity provider webhook delivery.
    pub async fn handle_identity_webhook(
        &self,
        headers: &IdentityWebhook,
        body: &[u8],
    ) -> Result<MessageResponse, AppError> {
        let event = self.identity.parse_webhook(headers, body).map_err(|e| {
            if matches!(e, IdentityError::InvalidSignature) {
                warn!(message_id = %headers.message_id, "Identity webhook signature mismatch");
            }
            AppError::from(e)
        })?;

        match event {
            IdentityEvent::UserCreated(profile) => {
                let email = profile
                    .primary_email
                    .clone()
                    .ok_or_else(|| AppError::BadRequest("No primary email found".into()))?;
                let user = self.repo.upsert_user(profile.to_new_user(email)).await?;
                info!(provider_id = %user.provider_id, "User created from webhook");
                Ok(MessageResponse::new("User created successfully"))
            }
            IdentityEvent::UserUpdated { id } => {
                info!(provider_id = %id, "User updated at identity provider");
                Ok(MessageResponse::new("User update noted"))
            }
            IdentityEvent::UserDeleted { id } => {
                info!(provider_id = %id, "User deleted at identity provider");
                Ok(MessageResponse::new("User deletion noted"))
            }
            IdentityEvent::Other(kind) => {
                info!(event = %kind, "Unhandled identity webhook event");
                Ok(MessageResponse::new("Webhook received"))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Forms
    // ─────────────────────────────────────────────────────────────────────────────

    /// Accepts a validated example form and echoes it back.
    pub fn submit_example_form(
        &self,
        session: &Session,
        form: ExampleFormRequest,
    ) -> ExampleFormResponse {
        info!(
            provider_id = %session.provider_id,
            category = %form.category,
            "Example form submitted"
        );
        ExampleFormResponse {
            success: true,
            data: form,
        }
    }
}

fn order_not_found() -> AppError {
    AppError::NotFound("Order not found".into())
}

fn map_order_error(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound => order_not_found(),
        other => other.into(),
    }
}

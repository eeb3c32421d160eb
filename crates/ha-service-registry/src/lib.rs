//! Outbound transport for synthesized service calls
//!
//! Commands hand their fully built [`ServiceCallMessage`] to a [`Transport`],
//! which reports what it actually sent. The [`ServiceRegistry`] is the
//! in-process transport: services are registered as async handlers keyed by
//! `domain.service`, and a call counts as sent when its handler succeeds.
//! Unknown services and failing handlers report nothing sent.

use async_trait::async_trait;
use dashmap::DashMap;
use ha_core::{SentMessage, ServiceCallMessage};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Result type for service calls
pub type ServiceResult = Result<(), ServiceError>;

/// Future type for async service handlers
pub type ServiceFuture = Pin<Box<dyn Future<Output = ServiceResult> + Send>>;

/// Service handler function type
pub type ServiceHandler = Arc<dyn Fn(ServiceCallMessage) -> ServiceFuture + Send + Sync>;

/// Errors that can occur when working with services
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service not found: {domain}.{service}")]
    NotFound { domain: String, service: String },

    #[error("service call failed: {0}")]
    CallFailed(String),

    #[error("invalid service data: {0}")]
    InvalidData(String),
}

/// Sends outbound service calls to the hub
///
/// Returns the records of what was sent: one record on success, none on
/// failure. Implementations own timeouts and never panic on transport errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, message: ServiceCallMessage) -> Vec<SentMessage>;
}

/// Information about a registered service
#[derive(Debug, Clone, Default)]
pub struct ServiceDescription {
    /// Domain the service belongs to
    pub domain: String,
    /// Service name
    pub service: String,
    /// `service_data` keys a call must carry
    pub required_fields: Vec<String>,
}

impl ServiceDescription {
    pub fn new(domain: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            ..Default::default()
        }
    }

    pub fn with_required(mut self, field: impl Into<String>) -> Self {
        self.required_fields.push(field.into());
        self
    }

    fn validate(&self, message: &ServiceCallMessage) -> ServiceResult {
        match self
            .required_fields
            .iter()
            .find(|field| !message.service_data.contains_key(field.as_str()))
        {
            Some(missing) => Err(ServiceError::InvalidData(format!(
                "{}.{} requires {}",
                self.domain, self.service, missing
            ))),
            None => Ok(()),
        }
    }
}

/// Internal representation of a registered service
struct RegisteredService {
    handler: ServiceHandler,
    description: ServiceDescription,
}

/// In-process service registry
///
/// Routes each call to the handler registered for its `domain.service` and
/// acts as the bridge's [`Transport`].
pub struct ServiceRegistry {
    /// Services indexed by "domain.service" key
    services: DashMap<String, RegisteredService>,
}

impl ServiceRegistry {
    /// Create a new empty service registry
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Register a service handler
    #[instrument(skip(self, domain, service, handler))]
    pub fn register<F, Fut>(&self, domain: impl Into<String>, service: impl Into<String>, handler: F)
    where
        F: Fn(ServiceCallMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult> + Send + 'static,
    {
        self.register_with_description(ServiceDescription::new(domain, service), handler);
    }

    /// Register a service with full description
    #[instrument(skip(self, handler))]
    pub fn register_with_description<F, Fut>(&self, description: ServiceDescription, handler: F)
    where
        F: Fn(ServiceCallMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult> + Send + 'static,
    {
        let key = format!("{}.{}", description.domain, description.service);

        debug!(
            domain = %description.domain,
            service = %description.service,
            "Registering service"
        );

        let handler: ServiceHandler =
            Arc::new(move |call| Box::pin(handler(call)) as ServiceFuture);

        self.services.insert(
            key,
            RegisteredService {
                handler,
                description,
            },
        );
    }

    /// Call a service
    #[instrument(skip(self, message), fields(service = %message.service_id()))]
    pub async fn call(&self, message: ServiceCallMessage) -> ServiceResult {
        let key = message.service_id();

        let registered = self.services.get(&key).ok_or_else(|| {
            warn!(domain = %message.domain, service = %message.service, "Service not found");
            ServiceError::NotFound {
                domain: message.domain.clone(),
                service: message.service.clone(),
            }
        })?;

        registered.description.validate(&message)?;

        debug!(entity_id = ?message.entity_id(), "Calling service");

        let handler = registered.handler.clone();
        drop(registered); // Release the lock before calling the handler

        handler(message).await
    }

    /// Check if a service exists
    pub fn has_service(&self, domain: &str, service: &str) -> bool {
        let key = format!("{}.{}", domain, service);
        self.services.contains_key(&key)
    }

    /// Get service description
    pub fn get_service(&self, domain: &str, service: &str) -> Option<ServiceDescription> {
        let key = format!("{}.{}", domain, service);
        self.services.get(&key).map(|s| s.description.clone())
    }

    /// Get all services for a domain
    pub fn domain_services(&self, domain: &str) -> Vec<ServiceDescription> {
        self.services
            .iter()
            .filter(|s| s.description.domain == domain)
            .map(|s| s.description.clone())
            .collect()
    }

    /// Get all domains that have registered services
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<_> = self
            .services
            .iter()
            .map(|s| s.description.domain.clone())
            .collect();
        domains.sort();
        domains.dedup();
        domains
    }

    /// Unregister a service
    #[instrument(skip(self))]
    pub fn unregister(&self, domain: &str, service: &str) -> bool {
        let key = format!("{}.{}", domain, service);
        let removed = self.services.remove(&key).is_some();

        if removed {
            debug!(domain = %domain, service = %service, "Unregistered service");
        }

        removed
    }

    /// Get total number of registered services
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ServiceRegistry {
    async fn execute(&self, message: ServiceCallMessage) -> Vec<SentMessage> {
        let service_id = message.service_id();
        match self.call(message.clone()).await {
            Ok(()) => {
                info!(service = %service_id, entity_id = ?message.entity_id(), "Sent service call");
                vec![SentMessage::new(message)]
            }
            Err(e) => {
                warn!(service = %service_id, error = %e, "Service call not sent");
                Vec::new()
            }
        }
    }
}

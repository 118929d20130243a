use std::sync::Arc;

use crate::channel::EnvelopePublisher;
use crate::credentials::CredentialStore;
use crate::gateway::{AdmissionPolicy, CredentialChecker};

/// Shared dependencies for the edge gateway, constructed once at startup
/// and injected into the router.
#[derive(Clone)]
pub struct GatewayContext {
    pub credentials: Arc<dyn CredentialChecker>,
    pub publisher: Arc<dyn EnvelopePublisher>,
    pub policy: AdmissionPolicy,
}

impl GatewayContext {
    pub fn new(
        credentials: Arc<dyn CredentialChecker>,
        publisher: Arc<dyn EnvelopePublisher>,
        policy: AdmissionPolicy,
    ) -> Self {
        Self {
            credentials,
            publisher,
            policy,
        }
    }
}

/// Shared dependencies for the account service.
#[derive(Clone)]
pub struct AccountContext {
    pub store: CredentialStore,
}

impl AccountContext {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

//! Application state shared across handlers

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::auth::AuthProvider;
use crate::storage::TenantRegistry;

#[derive(Clone)]
pub struct AppState {
    pub tenants: Arc<TenantRegistry>,
    pub auth: Arc<dyn AuthProvider>,
    /// Subdomains allowed to resolve. `None` accepts any valid subdomain,
    /// which is the development default.
    pub allowed_tenants: Option<Arc<HashSet<String>>>,
}

impl AppState {
    pub fn new(auth: Arc<dyn AuthProvider>, allowed_tenants: Option<HashSet<String>>) -> Self {
        Self {
            tenants: Arc::new(TenantRegistry::new()),
            auth,
            allowed_tenants: allowed_tenants.map(Arc::new),
        }
    }
}

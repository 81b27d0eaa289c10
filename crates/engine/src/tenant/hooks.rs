//! Per-tenant behavior hooks.
//!
//! Almost all tenant divergence is data in [`super::TenantProfile`]. When a
//! tenant genuinely needs different behavior, it registers a hook here —
//! a tagged strategy selected by tenant id, not a subclass.

use std::collections::HashMap;
use std::sync::Arc;

use crate::session::Session;
use crate::tenant::TenantProfile;
use crate::types::TenantId;

/// Strategy hook points a tenant may override. Default impls keep the
/// data-driven behavior.
pub trait TenantHooks: Send + Sync {
    /// Rewrite or replace the greeting line.
    fn customize_greeting(&self, _profile: &TenantProfile, greeting: &str) -> String {
        greeting.to_string()
    }

    /// Last word on the closing line before hangup.
    fn closing_line(&self, _session: &Session) -> Option<String> {
        None
    }
}

/// No-op hook set used when a tenant registers nothing.
pub struct DefaultHooks;

impl TenantHooks for DefaultHooks {}

/// Registry of per-tenant hooks.
pub struct HookRegistry {
    hooks: HashMap<TenantId, Arc<dyn TenantHooks>>,
    default: Arc<dyn TenantHooks>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: HashMap::new(), default: Arc::new(DefaultHooks) }
    }

    pub fn register(&mut self, tenant_id: TenantId, hooks: Arc<dyn TenantHooks>) {
        self.hooks.insert(tenant_id, hooks);
    }

    pub fn for_tenant(&self, tenant_id: &TenantId) -> Arc<dyn TenantHooks> {
        self.hooks.get(tenant_id).cloned().unwrap_or_else(|| self.default.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::profile::{Greetings, RouteEntry};
    use crate::types::StaffId;

    struct ShoutyGreeting;

    impl TenantHooks for ShoutyGreeting {
        fn customize_greeting(&self, _profile: &TenantProfile, greeting: &str) -> String {
            greeting.to_uppercase()
        }
    }

    fn profile() -> TenantProfile {
        TenantProfile {
            tenant_id: TenantId("loud".into()),
            routes: HashMap::new(),
            default_route: RouteEntry {
                staff_id: StaffId("front-desk".into()),
                contact_address: "+15035550199".into(),
                display_name: "the front desk".into(),
                advertise: true,
            },
            emergency_route: None,
            faq: vec![],
            hours: vec![],
            utc_offset_minutes: 0,
            greetings: Greetings { in_hours: "hello".into(), after_hours: "after".into() },
            published_number: None,
            admin_contact: "admin@example".into(),
        }
    }

    #[test]
    fn hook_selection_by_tenant_id() {
        let mut registry = HookRegistry::new();
        registry.register(TenantId("loud".into()), Arc::new(ShoutyGreeting));

        let loud = registry.for_tenant(&TenantId("loud".into()));
        let quiet = registry.for_tenant(&TenantId("quiet".into()));

        let p = profile();
        assert_eq!(loud.customize_greeting(&p, "hello"), "HELLO");
        assert_eq!(quiet.customize_greeting(&p, "hello"), "hello");
    }
}

//! Tenant registry with atomic whole-table reload.
//!
//! Readers hold an `Arc<TenantProfile>` for the life of a turn, so a
//! reload can never expose a half-updated profile: `reload` swaps the
//! entire map behind the lock in one assignment and every subsequent
//! `get` sees only the new table.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::profile::TenantProfile;
use crate::types::TenantId;

type ProfileMap = HashMap<TenantId, Arc<TenantProfile>>;

/// Shared, reloadable tenant lookup table.
pub struct TenantRegistry {
    profiles: RwLock<Arc<ProfileMap>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self { profiles: RwLock::new(Arc::new(HashMap::new())) }
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = TenantProfile>) -> Self {
        let registry = Self::new();
        registry.reload(profiles);
        registry
    }

    /// Replace the whole table atomically. In-flight turns keep the
    /// profile Arc they already cloned.
    pub fn reload(&self, profiles: impl IntoIterator<Item = TenantProfile>) {
        let map: ProfileMap = profiles
            .into_iter()
            .map(|p| (p.tenant_id.clone(), Arc::new(p)))
            .collect();
        let count = map.len();
        *self.profiles.write() = Arc::new(map);
        info!("🔄 Tenant registry reloaded with {} profiles", count);
    }

    pub fn get(&self, tenant_id: &TenantId) -> Option<Arc<TenantProfile>> {
        self.profiles.read().get(tenant_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::profile::{Greetings, RouteEntry};
    use crate::types::StaffId;

    fn profile(id: &str, admin: &str) -> TenantProfile {
        TenantProfile {
            tenant_id: TenantId(id.into()),
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
            greetings: Greetings {
                in_hours: "hello".into(),
                after_hours: "after hours".into(),
            },
            published_number: None,
            admin_contact: admin.into(),
        }
    }

    #[test]
    fn reload_replaces_whole_table() {
        let registry = TenantRegistry::with_profiles([profile("a", "old@a"), profile("b", "old@b")]);
        assert_eq!(registry.len(), 2);

        // A turn in flight keeps its Arc across the reload.
        let held = registry.get(&TenantId("a".into())).unwrap();

        registry.reload([profile("a", "new@a")]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&TenantId("b".into())).is_none());
        assert_eq!(registry.get(&TenantId("a".into())).unwrap().admin_contact, "new@a");
        assert_eq!(held.admin_contact, "old@a");
    }
}

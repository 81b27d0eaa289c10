//! Tenant profiles, the reloadable registry, and per-tenant hooks.

pub mod hooks;
pub mod profile;
pub mod registry;

pub use hooks::{DefaultHooks, HookRegistry, TenantHooks};
pub use profile::{FaqRule, Greetings, HoursWindow, RouteEntry, TenantProfile};
pub use registry::TenantRegistry;

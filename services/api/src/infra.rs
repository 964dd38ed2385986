use metrics_exporter_prometheus::PrometheusHandle;
use repairdesk::workflows::maintenance::{Category, TechnicianRegistration, TechnicianRegistry};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seed roster used by the service and the demo until technicians are registered over HTTP.
pub(crate) fn demo_roster() -> TechnicianRegistry {
    TechnicianRegistry::with_roster([
        TechnicianRegistration {
            name: "Mike Technician".to_string(),
            email: "tech@demo.com".to_string(),
            skills: [Category::Plumbing, Category::Electrical].into_iter().collect(),
            available: true,
            completed_count: 15,
            rating: 4.8,
        },
        TechnicianRegistration {
            name: "Alex Rodriguez".to_string(),
            email: "alex@demo.com".to_string(),
            skills: [Category::Electrical, Category::Civil].into_iter().collect(),
            available: true,
            completed_count: 23,
            rating: 4.9,
        },
        TechnicianRegistration {
            name: "Sarah Johnson".to_string(),
            email: "sarah@demo.com".to_string(),
            skills: [Category::Plumbing, Category::Civil].into_iter().collect(),
            available: false,
            completed_count: 31,
            rating: 4.7,
        },
    ])
}

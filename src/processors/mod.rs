pub mod reconcile_report;
pub mod reconciler;
pub mod snapshot;

pub use reconcile_report::ReconcileReport;
pub use reconciler::{HistoricalReconciler, Reconciliation};
pub use snapshot::SnapshotAggregator;

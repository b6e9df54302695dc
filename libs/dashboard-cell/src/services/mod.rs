pub mod stats;

pub use stats::DashboardService;

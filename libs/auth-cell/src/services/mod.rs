pub mod identity;
pub mod registration;
pub mod snapshot;
pub mod staff;

pub use identity::IdentityService;
pub use registration::RegistrationService;
pub use snapshot::SnapshotStore;
pub use staff::StaffService;

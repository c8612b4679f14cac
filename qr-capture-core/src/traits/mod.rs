pub mod camera_backend;
pub mod capture_session;
pub mod scan_delegate;

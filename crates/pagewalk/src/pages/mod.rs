//! Page objects for the consumer site and the admin backend.

mod admin;
mod consumer;

pub use admin::{AdminDashboard, AdminLoginPage, UserManagement};
pub use consumer::{AuthPage, ConnectionFilter, DashboardPage, ExtensionPage, LandingPage, PricingPage};

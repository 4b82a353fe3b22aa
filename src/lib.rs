pub mod aggregate;
pub mod app;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod portal;
pub mod session;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use credentials::CredentialStore;
pub use portal::HttpPortal;
pub use session::SessionController;
pub use state::AppState;

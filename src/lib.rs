pub mod aggregate;
pub mod app;
pub mod capacity;
pub mod charts;
pub mod config;
pub mod dates;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod imaging;
pub mod labels;
pub mod models;
pub mod state;
pub mod storage;
pub mod ticker;
pub mod trend;
pub mod ui;
pub mod visitor;

pub use app::router;
pub use config::Config;
pub use gateway::Gateway;
pub use state::AppState;
pub use storage::LocalStore;

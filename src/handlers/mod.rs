pub mod account;
pub mod health;
pub mod lending;
pub mod manifest;
pub mod prices;
pub mod simulate;
pub mod transactions;

pub use account::create_account_routes;
pub use health::{create_health_routes, health_check};
pub use lending::create_lending_routes;
pub use manifest::create_manifest_routes;
pub use prices::create_price_routes;
pub use simulate::create_simulation_routes;
pub use transactions::create_transaction_routes;

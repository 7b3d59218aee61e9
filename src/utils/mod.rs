pub mod ids;
pub mod logging;

pub use ids::next_client_id;

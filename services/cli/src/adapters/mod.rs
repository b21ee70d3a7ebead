pub mod backend;
pub mod db;
pub mod local_store;

pub use backend::BackendClient;
pub use db::DbAdapter;
pub use local_store::LocalStore;

pub mod http_client_factory;
pub mod mock;
pub mod yahoo;

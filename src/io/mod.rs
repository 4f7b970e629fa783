pub mod config_io;
pub mod export;
pub mod kv_store;

pub mod gateway_sim;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

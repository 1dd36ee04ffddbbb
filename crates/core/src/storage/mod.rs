pub mod backend;
pub mod file;
pub mod memory;
pub mod migration;
pub mod store;

pub mod backup;
pub mod reference;
pub mod settings;
pub mod statistics;
pub mod storage_info;
pub mod transaction;

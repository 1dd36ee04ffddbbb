pub mod csv_service;
pub mod sample_data;
pub mod statistics_service;
pub mod transaction_repository;

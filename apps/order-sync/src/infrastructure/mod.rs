//! Infrastructure layer: adapters for the MoySklad API and PostgreSQL.

pub mod moysklad;
pub mod persistence;

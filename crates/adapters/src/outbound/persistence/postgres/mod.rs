//! PostgreSQL-backed repositories.

mod models;
mod profile_repository;

pub use profile_repository::PgProfileRepository;

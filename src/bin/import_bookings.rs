//! Loads booking documents from a JSON export into the booking store.
//!
//! Usage: `import_bookings <file.json>`. The file holds an array of booking
//! documents in the stored camelCase shape. Documents without an `id` get a
//! generated one. Existing documents with the same id are replaced.

use std::env;
use std::fs;
use std::process::ExitCode;

use dotenvy::dotenv;
use serde_json::Value;

use destino_ferias_admin::db::establish_connection_pool;
use destino_ferias_admin::domain::booking::Booking;
use destino_ferias_admin::domain::types::BookingId;
use destino_ferias_admin::models::config::ServerConfig;
use destino_ferias_admin::repository::errors::{RepositoryError, RepositoryResult};
use destino_ferias_admin::repository::{BookingWriter, DieselRepository};

/// Parses the documents of a JSON array, assigning ids where missing.
fn parse_documents(raw: &str) -> RepositoryResult<Vec<Booking>> {
    let documents: Vec<Value> = serde_json::from_str(raw)?;
    documents
        .into_iter()
        .enumerate()
        .map(|(index, mut document)| {
            let object = document.as_object_mut().ok_or_else(|| {
                RepositoryError::MalformedDocument(format!("entry {index} is not an object"))
            })?;
            let has_id = object
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| !id.trim().is_empty());
            if !has_id {
                object.insert(
                    "id".to_string(),
                    Value::String(BookingId::generate().into_inner()),
                );
            }
            serde_json::from_value(document).map_err(|err| {
                RepositoryError::MalformedDocument(format!("entry {index}: {err}"))
            })
        })
        .collect()
}

fn import<R>(repo: &R, path: &str) -> RepositoryResult<usize>
where
    R: BookingWriter,
{
    let raw = fs::read_to_string(path)
        .map_err(|err| RepositoryError::Unexpected(format!("cannot read {path}: {err}")))?;
    let bookings = parse_documents(&raw)?;
    log::info!("Parsed {} bookings from {path}", bookings.len());
    repo.upsert_bookings(&bookings)
}

fn main() -> ExitCode {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let Some(path) = env::args().nth(1) else {
        log::error!("Usage: import_bookings <file.json>");
        return ExitCode::FAILURE;
    };

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            return ExitCode::FAILURE;
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("Failed to establish database connection: {err}");
            return ExitCode::FAILURE;
        }
    };
    let repo = DieselRepository::new(pool);

    match import(&repo, &path) {
        Ok(count) => {
            log::info!("Imported {count} bookings");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Failed to import bookings: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ids_are_generated() {
        let raw = r#"[
            {"bookingCode": "X1", "customerId": 42, "type": "CAR", "bookingDate": 10,
             "status": "EMITIDO", "user": {"userName": "ana"}},
            {"id": "keep", "bookingCode": "X2", "customerId": 42, "type": "CAR",
             "bookingDate": 20, "status": "EMITIDO", "user": {"userName": "ana"}}
        ]"#;

        let bookings = parse_documents(raw).unwrap();

        assert_eq!(bookings.len(), 2);
        assert!(!bookings[0].id().is_empty());
        assert_eq!(bookings[1].id().as_str(), "keep");
        assert!(bookings[0].passengers.is_empty());
    }

    #[test]
    fn non_object_entries_are_rejected() {
        assert!(matches!(
            parse_documents("[1]"),
            Err(RepositoryError::MalformedDocument(_))
        ));
    }
}

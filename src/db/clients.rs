use rusqlite::{OptionalExtension, Row};

use super::Database;
use crate::error::AppError;
use crate::models::{Client, NewClient};

const CLIENT_COLUMNS: &str = "id, full_name, email, phone, profession, age, disc_type";

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        profession: row.get(4)?,
        age: row.get(5)?,
        disc_type: row.get(6)?,
    })
}

impl Database {
    /// Insert a client, or update the existing record with the same email (id is kept)
    pub fn upsert_client(&self, client: &NewClient) -> Result<Client, AppError> {
        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM clients WHERE email = ?1 ORDER BY id LIMIT 1",
                [&client.email],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE clients SET full_name = ?1, phone = ?2, profession = ?3, age = ?4, disc_type = ?5
                     WHERE id = ?6",
                    (
                        &client.full_name,
                        &client.phone,
                        &client.profession,
                        client.age,
                        client.disc_type,
                        id,
                    ),
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO clients (full_name, email, phone, profession, age, disc_type)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    (
                        &client.full_name,
                        &client.email,
                        &client.phone,
                        &client.profession,
                        client.age,
                        client.disc_type,
                    ),
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.commit()?;
        self.get_client(id)
    }

    pub fn get_client(&self, id: i64) -> Result<Client, AppError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM clients WHERE id = ?1", CLIENT_COLUMNS),
                [id],
                client_from_row,
            )
            .optional()?
            .ok_or(AppError::ClientNotFound(id))
    }

    /// Clients ordered by name; `filter` matches name, email or profession (case-insensitive)
    pub fn list_clients(&self, filter: Option<&str>) -> Result<Vec<Client>, AppError> {
        let pattern = format!("%{}%", filter.unwrap_or("").trim().to_lowercase());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM clients
             WHERE lower(full_name) LIKE ?1 OR lower(email) LIKE ?1 OR lower(profession) LIKE ?1
             ORDER BY full_name COLLATE NOCASE, id",
            CLIENT_COLUMNS
        ))?;
        let iter = stmt.query_map([pattern], client_from_row)?;

        let mut out = Vec::new();
        for client in iter {
            out.push(client?);
        }
        Ok(out)
    }
}

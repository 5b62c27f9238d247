//! SQLite implementation of the storage traits.
//!
//! Stores live in the `caches` table; entries reference their store and are
//! removed with it through `ON DELETE CASCADE`.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use url::Url;

use super::connection::CacheDb;
use super::storage::{CacheStorage, CacheStore};
use crate::{Error, Request, Response};

/// A named store inside a [`CacheDb`].
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: CacheDb,
    name: String,
}

#[async_trait]
impl CacheStorage for CacheDb {
    type Store = SqliteStore;

    async fn open(&self, name: &str) -> Result<SqliteStore, Error> {
        let owned = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let created = self
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let n = conn.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![owned, now],
                )?;
                Ok(n)
            })
            .await
            .map_err(Error::from)?;

        if created > 0 {
            tracing::debug!(cache = name, "created cache store");
        }

        Ok(SqliteStore { db: self.clone(), name: name.to_string() })
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let owned = name.to_string();
        let deleted = self
            .conn
            .call(move |conn| -> Result<usize, Error> {
                Ok(conn.execute("DELETE FROM caches WHERE name = ?1", params![owned])?)
            })
            .await
            .map_err(Error::from)?;

        Ok(deleted > 0)
    }
}

/// Row values for one entry, detached from the connection thread.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
    final_url: Option<String>,
}

impl EntryRow {
    fn from_pair(request: &Request, response: &Response) -> Result<Self, Error> {
        Ok(Self {
            key_hash: request.cache_key(),
            method: request.method.clone(),
            url: request.url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers_json: serde_json::to_string(&response.headers)?,
            body: response.body.to_vec(),
            final_url: response.url.as_ref().map(Url::to_string),
        })
    }

    fn insert(&self, conn: &rusqlite::Connection, cache_name: &str, stored_at: &str) -> Result<(), Error> {
        conn.execute(
            "INSERT INTO entries (
                cache_name, key_hash, method, url, status, status_text,
                headers_json, body, final_url, stored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(cache_name, key_hash) DO UPDATE SET
                method = excluded.method,
                url = excluded.url,
                status = excluded.status,
                status_text = excluded.status_text,
                headers_json = excluded.headers_json,
                body = excluded.body,
                final_url = excluded.final_url,
                stored_at = excluded.stored_at",
            params![
                cache_name,
                &self.key_hash,
                &self.method,
                &self.url,
                self.status,
                &self.status_text,
                &self.headers_json,
                &self.body,
                &self.final_url,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

fn parse_url(raw: &str) -> Result<Url, Error> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("stored url {raw}: {e}")))
}

#[async_trait]
impl CacheStore for SqliteStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, Error> {
        let name = self.name.clone();
        let key = request.cache_key();
        self.db
            .conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let row = conn.query_row(
                    "SELECT status, status_text, headers_json, body, final_url
                     FROM entries WHERE cache_name = ?1 AND key_hash = ?2",
                    params![name, key],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Vec<u8>>(3)?,
                            row.get::<_, Option<String>>(4)?,
                        ))
                    },
                );

                let (status, status_text, headers_json, body, final_url) = match row {
                    Ok(r) => r,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                Ok(Some(Response {
                    status,
                    status_text,
                    headers: serde_json::from_str(&headers_json)?,
                    body: Bytes::from(body),
                    url: final_url.as_deref().map(parse_url).transpose()?,
                }))
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        let name = self.name.clone();
        let row = EntryRow::from_pair(request, response)?;
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> { row.insert(conn, &name, &stored_at) })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, entries: &[(Request, Response)]) -> Result<(), Error> {
        let name = self.name.clone();
        let rows = entries
            .iter()
            .map(|(req, resp)| EntryRow::from_pair(req, resp))
            .collect::<Result<Vec<_>, _>>()?;
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    row.insert(&tx, &name, &stored_at)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<Request>, Error> {
        let name = self.name.clone();
        let raw = self
            .db
            .conn
            .call(move |conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare("SELECT method, url FROM entries WHERE cache_name = ?1 ORDER BY url, method")?;
                let rows = stmt
                    .query_map(params![name], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<(String, String)>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        raw.into_iter()
            .map(|(method, url)| Ok(Request::new(&method, parse_url(&url)?)))
            .collect()
    }

    async fn delete(&self, request: &Request) -> Result<bool, Error> {
        let name = self.name.clone();
        let key = request.cache_key();
        let deleted = self
            .db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                Ok(conn.execute("DELETE FROM entries WHERE cache_name = ?1 AND key_hash = ?2", params![name, key])?)
            })
            .await
            .map_err(Error::from)?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> Result<usize, Error> {
        let name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let n: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE cache_name = ?1", params![name], |row| row.get(0))?;
                Ok(n as usize)
            })
            .await
            .map_err(Error::from)
    }
}

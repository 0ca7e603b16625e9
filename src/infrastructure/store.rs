//! Relational store for applications and servers
//!
//! Every mutating operation runs in its own transaction and either commits
//! as a whole or is rolled back before the error is returned.

use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::{FromRow, Transaction};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, instrument};

use crate::domain::{
    Application, ApplicationId, ApplicationName, ApplicationStatus, ApplicationUpdate, DbPort,
    Hostname, IpAddress, NewApplication, NewServer, Owner, Server, ServerId, WebUi,
};
use crate::infrastructure::Database;
use crate::{Error, Result};

/// Persistence operations over applications and their servers
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All applications, each with its servers embedded
    async fn list_applications(&self) -> Result<Vec<Application>>;

    async fn get_application(&self, id: ApplicationId) -> Result<Application>;

    /// Insert one application with the initial status and verification flag
    async fn create_application(&self, new_app: &NewApplication) -> Result<ApplicationId>;

    /// Insert a batch of applications atomically
    ///
    /// A failure is reported against its 1-based position in the batch.
    async fn create_applications(&self, batch: &[NewApplication]) -> Result<Vec<ApplicationId>>;

    async fn update_application(&self, id: ApplicationId, update: &ApplicationUpdate)
        -> Result<()>;

    /// Remove an application and, by cascade, its servers
    async fn delete_application(&self, id: ApplicationId) -> Result<()>;

    /// All servers across all applications, flat
    async fn list_servers(&self) -> Result<Vec<Server>>;

    /// Insert one server; its application must exist
    async fn create_server(&self, new_server: &NewServer) -> Result<ServerId>;

    /// Insert a batch of servers atomically
    ///
    /// A failure is reported against its 1-based position in the batch.
    async fn create_servers(&self, batch: &[NewServer]) -> Result<Vec<ServerId>>;
}

/// SQLite-backed [`InventoryStore`]
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }
}

const APPLICATION_COLUMNS: &str = "id, name, owner, web_ui, db_port, status, shutdown_verified";
const SERVER_COLUMNS: &str = "id, hostname, ip_address, ping_status, app_id";

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: i64,
    name: String,
    owner: String,
    web_ui: Option<String>,
    db_port: Option<i64>,
    status: String,
    shutdown_verified: bool,
}

impl ApplicationRow {
    fn into_application(self, servers: Vec<Server>) -> Result<Application> {
        Ok(Application {
            id: ApplicationId::new(self.id),
            name: decoded(ApplicationName::try_new(self.name))?,
            owner: decoded(Owner::try_new(self.owner))?,
            web_ui: self
                .web_ui
                .map(|web_ui| decoded(WebUi::try_new(web_ui)))
                .transpose()?,
            db_port: self
                .db_port
                .map(|port| decoded(u16::try_from(port)).map(DbPort::new))
                .transpose()?,
            status: decoded(ApplicationStatus::try_new(self.status))?,
            shutdown_verified: self.shutdown_verified,
            servers,
        })
    }
}

#[derive(Debug, FromRow)]
struct ServerRow {
    id: i64,
    hostname: String,
    ip_address: String,
    ping_status: bool,
    app_id: i64,
}

impl TryFrom<ServerRow> for Server {
    type Error = Error;

    fn try_from(row: ServerRow) -> Result<Self> {
        Ok(Self {
            id: ServerId::new(row.id),
            hostname: decoded(Hostname::try_new(row.hostname))?,
            ip_address: decoded(IpAddress::try_new(row.ip_address))?,
            ping_status: row.ping_status,
            app_id: ApplicationId::new(row.app_id),
        })
    }
}

/// Stored values that no longer pass validation surface as decode failures
fn decoded<T, E>(value: std::result::Result<T, E>) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    value.map_err(|e| Error::Store(sqlx::Error::Decode(Box::new(e))))
}

/// Commit on success, roll back on failure
async fn finish<T>(tx: Transaction<'_, Sqlite>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(failure) => {
            if let Err(rollback_error) = tx.rollback().await {
                error!(error = %rollback_error, "Rollback failed");
            }
            Err(failure)
        }
    }
}

async fn insert_application(
    conn: &mut SqliteConnection,
    new_app: &NewApplication,
) -> Result<ApplicationId> {
    let result = sqlx::query(
        r#"
        INSERT INTO applications (name, owner, web_ui, db_port, status, shutdown_verified)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_app.name.clone().into_inner())
    .bind(new_app.owner.clone().into_inner())
    .bind(new_app.web_ui.clone().map(WebUi::into_inner))
    .bind(new_app.db_port.map(|port| i64::from(port.into_inner())))
    .bind(ApplicationStatus::initial().into_inner())
    .bind(false)
    .execute(&mut *conn)
    .await?;

    Ok(ApplicationId::new(result.last_insert_rowid()))
}

async fn insert_applications(
    conn: &mut SqliteConnection,
    batch: &[NewApplication],
) -> Result<Vec<ApplicationId>> {
    let mut ids = Vec::with_capacity(batch.len());
    for (index, new_app) in batch.iter().enumerate() {
        ids.push(
            insert_application(conn, new_app)
                .await
                .map_err(|e| e.at_row(index + 1))?,
        );
    }
    Ok(ids)
}

async fn application_exists(conn: &mut SqliteConnection, id: ApplicationId) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE id = ?")
        .bind(id.into_inner())
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

async fn insert_server(conn: &mut SqliteConnection, new_server: &NewServer) -> Result<ServerId> {
    let result = sqlx::query(
        r#"
        INSERT INTO servers (hostname, ip_address, ping_status, app_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(new_server.hostname.clone().into_inner())
    .bind(new_server.ip_address.clone().into_inner())
    .bind(true)
    .bind(new_server.app_id.into_inner())
    .execute(&mut *conn)
    .await?;

    Ok(ServerId::new(result.last_insert_rowid()))
}

async fn insert_servers(conn: &mut SqliteConnection, batch: &[NewServer]) -> Result<Vec<ServerId>> {
    let mut known = HashSet::new();
    let mut ids = Vec::with_capacity(batch.len());

    for (index, new_server) in batch.iter().enumerate() {
        let row = index + 1;
        let app_id = new_server.app_id;
        if !known.contains(&app_id) {
            if !application_exists(conn, app_id).await.map_err(|e| e.at_row(row))? {
                return Err(Error::application_not_found(app_id.into_inner()).at_row(row));
            }
            known.insert(app_id);
        }
        ids.push(insert_server(conn, new_server).await.map_err(|e| e.at_row(row))?);
    }

    Ok(ids)
}

async fn servers_of(conn: &mut SqliteConnection, id: ApplicationId) -> Result<Vec<Server>> {
    let rows: Vec<ServerRow> = sqlx::query_as(&format!(
        "SELECT {SERVER_COLUMNS} FROM servers WHERE app_id = ? ORDER BY id"
    ))
    .bind(id.into_inner())
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(Server::try_from).collect()
}

#[async_trait]
impl InventoryStore for SqliteStore {
    #[instrument(skip(self))]
    async fn list_applications(&self) -> Result<Vec<Application>> {
        let mut tx = self.pool.begin().await?;
        let application_rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        let server_rows: Vec<ServerRow> =
            sqlx::query_as(&format!("SELECT {SERVER_COLUMNS} FROM servers ORDER BY id"))
                .fetch_all(&mut *tx)
                .await?;
        tx.commit().await?;

        let mut servers_by_app: HashMap<ApplicationId, Vec<Server>> = HashMap::new();
        for row in server_rows {
            let server = Server::try_from(row)?;
            servers_by_app.entry(server.app_id).or_default().push(server);
        }

        let applications = application_rows
            .into_iter()
            .map(|row| {
                let servers = servers_by_app
                    .remove(&ApplicationId::new(row.id))
                    .unwrap_or_default();
                row.into_application(servers)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(count = applications.len(), "Fetched applications");
        Ok(applications)
    }

    #[instrument(skip(self))]
    async fn get_application(&self, id: ApplicationId) -> Result<Application> {
        let mut conn = self.pool.acquire().await?;
        let row: Option<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?"
        ))
        .bind(id.into_inner())
        .fetch_optional(&mut *conn)
        .await?;

        let row = row.ok_or_else(|| Error::application_not_found(id.into_inner()))?;
        let servers = servers_of(&mut conn, id).await?;
        row.into_application(servers)
    }

    #[instrument(skip(self, new_app), fields(name = %new_app.name))]
    async fn create_application(&self, new_app: &NewApplication) -> Result<ApplicationId> {
        let mut tx = self.pool.begin().await?;
        let outcome = insert_application(&mut tx, new_app).await;
        let id = finish(tx, outcome).await?;

        info!(application_id = %id, "Application created");
        Ok(id)
    }

    #[instrument(skip(self, batch), fields(rows = batch.len()))]
    async fn create_applications(&self, batch: &[NewApplication]) -> Result<Vec<ApplicationId>> {
        let mut tx = self.pool.begin().await?;
        let outcome = insert_applications(&mut tx, batch).await;
        let ids = finish(tx, outcome).await?;

        info!(count = ids.len(), "Applications created");
        Ok(ids)
    }

    #[instrument(skip(self, update))]
    async fn update_application(
        &self,
        id: ApplicationId,
        update: &ApplicationUpdate,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let outcome = sqlx::query(
            r#"
            UPDATE applications
            SET status = COALESCE(?, status),
                shutdown_verified = COALESCE(?, shutdown_verified)
            WHERE id = ?
            "#,
        )
        .bind(update.status.clone().map(ApplicationStatus::into_inner))
        .bind(update.shutdown_verified)
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(Error::from)
        .and_then(|result| {
            if result.rows_affected() == 0 {
                Err(Error::application_not_found(id.into_inner()))
            } else {
                Ok(())
            }
        });
        finish(tx, outcome).await?;

        info!(application_id = %id, "Application updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_application(&self, id: ApplicationId) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let outcome = sqlx::query("DELETE FROM applications WHERE id = ?")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(Error::from)
            .and_then(|result| {
                if result.rows_affected() == 0 {
                    Err(Error::application_not_found(id.into_inner()))
                } else {
                    Ok(())
                }
            });
        finish(tx, outcome).await?;

        info!(application_id = %id, "Application deleted with its servers");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_servers(&self) -> Result<Vec<Server>> {
        let rows: Vec<ServerRow> =
            sqlx::query_as(&format!("SELECT {SERVER_COLUMNS} FROM servers ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        let servers = rows
            .into_iter()
            .map(Server::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(count = servers.len(), "Fetched servers");
        Ok(servers)
    }

    #[instrument(
        skip(self, new_server),
        fields(hostname = %new_server.hostname, app_id = %new_server.app_id)
    )]
    async fn create_server(&self, new_server: &NewServer) -> Result<ServerId> {
        let mut tx = self.pool.begin().await?;
        let outcome = match application_exists(&mut tx, new_server.app_id).await {
            Ok(true) => insert_server(&mut tx, new_server).await,
            Ok(false) => Err(Error::application_not_found(
                new_server.app_id.into_inner(),
            )),
            Err(failure) => Err(failure),
        };
        let id = finish(tx, outcome).await?;

        info!(server_id = %id, "Server created");
        Ok(id)
    }

    #[instrument(skip(self, batch), fields(rows = batch.len()))]
    async fn create_servers(&self, batch: &[NewServer]) -> Result<Vec<ServerId>> {
        let mut tx = self.pool.begin().await?;
        let outcome = insert_servers(&mut tx, batch).await;
        let ids = finish(tx, outcome).await?;

        info!(count = ids.len(), "Servers created");
        Ok(ids)
    }
}

//! Proxy server: one thread and one SQLite session per client connection.

use crate::protocol::{decode, read_frame, write_frame, Request, Response};
use anyhow::{Context, Result};
use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use tpcc_backend::SqlConnection;
use tpcc_sqlite::{SqliteConfig, SqliteConnection};
use tracing::{debug, error, info, warn};

pub const DEFAULT_PORT: u16 = 5478;
pub const MEMORY_DATABASE: &str = ":memory:";

/// Accepts proxy clients and serves each on its own thread.
pub struct ProxyServer {
    listener: TcpListener,
    database: String,
    sqlite: SqliteConfig,
}

impl ProxyServer {
    /// Bind the listening socket.
    ///
    /// `database` is the main database opened for every session; use
    /// `:memory:` when all tables live in attached partitions.
    pub fn bind(
        addr: impl ToSocketAddrs,
        database: impl Into<String>,
        sqlite: SqliteConfig,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).context("Failed to bind proxy listener")?;
        Ok(Self {
            listener,
            database: database.into(),
            sqlite,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails.
    pub fn serve(self) -> Result<()> {
        info!(
            "Proxy server listening on {} (database: {})",
            self.local_addr()?,
            self.database
        );

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Error accepting connection: {e}");
                    continue;
                }
            };
            let peer = stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            info!("Connection from {peer}");

            let database = self.database.clone();
            let sqlite = self.sqlite.clone();
            let spawned = thread::Builder::new()
                .name(format!("proxy-{peer}"))
                .spawn(move || {
                    if let Err(e) = handle_connection(stream, &database, &sqlite) {
                        error!("Error handling connection from {peer}: {e:#}");
                    } else {
                        info!("Connection from {peer} closed");
                    }
                });
            if let Err(e) = spawned {
                error!("Failed to spawn connection thread: {e}");
            }
        }
        Ok(())
    }
}

fn open_session(database: &str, sqlite: &SqliteConfig) -> Result<SqliteConnection> {
    let conn = if database == MEMORY_DATABASE {
        SqliteConnection::open_in_memory(sqlite)?
    } else {
        SqliteConnection::open(database, sqlite)?
    };
    Ok(conn)
}

/// Serve requests on one connection until the client disconnects.
fn handle_connection(stream: TcpStream, database: &str, sqlite: &SqliteConfig) -> Result<()> {
    stream.set_nodelay(true)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);
    let mut session = open_session(database, sqlite)
        .with_context(|| format!("Failed to open database {database}"))?;

    while let Some(body) = read_frame(&mut reader)? {
        let response = match decode::<Request>(&body) {
            Ok(request) => handle_request(&mut session, request),
            Err(e) => {
                warn!("Rejecting malformed request: {e}");
                Response::failure(format!("Unknown command: {e}"))
            }
        };
        write_frame(&mut writer, &response)?;
    }

    // Anything left open by a vanished client is discarded.
    if session.in_transaction() {
        session.rollback().ok();
    }
    Ok(())
}

/// Run one request against a session.
pub fn handle_request<C: SqlConnection>(session: &mut C, request: Request) -> Response {
    let result = match request {
        Request::Execute {
            statement,
            statement_args,
        } => {
            debug!("execute: {statement}");
            session
                .execute(&statement, &statement_args)
                .map(Response::with_rows)
        }
        Request::Commit {} => session.commit().map(|()| Response::ok()),
        Request::Rollback {} => session.rollback().map(|()| Response::ok()),
    };
    result.unwrap_or_else(|e| Response::failure(e.to_string()))
}

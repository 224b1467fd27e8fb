//! Client side of the proxy protocol.

use crate::config::ProxyConfig;
use crate::error::ProtocolError;
use crate::protocol::{decode, read_frame, write_frame, Request, Response};
use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use tpcc_backend::{BackendError, PartitionLayout, PartitionedBackend, SqlConnection};
use tpcc_types::{Row, SqlValue};
use tracing::debug;

/// Partitioned backend whose statements run on a proxy server.
pub type ProxyBackend = PartitionedBackend<ProxyConnection>;

/// A session with one proxy server connection.
///
/// Partition attachment uses the default `ATTACH DATABASE` statement, so
/// partition paths are resolved on the server host.
pub struct ProxyConnection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl ProxyConnection {
    pub fn connect(host: &str, port: u16) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        debug!("Connected to proxy at {host}:{port}");
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one request and wait for its response.
    pub fn call(&mut self, request: &Request) -> Result<Response, ProtocolError> {
        write_frame(&mut self.writer, request)?;
        let body = read_frame(&mut self.reader)?.ok_or(ProtocolError::Closed)?;
        decode(&body)
    }

    fn call_checked(&mut self, request: &Request) -> Result<Response, BackendError> {
        let response = self.call(request)?;
        if response.success {
            Ok(response)
        } else {
            Err(BackendError::Sql(
                response
                    .error
                    .unwrap_or_else(|| "request failed without an error message".to_string()),
            ))
        }
    }
}

impl SqlConnection for ProxyConnection {
    fn execute(&mut self, statement: &str, args: &[SqlValue]) -> Result<Vec<Row>, BackendError> {
        let response = self.call_checked(&Request::Execute {
            statement: statement.to_string(),
            statement_args: args.to_vec(),
        })?;
        Ok(response.rows.unwrap_or_default())
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.call_checked(&Request::Commit {})?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        self.call_checked(&Request::Rollback {})?;
        Ok(())
    }
}

/// Connect to the configured proxy server and wrap the session in a
/// partitioned backend.
pub fn connect(
    config: &ProxyConfig,
    districts_per_warehouse: i64,
) -> Result<ProxyBackend, BackendError> {
    let layout = PartitionLayout::new(config.database.clone())?;
    let conn = ProxyConnection::connect(&config.host, config.port)?;
    Ok(PartitionedBackend::new(conn, layout, districts_per_warehouse))
}

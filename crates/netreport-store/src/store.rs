use netreport_engine::{EngineError, Result, VectorTotals};
use netreport_model::{ParameterRecord, RunAttributes, ScalarRecord};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use tracing::debug;

fn store_err(err: rusqlite::Error) -> EngineError {
    EngineError::Store(err.to_string())
}

/// One OMNeT++ SQLite result file, opened read-only. A scalar (`.sca`) store
/// carries the `runParam`, `scalar` and `runAttr` relations; a vector
/// (`.vec`) store carries the `vector` relation.
#[derive(Debug)]
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| EngineError::ConnectionFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        debug!(path = %path.display(), "opened result store");
        Ok(Self { conn })
    }

    /// Wrap an already-open connection. Used by tests with in-memory stores.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Visit every `runParam` row in the store's native order. That order is
    /// the insertion order of the result writer, which the flow parser relies
    /// on; no ORDER BY is applied.
    pub fn for_each_param(
        &self,
        mut visit: impl FnMut(ParameterRecord) -> Result<()>,
    ) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT runId, paramKey, paramValue, paramOrder FROM runParam")
            .map_err(store_err)?;
        let mut rows = stmt.query([]).map_err(store_err)?;
        while let Some(row) = rows.next().map_err(store_err)? {
            visit(ParameterRecord {
                run_id: row.get(0).map_err(store_err)?,
                key: row.get(1).map_err(store_err)?,
                value: row.get(2).map_err(store_err)?,
                order: row.get(3).map_err(store_err)?,
            })?;
        }
        Ok(())
    }

    /// Visit every `scalar` row.
    pub fn for_each_scalar(
        &self,
        mut visit: impl FnMut(ScalarRecord) -> Result<()>,
    ) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT scalarId, runId, moduleName, scalarName, scalarValue FROM scalar")
            .map_err(store_err)?;
        let mut rows = stmt.query([]).map_err(store_err)?;
        while let Some(row) = rows.next().map_err(store_err)? {
            visit(ScalarRecord {
                scalar_id: row.get(0).map_err(store_err)?,
                run_id: row.get(1).map_err(store_err)?,
                module: row.get(2).map_err(store_err)?,
                name: row.get(3).map_err(store_err)?,
                value: row.get(4).map_err(store_err)?,
            })?;
        }
        Ok(())
    }

    /// Run metadata from the `runAttr` relation. Missing attributes come back
    /// as empty strings rather than failing the whole report.
    pub fn run_attributes(&self) -> Result<RunAttributes> {
        Ok(RunAttributes {
            config_name: self.attr("configname")?,
            datetime: self.attr("datetime")?,
            network: self.attr("network")?,
            experiment: self.attr("experiment")?,
        })
    }

    fn attr(&self, name: &str) -> Result<String> {
        self.conn
            .query_row(
                "SELECT attrValue FROM runAttr WHERE attrName = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()
            .map_err(store_err)
            .map(Option::unwrap_or_default)
    }

    /// Aggregate delay and received-packet totals from the `vector` relation,
    /// restricted to host modules (module names ending in an index bracket).
    pub fn vector_totals(&self) -> Result<VectorTotals> {
        let total_delay_secs: Option<f64> = self
            .conn
            .query_row(
                "SELECT SUM(vectorSum) FROM vector \
                 WHERE vectorName = 'endToEndDelay:vector' AND LIKE('%]', moduleName) = 1",
                [],
                |row| row.get(0),
            )
            .map_err(store_err)?;
        let packet_count: Option<i64> = self
            .conn
            .query_row(
                "SELECT SUM(vectorCount) FROM vector \
                 WHERE vectorName = 'packetReceived:vector(packetBytes)' \
                 AND LIKE('%]', moduleName) = 1",
                [],
                |row| row.get(0),
            )
            .map_err(store_err)?;
        let total_packet_bytes: Option<f64> = self
            .conn
            .query_row(
                "SELECT SUM(vectorSum) FROM vector \
                 WHERE vectorName = 'packetReceived:vector(packetBytes)' \
                 AND LIKE('%]', moduleName) = 1",
                [],
                |row| row.get(0),
            )
            .map_err(store_err)?;

        Ok(VectorTotals {
            total_delay_secs: total_delay_secs.unwrap_or(0.0),
            packet_count: packet_count.unwrap_or(0).max(0) as u64,
            total_packet_bytes: total_packet_bytes.unwrap_or(0.0),
        })
    }
}

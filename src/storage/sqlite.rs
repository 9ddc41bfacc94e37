//! SQLite storage backend for proteomap

use super::traits::{GraphStore, OpenStore, StorageError, StorageResult};
use crate::graph::{Edge, EdgeId, EntityKind, GraphId, Node, NodeId, PathwayGraph};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Raw node columns: (id, kind, properties_json, metadata_json)
type NodeRow = (String, String, String, String);

/// Raw edge columns: (id, source_id, target_id, relationship, created_at, properties_json)
type EdgeRow = (String, String, String, String, String, String);

const NODE_COLUMNS: &str = "id, kind, properties_json, metadata_json";
const EDGE_COLUMNS: &str = "id, source_id, target_id, relationship, created_at, properties_json";

/// SQLite-backed graph store
///
/// Uses a single SQLite database file with tables for graphs, nodes, and edges.
/// Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS graphs (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                metadata_json TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS nodes (
                id TEXT NOT NULL,
                graph_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                metadata_json TEXT NOT NULL,
                PRIMARY KEY (graph_id, id),
                FOREIGN KEY (graph_id) REFERENCES graphs(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS edges (
                id TEXT NOT NULL,
                graph_id TEXT NOT NULL,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                relationship TEXT NOT NULL,
                created_at TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                PRIMARY KEY (graph_id, id),
                FOREIGN KEY (graph_id) REFERENCES graphs(id) ON DELETE CASCADE
            );

            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn node_to_row(node: &Node) -> StorageResult<NodeRow> {
        Ok((
            node.id.as_str().to_string(),
            node.kind.label().to_string(),
            serde_json::to_string(&node.properties)?,
            serde_json::to_string(&node.metadata)?,
        ))
    }

    fn row_to_node((id, kind, properties_json, metadata_json): NodeRow) -> StorageResult<Node> {
        Ok(Node {
            id: NodeId::from_string(id),
            kind: EntityKind::from_label(&kind).ok_or(StorageError::UnknownKind(kind))?,
            properties: serde_json::from_str(&properties_json)?,
            metadata: serde_json::from_str(&metadata_json)?,
        })
    }

    fn edge_to_row(edge: &Edge) -> StorageResult<EdgeRow> {
        Ok((
            edge.id.as_str().to_string(),
            edge.source.as_str().to_string(),
            edge.target.as_str().to_string(),
            edge.relationship.clone(),
            edge.created_at.to_rfc3339(),
            serde_json::to_string(&edge.properties)?,
        ))
    }

    fn row_to_edge(row: EdgeRow) -> StorageResult<Edge> {
        use chrono::DateTime;

        let (id, source, target, relationship, created_at, properties_json) = row;
        Ok(Edge {
            id: EdgeId::from_string(id),
            source: NodeId::from_string(source),
            target: NodeId::from_string(target),
            relationship,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| StorageError::DateParse(e.to_string()))?
                .with_timezone(&chrono::Utc),
            properties: serde_json::from_str(&properties_json)?,
        })
    }

    fn read_node_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NodeRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn read_edge_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EdgeRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    fn insert_node(conn: &Connection, graph_id: &GraphId, node: &Node) -> StorageResult<()> {
        let (id, kind, properties, metadata) = Self::node_to_row(node)?;
        conn.execute(
            r#"
            INSERT INTO nodes (id, graph_id, kind, properties_json, metadata_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![id, graph_id.as_str(), kind, properties, metadata],
        )?;
        Ok(())
    }

    fn insert_edge(conn: &Connection, graph_id: &GraphId, edge: &Edge) -> StorageResult<()> {
        let (id, source, target, relationship, created, properties) = Self::edge_to_row(edge)?;
        conn.execute(
            r#"
            INSERT INTO edges
                (id, graph_id, source_id, target_id, relationship, created_at, properties_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![id, graph_id.as_str(), source, target, relationship, created, properties],
        )?;
        Ok(())
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl GraphStore for SqliteStore {
    fn save_graph(&self, graph: &PathwayGraph) -> StorageResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let metadata_json = serde_json::to_string(&graph.metadata)?;
        tx.execute(
            r#"
            INSERT INTO graphs (id, name, description, metadata_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                metadata_json = excluded.metadata_json
            "#,
            params![graph.id.as_str(), graph.name, graph.description, metadata_json],
        )?;

        // Full replacement: the graph in memory is the complete state
        tx.execute("DELETE FROM edges WHERE graph_id = ?1", params![graph.id.as_str()])?;
        tx.execute("DELETE FROM nodes WHERE graph_id = ?1", params![graph.id.as_str()])?;

        for node in graph.nodes.values() {
            Self::insert_node(&tx, &graph.id, node)?;
        }
        for edge in &graph.edges {
            Self::insert_edge(&tx, &graph.id, edge)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn load_graph(&self, id: &GraphId) -> StorageResult<Option<PathwayGraph>> {
        let conn = self.conn.lock().unwrap();

        let header: Option<(String, Option<String>, String)> = conn
            .query_row(
                "SELECT name, description, metadata_json FROM graphs WHERE id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((name, description, metadata_json)) = header else {
            return Ok(None);
        };

        let mut graph = PathwayGraph::with_id(id.clone(), name);
        graph.description = description;
        graph.metadata = serde_json::from_str(&metadata_json)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE graph_id = ?1"
        ))?;
        let rows = stmt.query_map(params![id.as_str()], Self::read_node_row)?;
        let mut nodes = HashMap::new();
        for row in rows {
            let node = Self::row_to_node(row?)?;
            nodes.insert(node.id.clone(), node);
        }
        graph.nodes = nodes;

        let mut stmt = conn.prepare(&format!(
            "SELECT {EDGE_COLUMNS} FROM edges WHERE graph_id = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map(params![id.as_str()], Self::read_edge_row)?;
        for row in rows {
            graph.edges.push(Self::row_to_edge(row?)?);
        }

        Ok(Some(graph))
    }

    fn delete_graph(&self, id: &GraphId) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM graphs WHERE id = ?1", params![id.as_str()])?;
        Ok(rows > 0)
    }

    fn list_graphs(&self) -> StorageResult<Vec<GraphId>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM graphs ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids.into_iter().map(GraphId::from_string).collect())
    }
}

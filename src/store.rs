use crate::pipeline::AnalysisReport;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;

/// Stored content is truncated to this many characters.
const MAX_STORED_CONTENT: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: i64,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub category: String,
    pub content: String,
    pub threat_score: u32,
    pub analysis_result: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_analyses: u64,
    pub average_threat_score: f64,
    pub high_threat_count: u64,
}

/// SQLite-backed history of past analyses. The pipeline itself never touches
/// this; the transport layer decides what gets saved.
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    pub fn open(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {db_path}"))?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS analyses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                category TEXT NOT NULL,
                content TEXT NOT NULL,
                threat_score INTEGER NOT NULL,
                analysis_result TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create analyses table")?;
        Ok(())
    }

    pub fn save(&self, content: &str, report: &AnalysisReport) -> Result<i64> {
        let truncated: String = content.chars().take(MAX_STORED_CONTENT).collect();
        let summary = Self::result_summary(report);
        self.conn
            .execute(
                "INSERT INTO analyses (timestamp, category, content, threat_score, analysis_result)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    report.timestamp.to_rfc3339(),
                    report.detection.category.label(),
                    truncated,
                    report.detection.threat_score,
                    summary.to_string(),
                ],
            )
            .context("Failed to save analysis")?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The persisted subset of an analysis; full indicator details stay with
    /// the caller.
    fn result_summary(report: &AnalysisReport) -> serde_json::Value {
        json!({
            "threat_score": report.detection.threat_score,
            "is_phishing": report.detection.is_phishing,
            "risk_level": report.explanation.risk_level.label(),
            "attack_type": report.reasoning.attack_type,
            "confidence": report.reasoning.confidence,
            "indicator_count": report.detection.indicators.len(),
            "summary": report.explanation.summary,
        })
    }

    pub fn list_all(&self) -> Result<Vec<StoredAnalysis>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, category, content, threat_score, analysis_result
             FROM analyses ORDER BY id DESC",
        )?;
        let rows = stmt
            .query_map([], Self::row_to_analysis)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to list analyses")?;
        Ok(rows)
    }

    pub fn get(&self, id: i64) -> Result<Option<StoredAnalysis>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, category, content, threat_score, analysis_result
             FROM analyses WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![id], Self::row_to_analysis)
            .optional()
            .context("Failed to fetch analysis")?;
        Ok(row)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM analyses WHERE id = ?1", params![id])
            .context("Failed to delete analysis")?;
        Ok(affected > 0)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let (total, average, high): (u64, Option<f64>, u64) = self.conn.query_row(
            "SELECT COUNT(*),
                    AVG(threat_score),
                    COUNT(CASE WHEN threat_score >= 70 THEN 1 END)
             FROM analyses",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(StoreStats {
            total_analyses: total,
            average_threat_score: average.unwrap_or(0.0),
            high_threat_count: high,
        })
    }

    fn row_to_analysis(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredAnalysis> {
        let raw_result: String = row.get(5)?;
        Ok(StoredAnalysis {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            category: row.get(2)?,
            content: row.get(3)?,
            threat_score: row.get(4)?,
            analysis_result: serde_json::from_str(&raw_result)
                .unwrap_or(serde_json::Value::Null),
        })
    }
}

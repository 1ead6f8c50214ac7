//! SQLite-backed hierarchy store.
//!
//! Each rebuild deletes the media's sentences, scenes, and chapters and
//! inserts the new tree inside one transaction, so a failed insert rolls the
//! delete back with it.

use super::{Chapter, Hierarchy, HierarchyStore, MediaSummary, RebuildSummary, Scene};
use crate::error::{ChapterizeError, Result};
use crate::transcript::{SentenceSpan, Transcript};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS media (
        media_id TEXT PRIMARY KEY,
        template TEXT NOT NULL,
        duration_seconds REAL NOT NULL,
        chapter_count INTEGER NOT NULL,
        scene_count INTEGER NOT NULL,
        sentence_count INTEGER NOT NULL,
        rebuilt_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chapters (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        media_id TEXT NOT NULL,
        chapter_order INTEGER NOT NULL,
        title TEXT NOT NULL,
        start_seconds REAL NOT NULL,
        end_seconds REAL NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chapters_media_id ON chapters(media_id);

    CREATE TABLE IF NOT EXISTS scenes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chapter_id INTEGER NOT NULL REFERENCES chapters(id),
        scene_order INTEGER NOT NULL,
        title TEXT NOT NULL,
        start_seconds REAL NOT NULL,
        end_seconds REAL NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_scenes_chapter_id ON scenes(chapter_id);

    CREATE TABLE IF NOT EXISTS sentences (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        scene_id INTEGER NOT NULL REFERENCES scenes(id),
        sentence_order INTEGER NOT NULL,
        source_order INTEGER NOT NULL,
        text TEXT NOT NULL,
        start_seconds REAL NOT NULL,
        end_seconds REAL NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_sentences_scene_id ON sentences(scene_id);

    CREATE TABLE IF NOT EXISTS transcripts (
        media_id TEXT PRIMARY KEY,
        transcript_json TEXT NOT NULL,
        duration_seconds REAL NOT NULL,
        stored_at TEXT NOT NULL
    );
"#;

/// SQLite-based hierarchy store.
pub struct SqliteHierarchyStore {
    conn: Mutex<Connection>,
}

impl SqliteHierarchyStore {
    /// Open (or create) a store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite hierarchy store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ChapterizeError::Persistence(format!("Failed to acquire lock: {}", e)))
    }

    fn load_hierarchy(conn: &Connection, media_id: &str) -> Result<Option<Hierarchy>> {
        let mut chapter_stmt = conn.prepare(
            "SELECT id, chapter_order, title, start_seconds, end_seconds
             FROM chapters WHERE media_id = ?1 ORDER BY chapter_order",
        )?;
        let mut scene_stmt = conn.prepare(
            "SELECT id, scene_order, title, start_seconds, end_seconds
             FROM scenes WHERE chapter_id = ?1 ORDER BY scene_order",
        )?;
        let mut sentence_stmt = conn.prepare(
            "SELECT text, start_seconds, end_seconds, source_order
             FROM sentences WHERE scene_id = ?1 ORDER BY sentence_order",
        )?;

        let chapter_rows = chapter_stmt
            .query_map(params![media_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if chapter_rows.is_empty() {
            return Ok(None);
        }

        let mut chapters = Vec::with_capacity(chapter_rows.len());
        for (chapter_id, order, title, start_seconds, end_seconds) in chapter_rows {
            let scene_rows = scene_stmt
                .query_map(params![chapter_id], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, f64>(4)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut scenes = Vec::with_capacity(scene_rows.len());
            for (scene_id, scene_order, scene_title, scene_start, scene_end) in scene_rows {
                let sentences = sentence_stmt
                    .query_map(params![scene_id], |row| {
                        Ok(SentenceSpan {
                            text: row.get(0)?,
                            start_seconds: row.get(1)?,
                            end_seconds: row.get(2)?,
                            order: row.get(3)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                scenes.push(Scene {
                    title: scene_title,
                    start_seconds: scene_start,
                    end_seconds: scene_end,
                    order: scene_order,
                    sentences,
                });
            }

            chapters.push(Chapter {
                title,
                start_seconds,
                end_seconds,
                order,
                scenes,
            });
        }

        Ok(Some(Hierarchy { chapters }))
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<MediaSummary> {
        let rebuilt_at: String = row.get(6)?;
        Ok(MediaSummary {
            media_id: row.get(0)?,
            template: row.get(1)?,
            duration_seconds: row.get(2)?,
            chapter_count: row.get::<_, i64>(3)? as usize,
            scene_count: row.get::<_, i64>(4)? as usize,
            sentence_count: row.get::<_, i64>(5)? as usize,
            rebuilt_at: DateTime::parse_from_rfc3339(&rebuilt_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl HierarchyStore for SqliteHierarchyStore {
    #[instrument(skip(self, transcript, hierarchy), fields(media_id = %transcript.media_id))]
    async fn replace_hierarchy(
        &self,
        transcript: &Transcript,
        template: &str,
        hierarchy: &Hierarchy,
    ) -> Result<RebuildSummary> {
        hierarchy.validate_for(transcript)?;
        let summary = hierarchy.summary();
        let media_id = transcript.media_id.as_str();
        let transcript_json = serde_json::to_string(transcript)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM sentences WHERE scene_id IN (
                SELECT s.id FROM scenes s JOIN chapters c ON s.chapter_id = c.id
                WHERE c.media_id = ?1)",
            params![media_id],
        )?;
        tx.execute(
            "DELETE FROM scenes WHERE chapter_id IN (SELECT id FROM chapters WHERE media_id = ?1)",
            params![media_id],
        )?;
        tx.execute("DELETE FROM chapters WHERE media_id = ?1", params![media_id])?;

        for chapter in &hierarchy.chapters {
            tx.execute(
                "INSERT INTO chapters (media_id, chapter_order, title, start_seconds, end_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    media_id,
                    chapter.order,
                    chapter.title,
                    chapter.start_seconds,
                    chapter.end_seconds
                ],
            )?;
            let chapter_id = tx.last_insert_rowid();

            for scene in &chapter.scenes {
                tx.execute(
                    "INSERT INTO scenes (chapter_id, scene_order, title, start_seconds, end_seconds)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        chapter_id,
                        scene.order,
                        scene.title,
                        scene.start_seconds,
                        scene.end_seconds
                    ],
                )?;
                let scene_id = tx.last_insert_rowid();

                for (i, sentence) in scene.sentences.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO sentences
                         (scene_id, sentence_order, source_order, text, start_seconds, end_seconds)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            scene_id,
                            i as i64 + 1,
                            sentence.order,
                            sentence.text,
                            sentence.start_seconds,
                            sentence.end_seconds
                        ],
                    )?;
                }
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO media
             (media_id, template, duration_seconds, chapter_count, scene_count, sentence_count, rebuilt_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                media_id,
                template,
                transcript.duration_seconds,
                summary.chapter_count as i64,
                summary.scene_count as i64,
                summary.sentence_count as i64,
                now
            ],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO transcripts (media_id, transcript_json, duration_seconds, stored_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![media_id, transcript_json, transcript.duration_seconds, now],
        )?;

        tx.commit()?;
        info!(
            "Rebuilt hierarchy: {} chapters, {} scenes, {} sentences",
            summary.chapter_count, summary.scene_count, summary.sentence_count
        );
        Ok(summary)
    }

    #[instrument(skip(self))]
    async fn get_hierarchy(&self, media_id: &str) -> Result<Option<Hierarchy>> {
        let conn = self.lock()?;
        Self::load_hierarchy(&conn, media_id)
    }

    #[instrument(skip(self))]
    async fn get_transcript(&self, media_id: &str) -> Result<Option<Transcript>> {
        let conn = self.lock()?;

        let json: Option<String> = conn
            .query_row(
                "SELECT transcript_json FROM transcripts WHERE media_id = ?1",
                params![media_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn get_media(&self, media_id: &str) -> Result<Option<MediaSummary>> {
        let conn = self.lock()?;

        let summary = conn
            .query_row(
                "SELECT media_id, template, duration_seconds, chapter_count, scene_count,
                        sentence_count, rebuilt_at
                 FROM media WHERE media_id = ?1",
                params![media_id],
                Self::row_to_summary,
            )
            .optional()?;

        Ok(summary)
    }

    #[instrument(skip(self))]
    async fn list_media(&self) -> Result<Vec<MediaSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT media_id, template, duration_seconds, chapter_count, scene_count,
                    sentence_count, rebuilt_at
             FROM media ORDER BY rebuilt_at DESC",
        )?;
        let media = stmt
            .query_map([], Self::row_to_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(media)
    }

    #[instrument(skip(self))]
    async fn delete_media(&self, media_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM sentences WHERE scene_id IN (
                SELECT s.id FROM scenes s JOIN chapters c ON s.chapter_id = c.id
                WHERE c.media_id = ?1)",
            params![media_id],
        )?;
        tx.execute(
            "DELETE FROM scenes WHERE chapter_id IN (SELECT id FROM chapters WHERE media_id = ?1)",
            params![media_id],
        )?;
        tx.execute("DELETE FROM chapters WHERE media_id = ?1", params![media_id])?;
        tx.execute("DELETE FROM transcripts WHERE media_id = ?1", params![media_id])?;
        let deleted = tx.execute("DELETE FROM media WHERE media_id = ?1", params![media_id])?;

        tx.commit()?;
        debug!("Deleted media {} ({} rows)", media_id, deleted);
        Ok(deleted > 0)
    }
}

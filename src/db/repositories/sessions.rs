use anyhow::{Context, Result};
use log::warn;
use rusqlite::Connection;

use super::roster::load_students;
use crate::db::{
    helpers::{read_json, read_value, write_json, Blob},
    Database, KEY_CURRENT_USER_ID, KEY_SESSIONS, KEY_STUDENTS,
};
use crate::models::{SessionRecord, Student};

fn load_sessions(conn: &Connection) -> Result<Vec<SessionRecord>> {
    match read_json::<Vec<SessionRecord>>(conn, KEY_SESSIONS)? {
        Blob::Parsed(sessions) => Ok(sessions),
        Blob::Missing => Ok(Vec::new()),
        Blob::Corrupt(err) => {
            warn!("Session log is unreadable ({err}); starting a fresh log");
            write_json(conn, KEY_SESSIONS, &Vec::<SessionRecord>::new())?;
            Ok(Vec::new())
        }
    }
}

fn append_session(conn: &Connection, record: SessionRecord) -> Result<()> {
    let mut sessions = load_sessions(conn)?;
    sessions.push(record);
    write_json(conn, KEY_SESSIONS, &sessions)
}

impl Database {
    pub async fn get_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.execute(|conn| load_sessions(conn)).await
    }

    /// Append a finished session to the log. Entries are never edited.
    pub async fn save_session(&self, record: SessionRecord) -> Result<()> {
        self.execute(move |conn| append_session(conn, record))
            .await
    }

    /// Apply `update` to the signed-in student and append `record`, committing
    /// both or neither. Returns `None` without writing when nobody is signed in.
    pub async fn record_session_for_current_user<F, R>(
        &self,
        record: SessionRecord,
        update: F,
    ) -> Result<Option<R>>
    where
        F: FnOnce(&mut Student) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open session transaction")?;

            let Some(current_id) = read_value(&tx, KEY_CURRENT_USER_ID)? else {
                return Ok(None);
            };
            let mut students = load_students(&tx)?;
            let Some(student) = students.iter_mut().find(|student| student.id == current_id)
            else {
                return Ok(None);
            };

            let result = update(student);
            write_json(&tx, KEY_STUDENTS, &students)?;

            append_session(&tx, record)?;

            tx.commit().context("failed to commit session")?;
            Ok(Some(result))
        })
        .await
    }

    pub async fn sessions_for_partner(&self, partner_id: &str) -> Result<Vec<SessionRecord>> {
        let partner_id = partner_id.to_string();
        Ok(self
            .get_sessions()
            .await?
            .into_iter()
            .filter(|record| record.partner_id == partner_id)
            .collect())
    }
}

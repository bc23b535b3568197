use anyhow::Result;
use log::warn;
use rusqlite::Connection;

use crate::db::{
    helpers::{read_json, read_value, remove_value, write_json, write_value, Blob},
    seed, Database, KEY_CURRENT_USER_ID, KEY_SESSIONS, KEY_STUDENTS,
};
use crate::models::Student;

/// Load the roster, replacing an unreadable blob with the seed roster.
pub(super) fn load_students(conn: &Connection) -> Result<Vec<Student>> {
    match read_json::<Vec<Student>>(conn, KEY_STUDENTS)? {
        Blob::Parsed(students) => Ok(students),
        Blob::Missing => Ok(Vec::new()),
        Blob::Corrupt(err) => {
            warn!("Roster blob is unreadable ({err}); resetting to seed roster");
            let students = seed::students();
            write_json(conn, KEY_STUDENTS, &students)?;
            Ok(students)
        }
    }
}

fn load_current_user(conn: &Connection) -> Result<Option<Student>> {
    let Some(id) = read_value(conn, KEY_CURRENT_USER_ID)? else {
        return Ok(None);
    };

    Ok(load_students(conn)?
        .into_iter()
        .find(|student| student.id == id))
}

impl Database {
    /// Seed the roster and an empty session log if either key is absent.
    pub async fn init_defaults(&self) -> Result<()> {
        self.execute(|conn| {
            if read_value(conn, KEY_STUDENTS)?.is_none() {
                write_json(conn, KEY_STUDENTS, &seed::students())?;
            }
            if read_value(conn, KEY_SESSIONS)?.is_none() {
                write_value(conn, KEY_SESSIONS, "[]")?;
            }
            Ok(())
        })
        .await
    }

    pub async fn get_students(&self) -> Result<Vec<Student>> {
        self.execute(|conn| load_students(conn)).await
    }

    /// Replace the whole roster in one write.
    pub async fn replace_students(&self, students: Vec<Student>) -> Result<()> {
        self.execute(move |conn| write_json(conn, KEY_STUDENTS, &students))
            .await
    }

    /// The signed-in student, or `None` when nobody is signed in or the stored
    /// id no longer names a roster entry.
    pub async fn get_current_user(&self) -> Result<Option<Student>> {
        self.execute(|conn| load_current_user(conn)).await
    }

    pub async fn set_current_user(&self, student_id: &str) -> Result<Option<Student>> {
        let student_id = student_id.to_string();
        self.execute(move |conn| {
            let found = load_students(conn)?
                .into_iter()
                .find(|student| student.id == student_id);
            if found.is_some() {
                write_value(conn, KEY_CURRENT_USER_ID, &student_id)?;
            }
            Ok(found)
        })
        .await
    }

    /// Write a student back wholesale (replacing by id, appending when new) and
    /// make them the current user. Last writer wins.
    pub async fn update_user(&self, student: Student) -> Result<()> {
        self.execute(move |conn| {
            let mut students = load_students(conn)?;
            match students.iter_mut().find(|existing| existing.id == student.id) {
                Some(slot) => *slot = student.clone(),
                None => students.push(student.clone()),
            }
            write_json(conn, KEY_STUDENTS, &students)?;
            write_value(conn, KEY_CURRENT_USER_ID, &student.id)
        })
        .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.execute(|conn| remove_value(conn, KEY_CURRENT_USER_ID))
            .await
    }

    /// Roster ordered by points, highest first; ties keep roster order.
    pub async fn leaderboard(&self) -> Result<Vec<Student>> {
        let mut students = self.get_students().await?;
        students.sort_by(|a, b| b.points.cmp(&a.points));
        Ok(students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init_defaults().await.unwrap();
        db
    }

    #[tokio::test]
    async fn init_seeds_roster_once() {
        let db = seeded().await;
        let students = db.get_students().await.unwrap();
        assert_eq!(students.len(), 4);

        let mut trimmed = students;
        trimmed.truncate(1);
        db.replace_students(trimmed).await.unwrap();
        db.init_defaults().await.unwrap();

        assert_eq!(db.get_students().await.unwrap().len(), 1);
        assert_eq!(db.get_sessions().await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn current_user_absent_until_set() {
        let db = seeded().await;
        assert!(db.get_current_user().await.unwrap().is_none());

        let priya = db.set_current_user("s2").await.unwrap().unwrap();
        assert_eq!(priya.name, "Priya Sharma");
        assert_eq!(db.get_current_user().await.unwrap().unwrap().id, "s2");

        assert!(db.set_current_user("nobody").await.unwrap().is_none());
        assert_eq!(db.get_current_user().await.unwrap().unwrap().id, "s2");

        db.logout().await.unwrap();
        assert!(db.get_current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_user_replaces_or_appends() {
        let db = seeded().await;

        let mut alex = db.set_current_user("s1").await.unwrap().unwrap();
        alex.points = 9999;
        db.update_user(alex).await.unwrap();

        let newcomer = Student::new_profile("Dana", "State Tech", "CS", vec![], vec![]);
        let newcomer_id = newcomer.id.clone();
        db.update_user(newcomer).await.unwrap();

        let students = db.get_students().await.unwrap();
        assert_eq!(students.len(), 5);
        assert_eq!(students[0].points, 9999);
        assert_eq!(students[4].id, newcomer_id);
        assert_eq!(db.get_current_user().await.unwrap().unwrap().id, newcomer_id);
    }

    #[tokio::test]
    async fn corrupt_roster_resets_to_seed() {
        let db = seeded().await;
        db.set_value(KEY_STUDENTS, "{not json".into()).await.unwrap();

        let students = db.get_students().await.unwrap();
        assert_eq!(students.len(), 4);
        assert_eq!(students[0].id, "s1");

        let raw = db.get_value(KEY_STUDENTS).await.unwrap().unwrap();
        assert!(raw.starts_with('['));
    }

    #[tokio::test]
    async fn leaderboard_orders_by_points() {
        let db = seeded().await;
        let ranked: Vec<String> = db
            .leaderboard()
            .await
            .unwrap()
            .into_iter()
            .map(|student| student.id)
            .collect();

        assert_eq!(ranked, vec!["s2", "s1", "s3", "s4"]);
    }
}

use skillboard_types::{NewSkill, Skill, SkillId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::PersistenceError;

/// List, create and delete operations on the `skill` table
#[derive(Clone)]
pub struct SkillRepository {
    pool: SqlitePool,
}

impl SkillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All skills ordered by ascending id; empty when the table has no rows
    pub async fn list(&self) -> Result<Vec<Skill>, PersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT skill_id, name, description
            FROM skill
            ORDER BY skill_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(PersistenceError::Query)?;

        rows.iter()
            .map(skill_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(PersistenceError::Query)
    }

    /// Insert a skill and return the row as persisted
    pub async fn create(&self, skill: &NewSkill) -> Result<Skill, PersistenceError> {
        let result = sqlx::query(
            r#"
            INSERT INTO skill (name, description)
            VALUES (?, ?)
            "#,
        )
        .bind(&skill.name)
        .bind(&skill.description)
        .execute(&self.pool)
        .await
        .map_err(PersistenceError::Insert)?;

        let skill_id = result.last_insert_rowid();
        debug!("Inserted skill {}", skill_id);

        // Re-read so the response reflects stored values rather than the request
        let row = sqlx::query(
            r#"
            SELECT skill_id, name, description
            FROM skill
            WHERE skill_id = ?
            "#,
        )
        .bind(skill_id)
        .fetch_one(&self.pool)
        .await
        .map_err(PersistenceError::Lookup)?;

        skill_from_row(&row).map_err(PersistenceError::Lookup)
    }

    /// Delete by id, then return the remaining skills.
    ///
    /// A missing id is not an error.
    pub async fn delete(&self, skill_id: SkillId) -> Result<Vec<Skill>, PersistenceError> {
        let result = sqlx::query("DELETE FROM skill WHERE skill_id = ?")
            .bind(skill_id)
            .execute(&self.pool)
            .await
            .map_err(PersistenceError::Delete)?;

        debug!(
            "Deleted skill {} ({} rows affected)",
            skill_id,
            result.rows_affected()
        );

        self.list().await
    }
}

fn skill_from_row(row: &SqliteRow) -> Result<Skill, sqlx::Error> {
    Ok(Skill {
        skill_id: row.try_get("skill_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

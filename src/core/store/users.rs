use anyhow::Result;
use rusqlite::params;

use super::Store;
use super::types::UserRecord;

impl Store {
    /// Insert-or-refresh a user by email. Role is only set on first
    /// insert so a later login cannot demote or promote an account.
    pub async fn upsert_user(&self, email: &str, name: &str, role: &str) -> Result<UserRecord> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO users (email, name, role) VALUES (?1, ?2, ?3)
             ON CONFLICT(email) DO UPDATE SET name = excluded.name",
            params![email, name, role],
        )?;
        let mut stmt = db.prepare(
            "SELECT id, email, name, role, created_at FROM users WHERE email = ?1",
        )?;
        let user = stmt.query_row(params![email], |row| {
            Ok(UserRecord {
                id: row.get(0)?,
                email: row.get(1)?,
                name: row.get(2)?,
                role: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(user)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let db = self.db.lock().await;
        let count = db.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_keeps_original_role() {
        let store = Store::open_in_memory().unwrap();
        let first = store
            .upsert_user("op@example.com", "Operator", "admin")
            .await
            .unwrap();
        assert_eq!(first.role, "admin");

        let second = store
            .upsert_user("op@example.com", "Operator Renamed", "member")
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Operator Renamed");
        assert_eq!(second.role, "admin");
        assert_eq!(store.count_users().await.unwrap(), 1);
    }
}

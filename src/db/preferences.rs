use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::warn;

const THEME_KEY: &str = "app_theme";

/// Cosmetic light/dark preference. Has no bearing on todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Kitty,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Kitty => "Kitty",
            Theme::Dark => "Dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Kitty => Theme::Dark,
            Theme::Dark => Theme::Kitty,
        }
    }
}

pub async fn load_theme(db: &SqlitePool) -> Result<Theme, sqlx::Error> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM preferences WHERE key = ?")
        .bind(THEME_KEY)
        .fetch_optional(db)
        .await?;

    Ok(match value.as_deref() {
        None => Theme::default(),
        Some("Kitty") => Theme::Kitty,
        Some("Dark") => Theme::Dark,
        Some(other) => {
            warn!("ignoring unknown stored theme: {}", other);
            Theme::default()
        }
    })
}

pub async fn save_theme(db: &SqlitePool, theme: Theme) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO preferences (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(THEME_KEY)
    .bind(theme.as_str())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn toggle_theme(db: &SqlitePool) -> Result<Theme, sqlx::Error> {
    let theme = load_theme(db).await?.toggled();
    save_theme(db, theme).await?;
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn theme_defaults_and_toggles() {
        let pool = db::connect_in_memory().await.expect("Failed to create test db");

        assert_eq!(load_theme(&pool).await.unwrap(), Theme::Kitty);
        assert_eq!(toggle_theme(&pool).await.unwrap(), Theme::Dark);
        assert_eq!(load_theme(&pool).await.unwrap(), Theme::Dark);
        assert_eq!(toggle_theme(&pool).await.unwrap(), Theme::Kitty);
    }

    #[tokio::test]
    async fn unknown_stored_theme_falls_back_to_default() {
        let pool = db::connect_in_memory().await.expect("Failed to create test db");
        sqlx::query("INSERT INTO preferences (key, value) VALUES ('app_theme', 'Neon')")
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(load_theme(&pool).await.unwrap(), Theme::Kitty);
    }
}

use sqlx::SqlitePool;

use crate::models::todo::normalize_due_date;
use crate::models::{NewTodoRequest, Status, Todo, UpdateTodoRequest};

const SELECT_TODOS: &str = r#"
    SELECT
        id,
        COALESCE(name, '') AS name,
        COALESCE(description, '') AS description,
        dueDate,
        completedAt,
        COALESCE(status, 'waiting') AS status
    FROM todos
"#;

pub async fn fetch_todos(db: &SqlitePool) -> Result<Vec<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!("{} ORDER BY id", SELECT_TODOS))
        .fetch_all(db)
        .await
}

pub async fn find_todo_by_id(db: &SqlitePool, id: i64) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!("{} WHERE id = ?", SELECT_TODOS))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// New rows always start out `waiting`.
pub async fn insert_todo(db: &SqlitePool, req: NewTodoRequest) -> Result<Todo, sqlx::Error> {
    let due_date = normalize_due_date(req.due_date);
    let status = Status::Waiting;

    let id = sqlx::query(
        r#"
        INSERT INTO todos (name, description, dueDate, status)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&due_date)
    .bind(status)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Todo {
        id,
        name: req.name,
        description: req.description,
        due_date,
        completed_at: None,
        status,
    })
}

/// Replaces every mutable field. Returns false when no row has `id`.
pub async fn update_todo(
    db: &SqlitePool,
    id: i64,
    req: UpdateTodoRequest,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE todos
        SET name = ?1,
            description = ?2,
            dueDate = ?3,
            status = ?4
        WHERE id = ?5
        "#,
    )
    .bind(req.name)
    .bind(req.description)
    .bind(normalize_due_date(req.due_date))
    .bind(req.status)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn complete_todo(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE todos SET status = ?1 WHERE id = ?2")
        .bind(Status::Completed)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn delete_todo(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Deletes every completed or canceled row and reports how many went.
pub async fn clear_finished(db: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE status IN (?1, ?2)")
        .bind(Status::Completed)
        .bind(Status::Canceled)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn setup_test_db() -> SqlitePool {
        db::connect_in_memory()
            .await
            .expect("Failed to create test db")
    }

    fn new_todo(name: &str, due_date: Option<&str>) -> NewTodoRequest {
        NewTodoRequest {
            name: name.to_string(),
            description: String::new(),
            due_date: due_date.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_todo() {
        let pool = setup_test_db().await;

        let todo = insert_todo(&pool, new_todo("Buy milk", Some("2025-03-01")))
            .await
            .expect("Failed to insert todo");
        assert_eq!(todo.status, Status::Waiting);
        assert!(todo.id > 0);

        let todos = fetch_todos(&pool).await.expect("Failed to fetch todos");
        assert_eq!(todos, vec![todo]);
    }

    #[tokio::test]
    async fn test_blank_due_date_is_stored_as_null() {
        let pool = setup_test_db().await;

        let todo = insert_todo(&pool, new_todo("Call mom", Some("   ")))
            .await
            .expect("Failed to insert todo");

        let stored = find_todo_by_id(&pool, todo.id)
            .await
            .expect("Failed to fetch todo")
            .expect("Todo not found");
        assert_eq!(stored.due_date, None);
    }

    #[tokio::test]
    async fn test_update_todo_replaces_fields() {
        let pool = setup_test_db().await;
        let todo = insert_todo(&pool, new_todo("Buy milk", None))
            .await
            .expect("Failed to insert todo");

        let update = UpdateTodoRequest {
            name: "Buy oat milk".to_string(),
            description: "the barista one".to_string(),
            due_date: Some("2025-04-10".to_string()),
            status: Status::InProgress,
        };
        let updated = update_todo(&pool, todo.id, update)
            .await
            .expect("Failed to update todo");
        assert!(updated);

        let stored = find_todo_by_id(&pool, todo.id)
            .await
            .expect("Failed to fetch todo")
            .expect("Todo not found");
        assert_eq!(stored.name, "Buy oat milk");
        assert_eq!(stored.description, "the barista one");
        assert_eq!(stored.due_date.as_deref(), Some("2025-04-10"));
        assert_eq!(stored.status, Status::InProgress);
    }

    #[tokio::test]
    async fn test_writes_on_unknown_id_are_noops() {
        let pool = setup_test_db().await;
        insert_todo(&pool, new_todo("Buy milk", None))
            .await
            .expect("Failed to insert todo");

        let update = UpdateTodoRequest {
            name: "Ghost".to_string(),
            description: String::new(),
            due_date: None,
            status: Status::Urgent,
        };
        assert!(!update_todo(&pool, 999, update).await.unwrap());
        assert!(!complete_todo(&pool, 999).await.unwrap());
        assert!(!delete_todo(&pool, 999).await.unwrap());
        assert_eq!(fetch_todos(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_todo_sets_status_only() {
        let pool = setup_test_db().await;
        let todo = insert_todo(&pool, new_todo("Buy milk", Some("2025-03-01")))
            .await
            .expect("Failed to insert todo");

        assert!(complete_todo(&pool, todo.id).await.unwrap());

        let stored = find_todo_by_id(&pool, todo.id).await.unwrap().unwrap();
        assert_eq!(stored.status, Status::Completed);
        assert_eq!(stored.name, todo.name);
        assert_eq!(stored.due_date, todo.due_date);
    }

    #[tokio::test]
    async fn test_clear_finished_keeps_open_tasks() {
        let pool = setup_test_db().await;
        for (name, status) in [
            ("a", Status::Waiting),
            ("b", Status::InProgress),
            ("c", Status::Completed),
            ("d", Status::Canceled),
            ("e", Status::Urgent),
        ] {
            let todo = insert_todo(&pool, new_todo(name, None)).await.unwrap();
            let update = UpdateTodoRequest {
                name: name.to_string(),
                description: String::new(),
                due_date: None,
                status,
            };
            update_todo(&pool, todo.id, update).await.unwrap();
        }

        let removed = clear_finished(&pool).await.unwrap();
        assert_eq!(removed, 2);

        let remaining: Vec<Status> = fetch_todos(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.status)
            .collect();
        assert_eq!(
            remaining,
            vec![Status::Waiting, Status::InProgress, Status::Urgent]
        );
    }

    #[tokio::test]
    async fn test_store_rejects_unknown_status() {
        let pool = setup_test_db().await;
        let todo = insert_todo(&pool, new_todo("Buy milk", None)).await.unwrap();

        let result = sqlx::query("UPDATE todos SET status = ?1 WHERE id = ?2")
            .bind("done")
            .bind(todo.id)
            .execute(&pool)
            .await;
        assert!(result.is_err());

        let stored = find_todo_by_id(&pool, todo.id).await.unwrap().unwrap();
        assert_eq!(stored.status, Status::Waiting);
    }
}

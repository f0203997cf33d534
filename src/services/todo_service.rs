use chrono::Utc;
use sea_orm::Set;
use uuid::Uuid;

use crate::{db::dao::TodoDao, db::entities::todo, error::AppError};

/// One method per operation. The operation set is fixed, so this type
/// is the whole dispatch table: routes call these methods directly.
#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao) -> Self {
        Self { todo_dao }
    }

    pub async fn create(&self, title: &str, description: &str) -> Result<todo::Model, AppError> {
        let model = todo::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            is_completed: Set(false),
            created_at: Set(Utc::now().fixed_offset()),
            completed_at: Set(None),
        };
        Ok(self.todo_dao.insert(model).await?)
    }

    pub async fn get(&self, id: &Uuid) -> Result<todo::Model, AppError> {
        self.todo_dao
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))
    }

    pub async fn list(&self) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.todo_dao.list_all().await?)
    }

    pub async fn update(
        &self,
        id: &Uuid,
        title: &str,
        description: &str,
        is_completed: bool,
    ) -> Result<todo::Model, AppError> {
        let current = self.get(id).await?;
        let active = merge_update(&current, title, description, is_completed);
        Ok(self.todo_dao.save(active).await?)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let deleted = self.todo_dao.delete_by_id(id).await?;
        if !deleted {
            return Err(AppError::not_found("Todo not found"));
        }
        Ok(())
    }
}

/// Title and description are overwritten unconditionally. Completion is
/// monotonic: only the false-to-true transition touches `is_completed`
/// and stamps `completed_at`; a request to un-complete leaves both
/// fields as they are.
fn merge_update(
    current: &todo::Model,
    title: &str,
    description: &str,
    is_completed: bool,
) -> todo::ActiveModel {
    let mut active: todo::ActiveModel = current.clone().into();
    active.title = Set(title.to_string());
    active.description = Set(description.to_string());
    if is_completed && !current.is_completed {
        active.is_completed = Set(true);
        active.completed_at = Set(Some(Utc::now().fixed_offset()));
    }
    active
}

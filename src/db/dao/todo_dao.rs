use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use super::DaoResult;
use crate::db::entities::prelude::Todo;
use crate::db::entities::todo;

/// Persistence gateway for `todos`. Handlers own the business rules;
/// this layer only moves rows. Absence is reported as `None`, never as
/// an error.
#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl TodoDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn insert(&self, model: todo::ActiveModel) -> DaoResult<todo::Model> {
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_by_id(&self, id: &Uuid) -> DaoResult<Option<todo::Model>> {
        Ok(Todo::find_by_id(*id).one(&self.db).await?)
    }

    /// Every row, in storage-native order. No sort is promised to
    /// callers.
    pub async fn list_all(&self) -> DaoResult<Vec<todo::Model>> {
        Ok(Todo::find().all(&self.db).await?)
    }

    pub async fn save(&self, model: todo::ActiveModel) -> DaoResult<todo::Model> {
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_by_id(&self, id: &Uuid) -> DaoResult<bool> {
        let result = Todo::delete_by_id(*id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

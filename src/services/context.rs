use sea_orm::DatabaseConnection;

use crate::{db::dao::TodoDao, services::todo_service::TodoService, state::AppState};

#[derive(Clone)]
pub struct ServiceContext {
    db: DatabaseConnection,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn todo(&self) -> TodoService {
        TodoService::new(TodoDao::new(&self.db))
    }
}

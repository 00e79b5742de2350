use crate::entity::session;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: i32,
    pub session_token: String,
    pub ip_address: String,
    pub user_agent: String,
    pub expires_at: DateTime<Utc>,
}

#[tracing::instrument(skip_all)]
pub async fn save<C: ConnectionTrait>(db: &C, new: NewSession) -> Result<session::Model, DbErr> {
    let new_session = session::ActiveModel {
        user_id: Set(new.user_id),
        session_token: Set(new.session_token),
        ip_address: Set(new.ip_address),
        user_agent: Set(new.user_agent),
        expires_at: Set(new.expires_at),
        ..Default::default()
    };
    new_session.insert(db).await
}

#[tracing::instrument(skip_all)]
pub async fn find_by_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Option<session::Model>, DbErr> {
    session::Entity::find()
        .filter(session::Column::SessionToken.eq(token))
        .one(db)
        .await
}

#[tracing::instrument(skip_all)]
pub async fn find_by_user_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<session::Model>, DbErr> {
    session::Entity::find()
        .filter(session::Column::UserId.eq(user_id))
        .all(db)
        .await
}

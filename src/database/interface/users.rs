use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter,
};

use crate::database::{
    entities::users::{self, StoredSessionToken, StoredSessionTokens},
    interface::DbResult,
};

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> DbResult<Option<users::Model>> {
    users::Entity::find_by_id(id).one(db).await
}

pub async fn find_by_external_identity(
    db: &DatabaseConnection,
    external_identity_id: &str,
) -> DbResult<Option<users::Model>> {
    users::Entity::find()
        .filter(users::Column::ExternalIdentityId.eq(external_identity_id))
        .one(db)
        .await
}

pub async fn create(
    db: &DatabaseConnection,
    external_identity_id: Option<String>,
    display_name: String,
    is_superuser: bool,
) -> DbResult<users::Model> {
    users::ActiveModel {
        id: NotSet,
        external_identity_id: Set(external_identity_id),
        display_name: Set(display_name),
        is_superuser: Set(is_superuser),
        session_tokens: Set(StoredSessionTokens::default()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
}

/// Appends a freshly-issued encrypted session token to the user's token
/// list (spec.md §4.7 resolve/rotate path).
pub async fn add_session_token(
    db: &DatabaseConnection,
    user: users::Model,
    ciphertext: String,
) -> DbResult<users::Model> {
    let mut tokens = user.session_tokens.clone();
    tokens.0.push(StoredSessionToken {
        ciphertext,
        issued_at: Utc::now(),
    });

    let mut model = user.into_active_model();
    model.session_tokens = Set(tokens);
    model.update(db).await
}

/// Replaces one stored token (identified by its ciphertext) with a freshly
/// issued one, used when `resolve` finds an expired token to rotate.
pub async fn replace_session_token(
    db: &DatabaseConnection,
    user: users::Model,
    old_ciphertext: &str,
    new_ciphertext: String,
) -> DbResult<users::Model> {
    let mut tokens = user.session_tokens.clone();
    for token in tokens.0.iter_mut() {
        if token.ciphertext == old_ciphertext {
            token.ciphertext = new_ciphertext.clone();
            token.issued_at = Utc::now();
        }
    }

    let mut model = user.into_active_model();
    model.session_tokens = Set(tokens);
    model.update(db).await
}

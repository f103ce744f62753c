use crate::domain::user::{NewUser, User, UserId};
use crate::error::AppError;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize)]
pub(crate) struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<ObjectId>,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl fmt::Debug for UserDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDocument")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl From<NewUser> for UserDocument {
    fn from(user: NewUser) -> Self {
        Self { id: None, username: user.username, email: user.email, password: user.password }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = AppError;

    fn try_from(document: UserDocument) -> Result<Self, Self::Error> {
        let id = document.id.ok_or_else(|| AppError::Persistence("user document has no _id".into()))?;
        Ok(Self {
            id: UserId::from(id.to_hex()),
            username: document.username,
            email: document.email,
            password: document.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn test_new_document_omits_id() {
        let document = UserDocument::from(NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "secret".into(),
        });
        let bson = bson::to_document(&document).unwrap();

        assert!(!bson.contains_key("_id"));
        assert_eq!(bson.get_str("username").unwrap(), "alice");
    }

    #[test]
    fn test_stored_document_converts_to_user() {
        let oid = ObjectId::new();
        let stored = doc! { "_id": oid, "username": "bob", "email": "bob@example.com", "password": "pw" };
        let document: UserDocument = bson::from_document(stored).unwrap();
        let user = User::try_from(document).unwrap();

        assert_eq!(user.id.as_str(), oid.to_hex());
        assert_eq!(user.username, "bob");
    }

    #[test]
    fn test_document_without_id_is_rejected() {
        let document = UserDocument { id: None, username: "x".into(), email: "y".into(), password: "z".into() };
        assert!(matches!(User::try_from(document), Err(AppError::Persistence(_))));
    }
}

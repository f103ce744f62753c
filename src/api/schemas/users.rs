use crate::domain::{NewUser, User};
use crate::error::AppError;
use crate::proto::agro::v1 as proto;

impl From<User> for proto::User {
    fn from(user: User) -> Self {
        Self { id: user.id.into_inner(), username: user.username, email: user.email }
    }
}

impl From<User> for proto::GetUserByIdResponse {
    fn from(user: User) -> Self {
        Self { id: user.id.into_inner(), username: user.username, email: user.email }
    }
}

fn require(value: String, field: &'static str) -> Result<String, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::MissingField(field));
    }
    Ok(value)
}

impl TryFrom<proto::CreateUserRequest> for NewUser {
    type Error = AppError;

    fn try_from(req: proto::CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            username: require(req.username, "username")?,
            email: require(req.email, "email")?,
            password: require(req.password, "password")?,
        })
    }
}

use crate::domain::{NewUser, UserPatch};
use crate::error::AppError;
use crate::proto::agro::v1::{self as proto, user_service_server::UserService as UserRpc};
use crate::services::user_service::UserService;
use tonic::{Request, Response, Status};

/// gRPC front end for [`UserService`].
#[derive(Clone, Debug)]
pub struct UserHandler {
    user_service: UserService,
}

impl UserHandler {
    #[must_use]
    pub const fn new(user_service: UserService) -> Self {
        Self { user_service }
    }
}

#[tonic::async_trait]
impl UserRpc for UserHandler {
    async fn create_user(
        &self,
        request: Request<proto::CreateUserRequest>,
    ) -> Result<Response<proto::CreateUserResponse>, Status> {
        let user = NewUser::try_from(request.into_inner())?;
        let id = self.user_service.create(user).await?;

        Ok(Response::new(proto::CreateUserResponse {
            id: id.into_inner(),
            message: "User created successfully".into(),
        }))
    }

    async fn get_user_by_id(
        &self,
        request: Request<proto::GetUserByIdRequest>,
    ) -> Result<Response<proto::GetUserByIdResponse>, Status> {
        let id = request.into_inner().id;
        let user = self.user_service.get(&id).await?.ok_or(AppError::NotFound)?;

        Ok(Response::new(user.into()))
    }

    async fn get_users(
        &self,
        request: Request<proto::GetUsersRequest>,
    ) -> Result<Response<proto::GetUsersResponse>, Status> {
        let req = request.into_inner();
        let users = self.user_service.list(req.page_number, req.page_size).await?;

        Ok(Response::new(proto::GetUsersResponse { users: users.into_iter().map(Into::into).collect() }))
    }

    async fn update_user(
        &self,
        request: Request<proto::UpdateUserRequest>,
    ) -> Result<Response<proto::UpdateUserResponse>, Status> {
        let proto::UpdateUserRequest { id, username, email } = request.into_inner();
        self.user_service.update(&id, UserPatch { username, email }).await?;

        Ok(Response::new(proto::UpdateUserResponse { message: "User updated successfully".into() }))
    }

    async fn delete_user(
        &self,
        request: Request<proto::DeleteUserRequest>,
    ) -> Result<Response<proto::DeleteUserResponse>, Status> {
        let id = request.into_inner().id;
        self.user_service.delete(&id).await?;

        Ok(Response::new(proto::DeleteUserResponse { message: "User deleted successfully".into() }))
    }
}

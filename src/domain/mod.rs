pub mod page;
pub mod repository;
pub mod user;

pub use page::Page;
pub use repository::{Entity, Repository};
pub use user::{NewUser, User, UserId, UserPatch};

pub type UserRepository = dyn Repository<User>;

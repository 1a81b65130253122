pub mod role;
pub mod user;

pub use role::PostgresRoleRepository;
pub use user::PostgresUserRepository;

pub mod task;
pub mod user;

pub use task::{
    CreateTaskRequest, ListTasksQuery, Task, TaskFilter, TaskPriority, TaskStats,
    UpdateTaskRequest,
};
pub use user::{UpdatePasswordRequest, UpdateProfileRequest, User, UserProfile};

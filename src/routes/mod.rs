pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Routes mounted under the `/api` scope. `/user/register` and `/user/login`
/// are public; everything else is guarded by the auth middleware wrapping the
/// scope.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(users::register)
            .service(users::login)
            .service(users::me)
            .service(users::update_profile)
            .service(users::update_password),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}

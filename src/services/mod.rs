pub mod dispatcher;
pub mod lifecycle;
pub mod todo_service;

pub use dispatcher::ReminderDispatcher;
pub use lifecycle::ReminderPolicy;
pub use todo_service::TodoService;

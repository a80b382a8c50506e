pub mod reminder;
pub mod todo;

pub use reminder::{Every, Reminder, ReminderSchedule};
pub use todo::{NewTodoRequest, Status, Todo, TodoDetails, UpdateTodoRequest};

pub mod pomodoro;
pub mod project_ops;
pub mod reminder;
pub mod stats;
pub mod streak;
pub mod task_ops;
pub mod view;

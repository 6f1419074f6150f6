pub mod failures;
pub mod task_group;

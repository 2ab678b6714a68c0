use crate::{command::StataCommand, error::Result, types::Task};

/// The callable the host runs in the execute phase of a task
pub trait TaskFunction: Send + Sync {
    fn call(&self, task: &Task) -> Result<()>;

    /// The command `call` would run, if the function runs one
    fn preview(&self, _task: &Task) -> Result<Option<StataCommand>> {
        Ok(None)
    }
}

//! Explicit task registration.
//!
//! Tasks are registered programmatically with their descriptor; there is no
//! runtime discovery. A registry is populated during bootstrap and read-only
//! afterwards.

use crate::descriptor::TaskDescriptor;
use crate::error::ScheduleError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// A unit of scheduled work.
///
/// Implementations must be cheap to share; one instance serves every fire of
/// its task.
pub trait ScheduledTask: Send + Sync + 'static {
    /// Runs one fire of the task.
    fn run(&self) -> BoxFuture<'static, Result<(), Box<dyn std::error::Error + Send + Sync>>>;
}

// Closure adapter so simple tasks don't need a struct.
struct FnTask<F>(F);

impl<F> ScheduledTask for FnTask<F>
where
    F: Fn() -> BoxFuture<'static, Result<(), Box<dyn std::error::Error + Send + Sync>>>
        + Send
        + Sync
        + 'static,
{
    fn run(&self) -> BoxFuture<'static, Result<(), Box<dyn std::error::Error + Send + Sync>>> {
        (self.0)()
    }
}

#[derive(Clone)]
pub(crate) struct RegisteredTask {
    pub(crate) descriptor: TaskDescriptor,
    pub(crate) task: Arc<dyn ScheduledTask>,
}

/// The set of registered tasks and their descriptors.
#[derive(Default)]
pub struct TaskRegistry {
    entries: Vec<RegisteredTask>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task under its descriptor.
    ///
    /// Duplicate names are a boot-time configuration error.
    pub fn register(
        &mut self,
        descriptor: TaskDescriptor,
        task: Arc<dyn ScheduledTask>,
    ) -> Result<(), ScheduleError> {
        if self.entries.iter().any(|e| e.descriptor.name == descriptor.name) {
            return Err(ScheduleError::DuplicateTaskName(descriptor.name));
        }
        self.entries.push(RegisteredTask { descriptor, task });
        Ok(())
    }

    /// Registers a closure-backed task.
    pub fn register_fn<F>(
        &mut self,
        descriptor: TaskDescriptor,
        f: F,
    ) -> Result<(), ScheduleError>
    where
        F: Fn() -> BoxFuture<'static, Result<(), Box<dyn std::error::Error + Send + Sync>>>
            + Send
            + Sync
            + 'static,
    {
        self.register(descriptor, Arc::new(FnTask(f)))
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registered descriptors, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// Entries sorted for the discovery log: priority descending, then name.
    pub(crate) fn ordered_entries(&self) -> Vec<RegisteredTask> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| {
            b.descriptor
                .priority
                .cmp(&a.descriptor.priority)
                .then_with(|| a.descriptor.name.cmp(&b.descriptor.name))
        });
        entries
    }
}

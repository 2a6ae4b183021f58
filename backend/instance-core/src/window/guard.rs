use crate::window::system::WindowSystem;

use log::warn;

/// Input-queue attachment between two threads, detached on drop.
///
/// If the attach call fails the guard is inert and drop does nothing, so every
/// successful attach is paired with exactly one detach.
pub struct ThreadInputGuard<'a, S: WindowSystem + ?Sized> {
    system: &'a S,
    from: u32,
    to: u32,
    attached: bool,
}

impl<'a, S: WindowSystem + ?Sized> ThreadInputGuard<'a, S> {
    pub fn attach(system: &'a S, from: u32, to: u32) -> Self {
        let attached = match system.attach_thread_input(from, to, true) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to attach input of thread {from} to {to}: {e}");
                false
            }
        };

        Self {
            system,
            from,
            to,
            attached,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl<S: WindowSystem + ?Sized> Drop for ThreadInputGuard<'_, S> {
    fn drop(&mut self) {
        if !self.attached {
            return;
        }
        if let Err(e) = self.system.attach_thread_input(self.from, self.to, false) {
            warn!(
                "Failed to detach input of thread {} from {}: {e}",
                self.from, self.to
            );
        }
    }
}

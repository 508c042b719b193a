use std::ops::{Deref, DerefMut};

use parking_lot::{Mutex, MutexGuard};

/// État de service capable d'ouvrir et de fermer une transaction.
pub trait Evented {
    fn start_transaction(&mut self);
    fn finish_transaction(&mut self);
}

/// Verrou d'un service dont la section critique est une transaction.
#[derive(Debug)]
pub struct ServiceMutex<T: Evented> {
    inner: Mutex<T>,
}

impl<T: Evented> ServiceMutex<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Prend le verrou et ouvre une transaction.
    ///
    /// La transaction est fermée (et l'évènement éventuel publié) quand le
    /// guard est relâché.
    pub fn lock(&self) -> ServiceGuard<'_, T> {
        let mut guard = self.inner.lock();
        guard.start_transaction();
        ServiceGuard { guard }
    }

    /// Accès sans transaction, pour les lectures pures.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.lock())
    }
}

/// Guard de [`ServiceMutex`] ; ferme la transaction à sa destruction.
pub struct ServiceGuard<'a, T: Evented> {
    guard: MutexGuard<'a, T>,
}

impl<T: Evented> Deref for ServiceGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: Evented> DerefMut for ServiceGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: Evented> Drop for ServiceGuard<'_, T> {
    fn drop(&mut self) {
        self.guard.finish_transaction();
    }
}

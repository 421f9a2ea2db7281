// Scoped acquisition: a handle is released exactly once, on close() or on drop

use std::fmt::Display;

/// A handle that must be given back when its user is done with it
pub trait Release {
    type Error: Display;

    /// Human-readable kind for logs ("connection", "statement")
    fn kind(&self) -> &'static str;

    fn release(&mut self) -> Result<(), Self::Error>;
}

/// What happens to an error raised while releasing on drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Report at error level and carry on
    Log,
    /// Drop the error
    Discard,
}

/// Owns a releasable handle for the duration of a scope
pub struct Scoped<R: Release> {
    inner: Option<R>,
    policy: ReleasePolicy,
}

impl<R: Release> Scoped<R> {
    pub fn new(inner: R, policy: ReleasePolicy) -> Self {
        Self {
            inner: Some(inner),
            policy,
        }
    }

    pub fn get(&self) -> &R {
        // inner is only taken by close() or drop, both of which consume self
        self.inner.as_ref().expect("scoped handle used after release")
    }

    pub fn get_mut(&mut self) -> &mut R {
        self.inner.as_mut().expect("scoped handle used after release")
    }

    /// Release now and report the outcome to the caller instead of the policy
    pub fn close(mut self) -> Result<(), R::Error> {
        match self.inner.take() {
            Some(mut inner) => inner.release(),
            None => Ok(()),
        }
    }
}

impl<R: Release> Drop for Scoped<R> {
    fn drop(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            let kind = inner.kind();
            if let Err(e) = inner.release() {
                match self.policy {
                    ReleasePolicy::Log => tracing::error!("Failed to release {}: {}", kind, e),
                    ReleasePolicy::Discard => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Handle {
        releases: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Release for Handle {
        type Error = String;

        fn kind(&self) -> &'static str {
            "handle"
        }

        fn release(&mut self) -> Result<(), String> {
            self.releases.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("already gone".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn handle(fail: bool) -> (Handle, Arc<AtomicUsize>) {
        let releases = Arc::new(AtomicUsize::new(0));
        (Handle { releases: releases.clone(), fail }, releases)
    }

    fn use_then_fail(scoped: &Scoped<Handle>) -> Result<(), String> {
        let _ = scoped.get();
        Err("statement failed".to_string())
    }

    #[test]
    fn releases_once_on_drop() {
        let (h, releases) = handle(false);
        {
            let _scoped = Scoped::new(h, ReleasePolicy::Log);
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_close_is_not_repeated_on_drop() {
        let (h, releases) = handle(false);
        let scoped = Scoped::new(h, ReleasePolicy::Log);
        assert!(scoped.close().is_ok());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn releases_once_when_work_fails() {
        let (h, releases) = handle(false);
        let result = (|| {
            let scoped = Scoped::new(h, ReleasePolicy::Log);
            use_then_fail(&scoped)?;
            Ok::<_, String>(())
        })();
        assert!(result.is_err());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_reports_release_errors() {
        let (h, releases) = handle(true);
        let scoped = Scoped::new(h, ReleasePolicy::Discard);
        assert_eq!(scoped.close(), Err("already gone".to_string()));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_swallows_release_errors() {
        for policy in [ReleasePolicy::Log, ReleasePolicy::Discard] {
            let (h, releases) = handle(true);
            drop(Scoped::new(h, policy));
            assert_eq!(releases.load(Ordering::SeqCst), 1);
        }
    }
}

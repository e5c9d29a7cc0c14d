//! Making restricted members readable.
//!
//! Hosts differ in how a restricted member is unlocked: some only offer a
//! legacy "is it accessible?" query and a "force accessible" operation, newer
//! ones add a "try to force accessible" operation that reports failure instead
//! of refusing, and some run the attempt again inside a privileged context. The
//! [`AccessResolver`] hides all of that behind one boolean:
//!
//! 1. If the legacy query reports the member as accessible, succeed.
//! 2. Try each unlock strategy in order; the first success wins.
//! 3. Otherwise retry the unlock strategies inside the privileged executor.
//!
//! Every failure, refusal or missing capability collapses to `false`.
//!
//! Which capabilities exist is decided once, by [`HostProfile`]. The
//! process-wide resolver for fields is available through [`field_access`].
//!
//! ## Examples
//!
//! ```rust
//! use refjson::{AccessResolver, FieldDescriptor, HostProfile, Restriction, Typed};
//!
//! let field = FieldDescriptor::new("secret", String::type_descriptor())
//!     .with_restriction(Restriction::Privileged);
//!
//! assert!(!AccessResolver::probe(HostProfile::modern()).ensure_accessible(&field));
//! assert!(AccessResolver::probe(HostProfile::full()).ensure_accessible(&field));
//! ```

use crate::field::FieldDescriptor;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::cell::Cell;

thread_local! {
    static ELEVATED: Cell<bool> = const { Cell::new(false) };
}

static FIELD_ACCESS: Lazy<AccessResolver<FieldDescriptor>> =
    Lazy::new(|| AccessResolver::probe(HostProfile::detect()));

/// Returns the process-wide resolver used by the field filter.
#[inline]
pub fn field_access() -> &'static AccessResolver<FieldDescriptor> {
    &FIELD_ACCESS
}

/// Returns `true` while the current thread runs inside an [`ElevatedScope`].
#[inline]
#[must_use]
pub fn is_elevated() -> bool {
    ELEVATED.with(Cell::get)
}

/// A member whose accessibility can be queried and changed.
///
/// Changing accessibility must be idempotent and safe to race.
pub trait Accessible {
    /// Human-readable name used in diagnostics.
    fn member_name(&self) -> String;

    /// Returns `true` if the member may already be read.
    fn is_accessible(&self) -> bool;

    /// Forces the member accessible, or refuses with an error.
    fn set_accessible(&self) -> Result<()>;

    /// Forces the member accessible, reporting failure as `false`.
    fn try_set_accessible(&self) -> bool;
}

/// One way of querying or unlocking a member.
pub trait AccessStrategy<M: ?Sized>: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Returns `Ok(true)` if the member is readable afterwards.
    fn attempt(&self, member: &M) -> Result<bool>;
}

/// The legacy query: reports whether the member is already accessible.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyQuery;

impl<M: Accessible + ?Sized> AccessStrategy<M> for LegacyQuery {
    fn name(&self) -> &'static str {
        "legacy-query"
    }

    fn attempt(&self, member: &M) -> Result<bool> {
        Ok(member.is_accessible())
    }
}

/// Forces the member accessible; a refusal surfaces as an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceAccessible;

impl<M: Accessible + ?Sized> AccessStrategy<M> for ForceAccessible {
    fn name(&self) -> &'static str {
        "force-accessible"
    }

    fn attempt(&self, member: &M) -> Result<bool> {
        member.set_accessible().map(|()| true)
    }
}

/// Tries to force the member accessible and reports the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TryForceAccessible;

impl<M: Accessible + ?Sized> AccessStrategy<M> for TryForceAccessible {
    fn name(&self) -> &'static str {
        "try-force-accessible"
    }

    fn attempt(&self, member: &M) -> Result<bool> {
        Ok(member.try_set_accessible())
    }
}

/// Runs an action with additional permissions.
pub trait PrivilegedExecutor: Send + Sync {
    /// Runs `action` privileged and returns its result, or an error if the
    /// privileged context is unavailable or refused.
    fn run_privileged(&self, action: &mut dyn FnMut() -> bool) -> Result<bool>;
}

/// Marks the current thread as elevated for the duration of the action.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElevatedScope;

struct RestoreElevation(bool);

impl Drop for RestoreElevation {
    fn drop(&mut self) {
        let previous = self.0;
        ELEVATED.with(|elevated| elevated.set(previous));
    }
}

impl PrivilegedExecutor for ElevatedScope {
    fn run_privileged(&self, action: &mut dyn FnMut() -> bool) -> Result<bool> {
        let _restore = RestoreElevation(ELEVATED.with(|elevated| elevated.replace(true)));
        Ok(action())
    }
}

/// Which accessibility capabilities the host offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostProfile {
    pub legacy_query: bool,
    pub force: bool,
    pub try_force: bool,
    pub privileged: bool,
}

impl HostProfile {
    /// Every capability.
    #[must_use]
    pub const fn full() -> Self {
        HostProfile {
            legacy_query: true,
            force: true,
            try_force: true,
            privileged: true,
        }
    }

    /// Query and force only, with a privileged context.
    #[must_use]
    pub const fn legacy() -> Self {
        HostProfile {
            legacy_query: true,
            force: true,
            try_force: false,
            privileged: true,
        }
    }

    /// Force and try-force, without a legacy query or privileged context.
    #[must_use]
    pub const fn modern() -> Self {
        HostProfile {
            legacy_query: false,
            force: true,
            try_force: true,
            privileged: false,
        }
    }

    /// No capability at all; nothing can be unlocked.
    #[must_use]
    pub const fn none() -> Self {
        HostProfile {
            legacy_query: false,
            force: false,
            try_force: false,
            privileged: false,
        }
    }

    /// The capabilities of the running process.
    #[must_use]
    pub const fn detect() -> Self {
        Self::full()
    }
}

impl Default for HostProfile {
    fn default() -> Self {
        Self::detect()
    }
}

/// Makes members readable using whichever strategies were configured.
pub struct AccessResolver<M: ?Sized> {
    query: Option<Box<dyn AccessStrategy<M>>>,
    unlockers: Vec<Box<dyn AccessStrategy<M>>>,
    privileged: Option<Box<dyn PrivilegedExecutor>>,
}

impl<M: ?Sized> AccessResolver<M> {
    /// Creates a resolver with no capabilities.
    #[must_use]
    pub fn new() -> Self {
        AccessResolver {
            query: None,
            unlockers: Vec::new(),
            privileged: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: impl AccessStrategy<M> + 'static) -> Self {
        self.query = Some(Box::new(query));
        self
    }

    /// Appends an unlock strategy; strategies run in insertion order.
    #[must_use]
    pub fn with_unlocker(mut self, unlocker: impl AccessStrategy<M> + 'static) -> Self {
        self.unlockers.push(Box::new(unlocker));
        self
    }

    #[must_use]
    pub fn with_privileged(mut self, executor: impl PrivilegedExecutor + 'static) -> Self {
        self.privileged = Some(Box::new(executor));
        self
    }

    /// Names of the configured strategies, query first.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.query
            .iter()
            .chain(self.unlockers.iter())
            .map(|strategy| strategy.name())
            .collect()
    }

    #[must_use]
    pub fn has_privileged(&self) -> bool {
        self.privileged.is_some()
    }
}

impl<M: Accessible + ?Sized> AccessResolver<M> {
    /// Builds a resolver from the built-in strategies the host offers.
    #[must_use]
    pub fn probe(profile: HostProfile) -> Self {
        log::debug!("probing accessibility capabilities: {:?}", profile);
        let mut resolver = AccessResolver::new();
        if profile.legacy_query {
            resolver = resolver.with_query(LegacyQuery);
        }
        if profile.force {
            resolver = resolver.with_unlocker(ForceAccessible);
        }
        if profile.try_force {
            resolver = resolver.with_unlocker(TryForceAccessible);
        }
        if profile.privileged {
            resolver = resolver.with_privileged(ElevatedScope);
        }
        resolver
    }

    /// Makes `member` readable, returning `false` if every strategy failed.
    ///
    /// Never fails; may leave the member accessible for the rest of the process.
    pub fn ensure_accessible(&self, member: &M) -> bool {
        if self.already_accessible(member) || self.try_unlock(member) {
            return true;
        }
        let Some(executor) = &self.privileged else {
            return false;
        };
        log::debug!("retrying {} in a privileged context", member.member_name());
        match executor.run_privileged(&mut || self.try_unlock(member)) {
            Ok(unlocked) => unlocked,
            Err(err) => {
                log::trace!("privileged retry for {} failed: {}", member.member_name(), err);
                false
            }
        }
    }

    fn already_accessible(&self, member: &M) -> bool {
        match &self.query {
            Some(query) => self.succeeded(query.as_ref(), member),
            None => false,
        }
    }

    fn try_unlock(&self, member: &M) -> bool {
        self.unlockers
            .iter()
            .any(|unlocker| self.succeeded(unlocker.as_ref(), member))
    }

    fn succeeded(&self, strategy: &dyn AccessStrategy<M>, member: &M) -> bool {
        match strategy.attempt(member) {
            Ok(true) => true,
            Ok(false) => {
                log::trace!("{} did not unlock {}", strategy.name(), member.member_name());
                false
            }
            Err(err) => {
                log::trace!("{} failed for {}: {}", strategy.name(), member.member_name(), err);
                false
            }
        }
    }
}

impl<M: ?Sized> Default for AccessResolver<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// A privileged executor that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrivileges;

impl PrivilegedExecutor for NoPrivileges {
    fn run_privileged(&self, _action: &mut dyn FnMut() -> bool) -> Result<bool> {
        Err(Error::access_denied(
            "privileged context",
            "no privileged context available",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Restriction;
    use crate::types::Typed;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn restricted(restriction: Restriction) -> FieldDescriptor {
        FieldDescriptor::new("value", u64::type_descriptor()).with_restriction(restriction)
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
        outcome: Result<bool>,
    }

    impl AccessStrategy<FieldDescriptor> for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn attempt(&self, _member: &FieldDescriptor) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[test]
    fn test_probe_orders_strategies() {
        let resolver = AccessResolver::<FieldDescriptor>::probe(HostProfile::full());
        assert_eq!(
            resolver.strategy_names(),
            ["legacy-query", "force-accessible", "try-force-accessible"]
        );
        assert!(resolver.has_privileged());

        let resolver = AccessResolver::<FieldDescriptor>::probe(HostProfile::none());
        assert!(resolver.strategy_names().is_empty());
        assert!(!resolver.has_privileged());
    }

    #[test]
    fn test_already_accessible_skips_unlockers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = AccessResolver::new()
            .with_query(LegacyQuery)
            .with_unlocker(Counting {
                calls: calls.clone(),
                outcome: Ok(true),
            });
        let field = restricted(Restriction::Sealed).with_accessible(true);
        assert!(resolver.ensure_accessible(&field));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_force_falls_through_to_next_strategy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = AccessResolver::new()
            .with_unlocker(Counting {
                calls: calls.clone(),
                outcome: Err(Error::access_denied("value", "refused")),
            })
            .with_unlocker(TryForceAccessible);
        let field = restricted(Restriction::Open);
        assert!(resolver.ensure_accessible(&field));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(field.is_accessible());
    }

    #[test]
    fn test_sealed_member_is_never_unlocked() {
        let field = restricted(Restriction::Sealed);
        for profile in [
            HostProfile::full(),
            HostProfile::legacy(),
            HostProfile::modern(),
            HostProfile::none(),
        ] {
            assert!(!AccessResolver::probe(profile).ensure_accessible(&field));
        }
        assert!(!field.is_accessible());
    }

    #[test]
    fn test_privileged_member_needs_executor() {
        let field = restricted(Restriction::Privileged);
        assert!(!AccessResolver::probe(HostProfile::modern()).ensure_accessible(&field));
        assert!(!field.is_accessible());

        assert!(AccessResolver::probe(HostProfile::legacy()).ensure_accessible(&field));
        assert!(field.is_accessible());
    }

    #[test]
    fn test_refusing_executor_yields_false() {
        let field = restricted(Restriction::Privileged);
        let resolver = AccessResolver::new()
            .with_unlocker(ForceAccessible)
            .with_privileged(NoPrivileges);
        assert!(!resolver.ensure_accessible(&field));
    }

    #[test]
    fn test_elevation_is_restored() {
        assert!(!is_elevated());
        let observed = ElevatedScope
            .run_privileged(&mut || is_elevated())
            .unwrap();
        assert!(observed);
        assert!(!is_elevated());
    }

    #[test]
    fn test_no_capabilities_returns_false() {
        let field = restricted(Restriction::Open);
        assert!(!AccessResolver::new().ensure_accessible(&field));
    }

    #[test]
    fn test_ensure_accessible_is_idempotent() {
        let field = restricted(Restriction::Open);
        let resolver = field_access();
        assert!(resolver.ensure_accessible(&field));
        assert!(resolver.ensure_accessible(&field));
    }
}

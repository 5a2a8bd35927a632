//! Mark-and-sweep garbage collector.
//!
//! A `Collector` owns the heap for every value created through it and keeps
//! a registry of the interpreters whose stacks, bindings and configuration
//! form its root set. Several interpreters may share one collector; each
//! registers itself at construction and deregisters at teardown, and only
//! registered interpreters are scanned.
//!
//! Every value records the interpreter that allocated it. Handles do not
//! move between interpreters on their own: copying into another interpreter
//! (`Machine::copy_value_to`, state import) allocates fresh values owned by
//! the target.
//!
//! # Locking
//!
//! Lock order is: interpreter locks (ascending id), then the registry, then
//! the heap. Heap and registry locks are never held while waiting for an
//! interpreter. Two entry points follow from that:
//!
//! - [`SharedCollector::collect`] is for hosts. It blocks until every
//!   registered interpreter is idle, then scans all of them.
//! - [`Machine::collect`] is for code already running inside an interpreter
//!   (the run loop and native operations). It scans its own machine directly
//!   and *tries* the others. Values of a busy interpreter are neither scanned
//!   nor freed in that cycle; everything owned by the scanned interpreters
//!   (or by interpreters already gone) is collected as usual. Values tracked
//!   directly by the host are only freed by a cycle that scanned every
//!   registered interpreter.

mod heap;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::{Mutex, MutexGuard};
use smallvec::SmallVec;

use crate::interpreter::{Machine, MachineId};
use crate::value::{Value, ValueKind, ValueRef};
use heap::Heap;

/// Number of values tracked since the previous cycle that makes a non-forced
/// collection actually run.
pub const GC_THRESHOLD: usize = 4096;

/// Outcome of one completed collection cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Root handles enumerated across all registered interpreters.
    pub roots: usize,
    /// Values found reachable.
    pub marked: usize,
    /// Values freed by the sweep.
    pub freed: usize,
    /// Values alive after the sweep.
    pub live: usize,
}

/// Heap plus interpreter registry.
pub struct Collector {
    heap: Mutex<Heap>,
    machines: Mutex<BTreeMap<MachineId, Weak<Mutex<Machine>>>>,
    threshold: usize,
}

/// Shared handle to a collector.
///
/// Interpreters hold one of these; the collector lives as long as any
/// interpreter or host handle refers to it.
#[derive(Clone)]
pub struct SharedCollector(Arc<Collector>);

impl SharedCollector {
    /// Create a collector with the default threshold.
    pub fn new() -> Self {
        Self::with_threshold(GC_THRESHOLD)
    }

    /// Create a collector that runs non-forced cycles after `threshold`
    /// new values.
    pub fn with_threshold(threshold: usize) -> Self {
        SharedCollector(Arc::new(Collector {
            heap: Mutex::new(Heap::new()),
            machines: Mutex::new(BTreeMap::new()),
            threshold,
        }))
    }

    /// The process-wide default collector, created on first use.
    ///
    /// Interpreters built without an explicit collector share this one.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<SharedCollector> = OnceLock::new();
        GLOBAL.get_or_init(SharedCollector::new).clone()
    }

    /// Whether both handles refer to the same collector.
    pub fn ptr_eq(&self, other: &SharedCollector) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn threshold(&self) -> usize {
        self.0.threshold
    }

    /// Take ownership of `value` and start tracking it.
    ///
    /// The handle stays valid only while the value is reachable from a
    /// registered interpreter, or until the next complete collection
    /// otherwise.
    pub fn track(&self, value: Value) -> ValueRef {
        self.0.heap.lock().insert(value, None)
    }

    /// Track a value allocated by the interpreter `owner`.
    pub(crate) fn track_owned(&self, value: Value, owner: MachineId) -> ValueRef {
        self.0.heap.lock().insert(value, Some(owner))
    }

    /// Stop tracking a value and hand it back, freeing its slot now.
    pub fn untrack(&self, r: ValueRef) -> Option<Value> {
        self.0.heap.lock().remove(r)
    }

    /// Resolve a handle to a copy of its value.
    ///
    /// Code values copy only their child handles, not the children.
    pub fn get(&self, r: ValueRef) -> Option<Value> {
        self.0.heap.lock().get(r).cloned()
    }

    /// Kind of the value behind a handle.
    pub fn kind(&self, r: ValueRef) -> Option<ValueKind> {
        self.0.heap.lock().get(r).map(Value::kind)
    }

    /// Whether `r` still resolves to a live value.
    pub fn is_live(&self, r: ValueRef) -> bool {
        self.0.heap.lock().contains(r)
    }

    /// Number of live values.
    pub fn live_count(&self) -> usize {
        self.0.heap.lock().object_count()
    }

    /// Number of interpreters currently registered.
    pub fn interpreter_count(&self) -> usize {
        self.0
            .machines
            .lock()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Whether enough values were tracked, by all owners together, to
    /// warrant a non-forced host cycle.
    pub fn should_collect(&self) -> bool {
        self.0.heap.lock().allocated_since_collect() >= self.0.threshold
    }

    /// Collect garbage from a host thread.
    ///
    /// Skipped (returning `None`) when `force` is false and the allocation
    /// threshold has not been reached. Waits for every registered
    /// interpreter to become idle, so it must not be called from inside a
    /// native operation; use [`Machine::collect`] there.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn collect(&self, force: bool) -> Option<CollectStats> {
        if !force && !self.should_collect() {
            return None;
        }

        let machines = self.registered(None);
        let guards: Vec<(MachineId, MutexGuard<'_, Machine>)> =
            machines.iter().map(|(id, m)| (*id, m.lock())).collect();

        let mut roots = Vec::new();
        let mut scanned = SmallVec::<[MachineId; 8]>::new();
        for (id, machine) in &guards {
            machine.extend_roots(&mut roots);
            scanned.push(*id);
        }
        Some(self.mark_and_sweep(roots, &scanned))
    }

    /// Collect garbage on behalf of a machine whose lock is already held.
    ///
    /// Interpreters that are busy are skipped, together with the values
    /// they own.
    ///
    /// The threshold is applied to the values `current` allocated since its
    /// last cycle, so each running interpreter collects at its own pace.
    pub(crate) fn collect_from(&self, current: &Machine, force: bool) -> Option<CollectStats> {
        if !force && self.0.heap.lock().allocated_by(Some(current.id())) < self.0.threshold {
            return None;
        }

        let machines = self.registered(Some(current.id()));
        let mut guards = Vec::with_capacity(machines.len());
        let mut scanned = SmallVec::<[MachineId; 8]>::new();
        scanned.push(current.id());
        for (id, machine) in &machines {
            if let Some(guard) = machine.try_lock() {
                guards.push(guard);
                scanned.push(*id);
            }
        }
        let busy = machines.len() + 1 - scanned.len();
        if busy > 0 {
            tracing::debug!(busy, "busy interpreters keep their values this cycle");
        }

        let mut roots = Vec::new();
        current.extend_roots(&mut roots);
        for machine in &guards {
            machine.extend_roots(&mut roots);
        }
        Some(self.mark_and_sweep(roots, &scanned))
    }

    /// Mark from `roots` and sweep what the `scanned` interpreters own.
    fn mark_and_sweep(&self, roots: Vec<ValueRef>, scanned: &[MachineId]) -> CollectStats {
        // Held through the sweep: an interpreter registers before its first
        // allocation, so every owner in the heap is either listed here or gone.
        let registry = self.0.machines.lock();
        let alive = |id: &MachineId| registry.get(id).is_some_and(|weak| weak.strong_count() > 0);
        let complete = registry
            .keys()
            .copied()
            .filter(|id| alive(id))
            .all(|id| scanned.contains(&id));

        let mut heap = self.0.heap.lock();
        let root_count = roots.len();
        let marked = heap.mark_from(roots);
        let freed = heap.sweep(|owner| match owner {
            Some(id) => scanned.contains(&id) || !alive(&id),
            None => complete,
        });
        let stats = CollectStats {
            roots: root_count,
            marked,
            freed,
            live: heap.object_count(),
        };
        tracing::debug!(
            roots = stats.roots,
            marked = stats.marked,
            freed = stats.freed,
            live = stats.live,
            complete,
            "collection complete"
        );
        stats
    }

    /// Live registered interpreters in ascending id order, optionally
    /// excluding one.
    fn registered(&self, except: Option<MachineId>) -> Vec<(MachineId, Arc<Mutex<Machine>>)> {
        let machines = self.0.machines.lock();
        machines
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .filter_map(|(id, weak)| Some((*id, weak.upgrade()?)))
            .collect()
    }

    pub(crate) fn register(&self, id: MachineId, machine: &Arc<Mutex<Machine>>) {
        self.0.machines.lock().insert(id, Arc::downgrade(machine));
        tracing::debug!(?id, "interpreter registered with collector");
    }

    pub(crate) fn deregister(&self, id: MachineId) {
        if self.0.machines.lock().remove(&id).is_some() {
            tracing::debug!(?id, "interpreter deregistered from collector");
        }
    }
}

impl Default for SharedCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCollector")
            .field("threshold", &self.0.threshold)
            .field("live", &self.live_count())
            .finish_non_exhaustive()
    }
}

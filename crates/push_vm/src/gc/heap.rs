//! Slot heap backing a collector.
//!
//! Values live in a vector of slots. Freed slots go on a free list and their
//! generation is bumped, which invalidates every handle issued for the old
//! occupant. Each slot remembers the interpreter that allocated it, so a
//! sweep can be limited to the values of the interpreters whose roots were
//! scanned.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::interpreter::MachineId;
use crate::value::{Value, ValueRef};

struct Slot {
    generation: u32,
    value: Option<Value>,
    /// Allocating interpreter; `None` for values tracked by the host.
    owner: Option<MachineId>,
    marked: bool,
}

/// Mark-and-sweep heap.
#[derive(Default)]
pub(crate) struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    /// Values tracked per owner since that owner's values were last swept.
    allocated: FxHashMap<Option<MachineId>, usize>,
}

impl Heap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `value` and return its handle.
    pub(crate) fn insert(&mut self, value: Value, owner: Option<MachineId>) -> ValueRef {
        self.live += 1;
        *self.allocated.entry(owner).or_default() += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            slot.owner = owner;
            slot.marked = false;
            return ValueRef::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("value heap exceeded {} slots", u32::MAX));
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
            owner,
            marked: false,
        });
        ValueRef::new(index, 0)
    }

    fn slot(&self, r: ValueRef) -> Option<&Slot> {
        self.slots
            .get(r.index())
            .filter(|slot| slot.generation == r.generation() && slot.value.is_some())
    }

    /// Resolve a handle. `None` if the handle is stale or foreign.
    pub(crate) fn get(&self, r: ValueRef) -> Option<&Value> {
        self.slot(r).and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn contains(&self, r: ValueRef) -> bool {
        self.slot(r).is_some()
    }

    /// Release a value immediately, bypassing the collector.
    pub(crate) fn remove(&mut self, r: ValueRef) -> Option<Value> {
        if !self.contains(r) {
            return None;
        }
        self.release(r.index())
    }

    fn release(&mut self, index: usize) -> Option<Value> {
        let slot = &mut self.slots[index];
        let value = slot.value.take()?;
        slot.owner = None;
        slot.generation = slot.generation.wrapping_add(1);
        slot.marked = false;
        self.live -= 1;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "slot indices are issued from u32 in insert"
        )]
        let index = index as u32;
        self.free.push(index);
        Some(value)
    }

    /// Number of live values.
    pub(crate) fn object_count(&self) -> usize {
        self.live
    }

    /// Values tracked since the last sweep that covered their owner.
    pub(crate) fn allocated_since_collect(&self) -> usize {
        self.allocated.values().sum()
    }

    /// Like `allocated_since_collect`, for one owner.
    pub(crate) fn allocated_by(&self, owner: Option<MachineId>) -> usize {
        self.allocated.get(&owner).copied().unwrap_or(0)
    }

    /// Mark everything reachable from `roots`.
    ///
    /// Uses an explicit worklist and the per-slot mark bit as the visited
    /// set, so deep or cyclic code graphs neither overflow the native stack
    /// nor loop. Returns the number of values newly marked.
    pub(crate) fn mark_from(&mut self, roots: impl IntoIterator<Item = ValueRef>) -> usize {
        let mut gray: SmallVec<[ValueRef; 64]> = roots.into_iter().collect();
        let mut marked = 0;

        while let Some(r) = gray.pop() {
            let Some(slot) = self
                .slots
                .get_mut(r.index())
                .filter(|slot| slot.generation == r.generation() && slot.value.is_some())
            else {
                tracing::warn!(value = ?r, "stale value handle reachable from a root");
                continue;
            };
            if slot.marked {
                continue;
            }
            slot.marked = true;
            marked += 1;

            if let Some(Value::Code(code)) = &slot.value {
                gray.extend(code.as_slice().iter().copied());
            }
        }

        marked
    }

    /// Free every unmarked value whose owner `may_free` accepts, and clear
    /// all marks for the next cycle. Returns the number of values freed.
    pub(crate) fn sweep(&mut self, may_free: impl Fn(Option<MachineId>) -> bool) -> usize {
        let mut freed = 0;
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            if slot.value.is_none() {
                continue;
            }
            if slot.marked {
                slot.marked = false;
            } else if may_free(slot.owner) && self.release(index).is_some() {
                freed += 1;
            }
        }
        self.allocated.retain(|owner, _| !may_free(*owner));
        freed
    }
}

//! Program tree: steps grouped into repeated cycles
//!
//! Steps and cycles live in two fixed-capacity pools owned by the
//! [`ProgramTree`]. Cycles reference their children by handle, so the
//! whole tree can be moved or reset without chasing references.

use heapless::{String, Vec};

use super::pool::{Handle, Pool, PoolError};

/// Step pool capacity
pub const STEP_POOL_CAPACITY: usize = 20;

/// Cycle pool capacity
pub const CYCLE_POOL_CAPACITY: usize = 4;

/// Maximum children of a single cycle
pub const MAX_CYCLE_CHILDREN: usize = 16;

/// Maximum step label length
pub const MAX_STEP_LABEL_LEN: usize = 12;

/// Handle to a step in a program tree
pub type StepId = Handle<Step>;

/// Handle to a cycle in a program tree
pub type CycleId = Handle<Cycle>;

/// Program construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramError {
    /// A node pool has no free slot
    Pool(PoolError),
    /// The cycle already holds the maximum number of children
    CycleFull,
    /// Handle does not belong to the live tree
    InvalidHandle,
    /// A cycle may only contain cycles allocated after it, each at most once
    InvalidNesting,
}

impl From<PoolError> for ProgramError {
    fn from(e: PoolError) -> Self {
        ProgramError::Pool(e)
    }
}

/// Leaf program node: hold a temperature for a duration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    temp_c: f32,
    duration_s: u32,
    label: String<MAX_STEP_LABEL_LEN>,
    is_final: bool,
}

impl Step {
    /// Hold `temp_c` for `duration_s` seconds
    pub fn new(temp_c: f32, duration_s: u32) -> Self {
        Self {
            temp_c,
            duration_s,
            label: String::new(),
            is_final: false,
        }
    }

    /// Terminal step: hold `temp_c` indefinitely once the program ends
    pub fn final_step(temp_c: f32) -> Self {
        Self {
            temp_c,
            duration_s: 0,
            label: String::new(),
            is_final: true,
        }
    }

    /// Attach a display label, truncated to [`MAX_STEP_LABEL_LEN`]
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = truncated(label);
        self
    }

    /// Target temperature in °C
    pub fn temp_c(&self) -> f32 {
        self.temp_c
    }

    /// Hold duration in seconds
    pub fn duration_s(&self) -> u32 {
        self.duration_s
    }

    /// Display label (may be empty)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True for the terminal sentinel step
    pub fn is_final(&self) -> bool {
        self.is_final
    }
}

/// Child of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Component {
    Step(StepId),
    Cycle(CycleId),
}

/// Composite program node: children repeated `repeats` times
#[derive(Debug, Clone)]
pub struct Cycle {
    children: Vec<Component, MAX_CYCLE_CHILDREN>,
    repeats: u16,
    has_parent: bool,
    cursor: u8,
    repeat: u16,
}

impl Cycle {
    fn new(repeats: u16) -> Self {
        Self {
            children: Vec::new(),
            repeats,
            has_parent: false,
            cursor: 0,
            repeat: 0,
        }
    }

    /// Configured repeat count
    pub fn repeats(&self) -> u16 {
        self.repeats
    }

    /// Ordered children
    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// 1-based repeat currently executing, clamped to the repeat count
    pub fn current_repeat(&self) -> u16 {
        self.repeat.saturating_add(1).min(self.repeats)
    }

    fn current_child(&self) -> Option<Component> {
        self.children.get(self.cursor as usize).copied()
    }
}

/// A thermal program: pooled steps and cycles plus the root cycle
#[derive(Debug, Clone, Default)]
pub struct ProgramTree {
    steps: Pool<Step, STEP_POOL_CAPACITY>,
    cycles: Pool<Cycle, CYCLE_POOL_CAPACITY>,
    root: Option<CycleId>,
}

impl ProgramTree {
    /// Create an empty tree
    pub const fn new() -> Self {
        Self {
            steps: Pool::new(),
            cycles: Pool::new(),
            root: None,
        }
    }

    /// Allocate a step
    pub fn add_step(&mut self, step: Step) -> Result<StepId, ProgramError> {
        Ok(self.steps.alloc(step)?)
    }

    /// Allocate a cycle with the given repeat count
    pub fn add_cycle(&mut self, repeats: u16) -> Result<CycleId, ProgramError> {
        Ok(self.cycles.alloc(Cycle::new(repeats))?)
    }

    /// Append a child to a cycle
    ///
    /// Nested cycles must be allocated after their parent and may have
    /// only one parent, which keeps the tree acyclic.
    pub fn push(&mut self, cycle: CycleId, child: Component) -> Result<(), ProgramError> {
        match child {
            Component::Step(step) => {
                self.steps.get(step).ok_or(ProgramError::InvalidHandle)?;
            }
            Component::Cycle(inner) => {
                let nested = self.cycles.get(inner).ok_or(ProgramError::InvalidHandle)?;
                if inner.index() <= cycle.index() || nested.has_parent {
                    return Err(ProgramError::InvalidNesting);
                }
            }
        }

        let parent = self.cycles.get_mut(cycle).ok_or(ProgramError::InvalidHandle)?;
        parent
            .children
            .push(child)
            .map_err(|_| ProgramError::CycleFull)?;

        if let Component::Cycle(inner) = child {
            if let Some(nested) = self.cycles.get_mut(inner) {
                nested.has_parent = true;
            }
        }
        Ok(())
    }

    /// Mark a cycle as the program root
    pub fn set_root(&mut self, cycle: CycleId) -> Result<(), ProgramError> {
        let root = self.cycles.get(cycle).ok_or(ProgramError::InvalidHandle)?;
        if root.has_parent {
            return Err(ProgramError::InvalidNesting);
        }
        self.root = Some(cycle);
        Ok(())
    }

    /// Root cycle, if a program is loaded
    pub fn root(&self) -> Option<CycleId> {
        self.root
    }

    /// True if a root cycle is set
    pub fn is_loaded(&self) -> bool {
        self.root.is_some()
    }

    /// Resolve a step handle
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(id)
    }

    /// Resolve a cycle handle
    pub fn cycle(&self, id: CycleId) -> Option<&Cycle> {
        self.cycles.get(id)
    }

    /// Step pool capacity
    pub fn step_capacity(&self) -> usize {
        self.steps.capacity()
    }

    /// Cycle pool capacity
    pub fn cycle_capacity(&self) -> usize {
        self.cycles.capacity()
    }

    /// Steps allocated
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Cycles allocated
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Reclaim both pools and drop the root
    ///
    /// Every previously issued handle stops resolving.
    pub fn reset(&mut self) {
        self.steps.reset();
        self.cycles.reset();
        self.root = None;
    }

    /// Root's direct child cycle with the largest repeat count, else the root
    pub fn largest_child_cycle(&self) -> Option<CycleId> {
        let root = self.root?;
        let mut best = root;
        let mut best_repeats = 0;
        for child in self.cycles.get(root)?.children() {
            if let Component::Cycle(id) = *child {
                let repeats = self.cycles.get(id).map_or(0, Cycle::repeats);
                if repeats > best_repeats {
                    best = id;
                    best_repeats = repeats;
                }
            }
        }
        Some(best)
    }

    /// Restart iteration of a cycle from its first child and first repeat
    pub fn begin_iteration(&mut self, id: CycleId) {
        if let Some(cycle) = self.cycles.get_mut(id) {
            cycle.cursor = 0;
            cycle.repeat = 0;
        }
        self.enter_current_child(id);
    }

    /// Next step in depth-first order, or `None` once the cycle is exhausted
    pub fn next_step(&mut self, id: CycleId) -> Option<StepId> {
        loop {
            let cycle = self.cycles.get(id)?;
            if cycle.repeat >= cycle.repeats {
                return None;
            }

            let Some(child) = cycle.current_child() else {
                // Pass over children complete
                let cycle = self.cycles.get_mut(id)?;
                cycle.repeat += 1;
                cycle.cursor = 0;
                if cycle.repeat < cycle.repeats {
                    self.enter_current_child(id);
                }
                continue;
            };

            match child {
                Component::Step(step) => {
                    self.advance(id);
                    return Some(step);
                }
                Component::Cycle(inner) => match self.next_step(inner) {
                    Some(step) => return Some(step),
                    None => self.advance(id),
                },
            }
        }
    }

    fn advance(&mut self, id: CycleId) {
        if let Some(cycle) = self.cycles.get_mut(id) {
            cycle.cursor = cycle.cursor.saturating_add(1);
        }
        self.enter_current_child(id);
    }

    fn enter_current_child(&mut self, id: CycleId) {
        let child = self.cycles.get(id).and_then(Cycle::current_child);
        if let Some(Component::Cycle(inner)) = child {
            self.begin_iteration(inner);
        }
    }
}

/// Copy `s` into a fixed-capacity string, dropping whatever does not fit
pub fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn temps(tree: &mut ProgramTree, root: CycleId) -> [f32; 32] {
        let mut out = [f32::NAN; 32];
        let mut i = 0;
        while let Some(id) = tree.next_step(root) {
            out[i] = tree.step(id).unwrap().temp_c();
            i += 1;
        }
        out
    }

    fn count_steps(tree: &mut ProgramTree, root: CycleId) -> usize {
        let mut n = 0;
        while tree.next_step(root).is_some() {
            n += 1;
            assert!(n < 1000, "iteration did not terminate");
        }
        n
    }

    fn count_steps_unbounded(tree: &mut ProgramTree, root: CycleId) -> usize {
        let mut n = 0;
        while tree.next_step(root).is_some() {
            n += 1;
        }
        n
    }

    #[test]
    fn test_flat_cycle_repeats() {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(2).unwrap();
        let a = tree.add_step(Step::new(95.0, 30)).unwrap();
        let b = tree.add_step(Step::new(60.0, 30)).unwrap();
        tree.push(root, Component::Step(a)).unwrap();
        tree.push(root, Component::Step(b)).unwrap();
        tree.set_root(root).unwrap();

        tree.begin_iteration(root);
        let t = temps(&mut tree, root);
        assert_eq!(&t[..4], &[95.0, 60.0, 95.0, 60.0]);
        assert!(t[4].is_nan());
        assert_eq!(tree.next_step(root), None);
    }

    #[test]
    fn test_nested_cycle_then_final() {
        // root x1: [ init, cycle x3: [denature, anneal], final ]
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(1).unwrap();
        let inner = tree.add_cycle(3).unwrap();
        let init = tree.add_step(Step::new(95.0, 120)).unwrap();
        let den = tree.add_step(Step::new(94.0, 30)).unwrap();
        let ann = tree.add_step(Step::new(55.0, 30)).unwrap();
        let fin = tree.add_step(Step::final_step(4.0)).unwrap();

        tree.push(root, Component::Step(init)).unwrap();
        tree.push(root, Component::Cycle(inner)).unwrap();
        tree.push(inner, Component::Step(den)).unwrap();
        tree.push(inner, Component::Step(ann)).unwrap();
        tree.push(root, Component::Step(fin)).unwrap();
        tree.set_root(root).unwrap();

        tree.begin_iteration(root);
        let t = temps(&mut tree, root);
        assert_eq!(&t[..8], &[95.0, 94.0, 55.0, 94.0, 55.0, 94.0, 55.0, 4.0]);
        assert!(t[8].is_nan());
    }

    #[test]
    fn test_nested_cycle_first_child() {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(2).unwrap();
        let inner = tree.add_cycle(2).unwrap();
        let a = tree.add_step(Step::new(1.0, 1)).unwrap();
        let b = tree.add_step(Step::new(2.0, 1)).unwrap();
        tree.push(root, Component::Cycle(inner)).unwrap();
        tree.push(root, Component::Step(b)).unwrap();
        tree.push(inner, Component::Step(a)).unwrap();
        tree.set_root(root).unwrap();

        tree.begin_iteration(root);
        let t = temps(&mut tree, root);
        assert_eq!(&t[..6], &[1.0, 1.0, 2.0, 1.0, 1.0, 2.0]);
        assert!(t[6].is_nan());
    }

    #[test]
    fn test_begin_iteration_restarts() {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(3).unwrap();
        let a = tree.add_step(Step::new(72.0, 10)).unwrap();
        tree.push(root, Component::Step(a)).unwrap();
        tree.set_root(root).unwrap();

        tree.begin_iteration(root);
        assert!(tree.next_step(root).is_some());
        assert!(tree.next_step(root).is_some());

        tree.begin_iteration(root);
        assert_eq!(count_steps(&mut tree, root), 3);

        tree.begin_iteration(root);
        assert_eq!(count_steps(&mut tree, root), 3);
    }

    #[test]
    fn test_current_repeat_clamped() {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(2).unwrap();
        let a = tree.add_step(Step::new(72.0, 10)).unwrap();
        tree.push(root, Component::Step(a)).unwrap();
        tree.set_root(root).unwrap();

        tree.begin_iteration(root);
        assert_eq!(tree.cycle(root).unwrap().current_repeat(), 1);
        tree.next_step(root);
        tree.next_step(root);
        assert_eq!(tree.cycle(root).unwrap().current_repeat(), 2);
        assert_eq!(tree.next_step(root), None);
        assert_eq!(tree.cycle(root).unwrap().current_repeat(), 2);
    }

    #[test]
    fn test_current_repeat_at_max_repeat_count() {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(u16::MAX).unwrap();
        let a = tree.add_step(Step::new(72.0, 1)).unwrap();
        tree.push(root, Component::Step(a)).unwrap();
        tree.set_root(root).unwrap();

        tree.begin_iteration(root);
        assert_eq!(count_steps_unbounded(&mut tree, root), u16::MAX as usize);
        assert_eq!(tree.cycle(root).unwrap().current_repeat(), u16::MAX);
    }

    #[test]
    fn test_empty_cycle_exhausts() {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(5).unwrap();
        tree.set_root(root).unwrap();
        tree.begin_iteration(root);
        assert_eq!(tree.next_step(root), None);
    }

    #[test]
    fn test_step_pool_exhaustion() {
        let mut tree = ProgramTree::new();
        for _ in 0..STEP_POOL_CAPACITY {
            tree.add_step(Step::new(50.0, 1)).unwrap();
        }
        assert_eq!(
            tree.add_step(Step::new(50.0, 1)),
            Err(ProgramError::Pool(PoolError::Exhausted))
        );
    }

    #[test]
    fn test_cycle_pool_exhaustion() {
        let mut tree = ProgramTree::new();
        for _ in 0..CYCLE_POOL_CAPACITY {
            tree.add_cycle(1).unwrap();
        }
        assert!(matches!(
            tree.add_cycle(1),
            Err(ProgramError::Pool(PoolError::Exhausted))
        ));
    }

    #[test]
    fn test_rejects_backward_nesting() {
        let mut tree = ProgramTree::new();
        let a = tree.add_cycle(1).unwrap();
        let b = tree.add_cycle(1).unwrap();
        tree.push(a, Component::Cycle(b)).unwrap();
        assert_eq!(
            tree.push(b, Component::Cycle(a)),
            Err(ProgramError::InvalidNesting)
        );
        assert_eq!(
            tree.push(a, Component::Cycle(a)),
            Err(ProgramError::InvalidNesting)
        );
    }

    #[test]
    fn test_rejects_second_parent() {
        let mut tree = ProgramTree::new();
        let a = tree.add_cycle(1).unwrap();
        let b = tree.add_cycle(1).unwrap();
        let c = tree.add_cycle(1).unwrap();
        tree.push(a, Component::Cycle(c)).unwrap();
        assert_eq!(
            tree.push(b, Component::Cycle(c)),
            Err(ProgramError::InvalidNesting)
        );
        assert_eq!(tree.set_root(c), Err(ProgramError::InvalidNesting));
    }

    #[test]
    fn test_reset_clears_root_and_handles() {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(1).unwrap();
        let a = tree.add_step(Step::new(72.0, 10)).unwrap();
        tree.push(root, Component::Step(a)).unwrap();
        tree.set_root(root).unwrap();

        tree.reset();
        assert!(!tree.is_loaded());
        assert_eq!(tree.step_count(), 0);
        assert_eq!(tree.cycle_count(), 0);
        assert!(tree.step(a).is_none());
        assert!(tree.cycle(root).is_none());
        assert_eq!(
            tree.push(root, Component::Step(a)),
            Err(ProgramError::InvalidHandle)
        );
    }

    #[test]
    fn test_largest_child_cycle() {
        let mut tree = ProgramTree::new();
        let root = tree.add_cycle(1).unwrap();
        let small = tree.add_cycle(3).unwrap();
        let large = tree.add_cycle(35).unwrap();
        tree.push(root, Component::Cycle(small)).unwrap();
        tree.push(root, Component::Cycle(large)).unwrap();
        tree.set_root(root).unwrap();
        assert_eq!(tree.largest_child_cycle(), Some(large));
    }

    #[test]
    fn test_largest_child_cycle_defaults_to_root() {
        let mut tree = ProgramTree::new();
        assert_eq!(tree.largest_child_cycle(), None);

        let root = tree.add_cycle(1).unwrap();
        let a = tree.add_step(Step::new(72.0, 10)).unwrap();
        tree.push(root, Component::Step(a)).unwrap();
        tree.set_root(root).unwrap();
        assert_eq!(tree.largest_child_cycle(), Some(root));
    }

    #[test]
    fn test_step_label_truncated() {
        let step = Step::new(55.0, 30).with_label("Annealing primers");
        assert_eq!(step.label(), "Annealing pr");
        assert!(!step.is_final());
        assert!(Step::final_step(4.0).is_final());
        assert_eq!(Step::final_step(4.0).duration_s(), 0);
    }

    proptest! {
        #[test]
        fn prop_cycle_yields_repeats_times_children(repeats in 1u16..12, k in 1usize..MAX_CYCLE_CHILDREN) {
            let mut tree = ProgramTree::new();
            let root = tree.add_cycle(repeats).unwrap();
            let k = k.min(STEP_POOL_CAPACITY);
            for i in 0..k {
                let s = tree.add_step(Step::new(i as f32, 1)).unwrap();
                tree.push(root, Component::Step(s)).unwrap();
            }
            tree.set_root(root).unwrap();

            tree.begin_iteration(root);
            prop_assert_eq!(count_steps(&mut tree, root), repeats as usize * k);

            tree.begin_iteration(root);
            prop_assert_eq!(count_steps(&mut tree, root), repeats as usize * k);
        }

        #[test]
        fn prop_nested_cycle_count(outer in 1u16..6, inner in 1u16..6, k in 1usize..5) {
            let mut tree = ProgramTree::new();
            let root = tree.add_cycle(outer).unwrap();
            let nested = tree.add_cycle(inner).unwrap();
            let pre = tree.add_step(Step::new(90.0, 1)).unwrap();
            tree.push(root, Component::Step(pre)).unwrap();
            tree.push(root, Component::Cycle(nested)).unwrap();
            for i in 0..k {
                let s = tree.add_step(Step::new(i as f32, 1)).unwrap();
                tree.push(nested, Component::Step(s)).unwrap();
            }
            tree.set_root(root).unwrap();

            tree.begin_iteration(root);
            let expected = outer as usize * (1 + inner as usize * k);
            prop_assert_eq!(count_steps(&mut tree, root), expected);
        }
    }
}

//! Conditional branch selection.
//!
//! A [`SwitchedNode`] holds an ordered list of cases. Whenever a guarding
//! condition fires or a case is appended, the first case whose condition
//! holds is selected. An unchanged selection does nothing; otherwise the
//! previous branch is destroyed and the newly selected case's builder runs
//! synchronously inside a fresh branch fragment. No case selected means no
//! branch at all.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use trellis_core::{Destroy, Handler, ReactiveCell};

use crate::error::TreeError;
use crate::fragment::{Fragment, WeakFragment};
use crate::tree::{FragmentId, NodeKind};

pub type CaseBuilder = Rc<dyn Fn(&Fragment)>;

enum Condition {
    Cell(Rc<dyn ReactiveCell<Value = bool>>),
    Always,
}

impl Condition {
    fn holds(&self) -> bool {
        match self {
            Condition::Cell(cell) => cell.get(),
            Condition::Always => true,
        }
    }
}

struct Case {
    condition: Condition,
    builder: CaseBuilder,
}

pub struct SwitchedNode {
    host: WeakFragment,
    cases: RefCell<Vec<Case>>,
    selected: Cell<Option<usize>>,
    branch: Cell<Option<FragmentId>>,
    guard: Handler<bool>,
    closed: Cell<bool>,
}

impl SwitchedNode {
    fn new(host: WeakFragment) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let guard: Handler<bool> = Rc::new(move |_: &bool| {
                if let Some(switch) = weak.upgrade() {
                    switch.sync();
                }
            });
            Self {
                host,
                cases: RefCell::new(Vec::new()),
                selected: Cell::new(None),
                branch: Cell::new(None),
                guard,
                closed: Cell::new(false),
            }
        })
    }

    /// Index of the selected case.
    pub fn selected(&self) -> Option<usize> {
        self.selected.get()
    }

    pub fn case_count(&self) -> usize {
        self.cases.borrow().len()
    }

    /// Whether an unconditional case ends the chain.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Fragment holding the built branch.
    pub fn branch(&self) -> Option<Fragment> {
        let host = self.host.upgrade()?;
        let branch = self.branch.get()?;
        host.tree().fragment(branch).ok()
    }

    fn add_case(&self, condition: Condition, builder: CaseBuilder) {
        match &condition {
            Condition::Cell(cell) => cell.on(&self.guard),
            Condition::Always => self.closed.set(true),
        }
        self.cases.borrow_mut().push(Case { condition, builder });
        self.sync();
    }

    /// Re-evaluate the conditions and swap the branch if the selection moved.
    pub fn sync(&self) {
        let next = self
            .cases
            .borrow()
            .iter()
            .position(|case| case.condition.holds());
        let previous = self.selected.get();
        if next == previous {
            return;
        }
        self.selected.set(next);
        log::debug!(
            "switch {}: case {:?} -> {:?}",
            self.host.id(),
            previous,
            next
        );

        let Some(host) = self.host.upgrade() else {
            return;
        };
        if let Some(branch) = self.branch.take() {
            host.tree().destroy(branch);
        }
        let Some(index) = next else {
            return;
        };
        let builder = Rc::clone(&self.cases.borrow()[index].builder);
        let branch = host.child(NodeKind::Plain, "branch");
        self.branch.set(Some(branch.id()));
        builder(&branch);
    }
}

impl Destroy for SwitchedNode {
    fn destroy(&self) {
        let cases = std::mem::take(&mut *self.cases.borrow_mut());
        for case in &cases {
            if let Condition::Cell(cell) = &case.condition {
                cell.off(&self.guard);
            }
        }
        if let Some(branch) = self.branch.take() {
            if let Some(host) = self.host.upgrade() {
                host.tree().destroy(branch);
            }
        }
    }
}

impl fmt::Debug for SwitchedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchedNode")
            .field("cases", &self.case_count())
            .field("selected", &self.selected.get())
            .field("closed", &self.closed.get())
            .finish()
    }
}

impl Fragment {
    /// Open a conditional: build `build` while `condition` holds.
    ///
    /// Returns the non-owning fragment hosting the conditional. Further
    /// cases are chained with [`else_when`](Self::else_when) and
    /// [`otherwise`](Self::otherwise) on the same parent.
    pub fn when<C>(&self, condition: &Rc<C>, build: impl Fn(&Fragment) + 'static) -> Fragment
    where
        C: ReactiveCell<Value = bool> + 'static,
    {
        let host = self.child(NodeKind::Plain, "switch");
        let switch = SwitchedNode::new(host.downgrade());
        self.tree().set_kind(host.id(), NodeKind::Switch(Rc::clone(&switch)));
        host.scope().register(Rc::clone(&switch));
        let condition: Rc<dyn ReactiveCell<Value = bool>> = condition.clone();
        switch.add_case(Condition::Cell(condition), Rc::new(build));
        host
    }

    /// Append a guarded case to the conditional that is this fragment's
    /// last child.
    pub fn else_when<C>(
        &self,
        condition: &Rc<C>,
        build: impl Fn(&Fragment) + 'static,
    ) -> Result<Fragment, TreeError>
    where
        C: ReactiveCell<Value = bool> + 'static,
    {
        let (host, switch) = self.open_switch()?;
        let condition: Rc<dyn ReactiveCell<Value = bool>> = condition.clone();
        switch.add_case(Condition::Cell(condition), Rc::new(build));
        Ok(host)
    }

    /// Close the trailing conditional with a case that always holds.
    pub fn otherwise(&self, build: impl Fn(&Fragment) + 'static) -> Result<Fragment, TreeError> {
        let (host, switch) = self.open_switch()?;
        switch.add_case(Condition::Always, Rc::new(build));
        Ok(host)
    }

    /// The switch state of a conditional fragment.
    pub fn switch_node(&self) -> Option<Rc<SwitchedNode>> {
        self.tree()
            .with_data(self.id(), |data| match &data.kind {
                NodeKind::Switch(switch) => Some(Rc::clone(switch)),
                _ => None,
            })
            .flatten()
    }

    fn open_switch(&self) -> Result<(Fragment, Rc<SwitchedNode>), TreeError> {
        let missing = TreeError::MissingIf { parent: self.id() };
        let host = self.last_child().ok_or(missing)?;
        let switch = host.switch_node().ok_or(missing)?;
        if switch.is_closed() {
            return Err(missing);
        }
        Ok((host, switch))
    }
}

#[cfg(test)]
#[path = "tests/switch_tests.rs"]
mod tests;

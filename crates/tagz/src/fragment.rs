//! Child lists rendered without a wrapping tag.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::Child;

/// A shared, appendable list of children with no tag of its own.
///
/// Inside a tag, a fragment's children render at the tag's child depth as if
/// they had been appended to the tag directly. Like [`Tag`](crate::Tag),
/// cloning a fragment yields another handle to the same list.
#[derive(Clone, Default)]
pub struct Fragment {
    children: Rc<RefCell<Vec<Child>>>,
}

impl Fragment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child in builder style.
    #[must_use]
    pub fn child(self, child: impl Into<Child>) -> Self {
        self.append(child);
        self
    }

    pub fn append(&self, child: impl Into<Child>) {
        self.children.borrow_mut().push(child.into());
    }

    pub fn extend<I>(&self, children: I)
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        self.children
            .borrow_mut()
            .extend(children.into_iter().map(Into::into));
    }

    /// Snapshot of the current children.
    #[must_use]
    pub fn children(&self) -> Vec<Child> {
        self.children.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Copy this fragment and everything below it into an independent tree.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let children = self.children.borrow().iter().map(Child::deep_copy).collect();
        Self {
            children: Rc::new(RefCell::new(children)),
        }
    }

    /// Whether both handles point at the same fragment.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.children, &other.children)
    }

    pub(crate) fn child_at(&self, index: usize) -> Option<Child> {
        self.children.borrow().get(index).cloned()
    }
}

impl<C: Into<Child>> FromIterator<C> for Fragment {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        let fragment = Self::new();
        fragment.extend(iter);
        fragment
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.children.try_borrow() {
            Ok(children) => f.debug_tuple("Fragment").field(&*children).finish(),
            Err(_) => f.write_str("Fragment(<borrowed>)"),
        }
    }
}

use alloc::{borrow::ToOwned as _, string::String, vec::Vec};
use core::cell::RefCell;

use crate::errors::CyclePath;

/// Keys under resolution in the current call chain, outermost first
#[derive(Default, Debug)]
pub(crate) struct ResolutionStack(Vec<String>);

impl ResolutionStack {
    /// Returns the cycle closed by getting `key` again, if the key is already being resolved
    #[must_use]
    pub(crate) fn cycle_path(&self, key: &str) -> Option<CyclePath> {
        let start = self.0.iter().position(|resolving| resolving == key)?;

        let mut path = Vec::with_capacity(self.0.len() - start + 1);
        path.extend(self.0[start..].iter().cloned());
        path.push(key.to_owned());

        Some(CyclePath(path.into_boxed_slice()))
    }

    #[cfg(test)]
    #[inline]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pushed key of the stack, popped on drop.
/// Unwinds the stack on every exit path of a resolution, errors and panics of user code included.
pub(crate) struct Frame<'a> {
    stack: &'a RefCell<ResolutionStack>,
}

impl<'a> Frame<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn push(stack: &'a RefCell<ResolutionStack>, key: &str) -> Self {
        stack.borrow_mut().0.push(key.to_owned());
        Self { stack }
    }
}

impl Drop for Frame<'_> {
    #[inline]
    fn drop(&mut self) {
        self.stack.borrow_mut().0.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, ResolutionStack};

    use alloc::string::ToString as _;
    use core::cell::RefCell;

    #[test]
    fn test_cycle_path() {
        let stack = RefCell::new(ResolutionStack::default());

        let _a = Frame::push(&stack, "a");
        let _b = Frame::push(&stack, "b");
        let _c = Frame::push(&stack, "c");

        assert!(stack.borrow().cycle_path("d").is_none());
        assert_eq!(stack.borrow().cycle_path("a").unwrap().to_string(), "a -> b -> c -> a");
        assert_eq!(stack.borrow().cycle_path("b").unwrap().to_string(), "b -> c -> b");
        assert_eq!(stack.borrow().cycle_path("c").unwrap().keys(), ["c", "c"]);
    }

    #[test]
    fn test_frame_pops_on_drop() {
        let stack = RefCell::new(ResolutionStack::default());
        {
            let _a = Frame::push(&stack, "a");
            {
                let _b = Frame::push(&stack, "b");
                assert!(stack.borrow().cycle_path("b").is_some());
            }
            assert!(stack.borrow().cycle_path("b").is_none());
            assert!(stack.borrow().cycle_path("a").is_some());
        }
        assert!(stack.borrow().is_empty());
    }
}

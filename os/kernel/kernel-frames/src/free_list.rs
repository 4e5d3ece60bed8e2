/// End-of-list marker.
const NIL: u32 = u32::MAX;

/// LIFO stack of free frame indices.
///
/// The links live in a parallel arena (`next[i]` is the index below `i` on
/// the stack) instead of inside the frames themselves, so the list never
/// touches frame memory and frame contents can be poisoned freely.
///
/// # Invariants
/// - Every index on the stack is `< N` and appears at most once.
/// - `len` equals the number of indices reachable from `head`.
pub(crate) struct FreeList<const N: usize> {
    next: [u32; N],
    head: u32,
    len: usize,
}

impl<const N: usize> FreeList<N> {
    pub(crate) const fn new() -> Self {
        Self {
            next: [NIL; N],
            head: NIL,
            len: 0,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn push(&mut self, index: u32) {
        debug_assert!((index as usize) < N);
        self.next[index as usize] = self.head;
        self.head = index;
        self.len += 1;
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<u32> {
        if self.head == NIL {
            return None;
        }
        let index = self.head;
        self.head = self.next[index as usize];
        self.next[index as usize] = NIL;
        self.len -= 1;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_pops_nothing() {
        let mut list = FreeList::<4>::new();
        assert_eq!(list.len(), 0);
        assert_eq!(list.pop(), None);
    }

    #[test]
    fn pops_in_reverse_push_order() {
        let mut list = FreeList::<8>::new();
        for i in [3, 0, 7] {
            list.push(i);
        }
        assert_eq!(list.len(), 3);
        assert_eq!(list.pop(), Some(7));
        assert_eq!(list.pop(), Some(0));
        list.push(5);
        assert_eq!(list.pop(), Some(5));
        assert_eq!(list.pop(), Some(3));
        assert_eq!(list.pop(), None);
        assert_eq!(list.len(), 0);
    }
}

/// Cursor over question indices, bounded to `0..len`.
///
/// Moves that would leave the range are no-ops. An empty quiz has no cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigator {
    current: Option<usize>,
    len: usize,
}

impl Navigator {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            current: (len > 0).then_some(0),
            len,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == Some(0)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current.is_some_and(|i| i + 1 == self.len)
    }

    /// Advance by one. Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        match self.current {
            Some(i) if i + 1 < self.len => {
                self.current = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    /// Step back by one. Returns whether the cursor moved.
    pub fn previous(&mut self) -> bool {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    /// Jump straight to `index`. Out-of-range targets are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let moved = self.current != Some(index);
        self.current = Some(index);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_navigator_has_no_cursor() {
        let mut nav = Navigator::new(0);
        assert_eq!(nav.current(), None);
        assert!(!nav.next());
        assert!(!nav.previous());
        assert!(!nav.jump_to(0));
        assert_eq!(nav.current(), None);
    }

    #[test]
    fn next_stops_at_last_question() {
        let mut nav = Navigator::new(3);
        assert!(nav.next());
        assert!(nav.next());
        assert!(nav.is_last());
        assert!(!nav.next());
        assert!(!nav.next());
        assert_eq!(nav.current(), Some(2));
    }

    #[test]
    fn previous_stops_at_first_question() {
        let mut nav = Navigator::new(3);
        assert!(nav.is_first());
        assert!(!nav.previous());
        assert_eq!(nav.current(), Some(0));
    }

    #[test]
    fn jump_ignores_out_of_range() {
        let mut nav = Navigator::new(5);
        assert!(nav.jump_to(3));
        assert_eq!(nav.current(), Some(3));
        assert!(!nav.jump_to(5));
        assert!(!nav.jump_to(usize::MAX));
        assert_eq!(nav.current(), Some(3));
        assert!(!nav.jump_to(3));
    }
}

use serde::Serialize;

/// Rows revealed initially and per `show_more`.
pub const PAGE_STEP: usize = 5;

/// Ordered results with a "show N more" cursor.
#[derive(Debug, Clone)]
pub struct ResultsPager<T> {
    items: Vec<T>,
    display_limit: usize,
}

impl<T> Default for ResultsPager<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            display_limit: PAGE_STEP,
        }
    }
}

impl<T> ResultsPager<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            display_limit: PAGE_STEP,
        }
    }

    /// Swaps in a new result set and rewinds the cursor.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.display_limit = PAGE_STEP;
    }

    /// Reveals the next step. A no-op once every row is visible, so the limit
    /// never runs past the last partial step.
    pub fn show_more(&mut self) {
        if self.has_more() {
            self.display_limit = self.display_limit.saturating_add(PAGE_STEP);
        }
    }

    pub fn visible(&self) -> &[T] {
        &self.items[..self.display_limit.min(self.items.len())]
    }

    pub fn has_more(&self) -> bool {
        self.display_limit < self.items.len()
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What a results view renders for the current cursor position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<'a, T: Serialize> {
    pub items: &'a [T],
    pub shown: usize,
    pub total: usize,
    pub has_more: bool,
}

impl<T: Serialize> ResultsPager<T> {
    pub fn view(&self) -> PageView<'_, T> {
        let items = self.visible();
        PageView {
            shown: items.len(),
            items,
            total: self.items.len(),
            has_more: self.has_more(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_items_reveal_in_steps_of_five() {
        let mut pager = ResultsPager::new((1..=12).collect::<Vec<u32>>());
        assert_eq!(pager.visible().len(), 5);
        assert!(pager.has_more());

        pager.show_more();
        assert_eq!(pager.visible().len(), 10);
        assert!(pager.has_more());

        pager.show_more();
        assert_eq!(pager.visible().len(), 12);
        assert_eq!(pager.visible().last(), Some(&12));
        assert!(!pager.has_more());
    }

    #[test]
    fn test_fewer_items_than_limit() {
        let pager = ResultsPager::new(vec!['a', 'b']);
        assert_eq!(pager.visible(), &['a', 'b']);
        assert!(!pager.has_more());
    }

    #[test]
    fn test_exactly_one_page_has_no_more() {
        let pager = ResultsPager::new(vec![0; PAGE_STEP]);
        assert!(!pager.has_more());
    }

    #[test]
    fn test_replace_resets_limit() {
        let mut pager = ResultsPager::new(vec![0u8; 20]);
        pager.show_more();
        pager.show_more();
        assert_eq!(pager.display_limit(), 15);

        pager.replace(vec![1u8; 8]);
        assert_eq!(pager.display_limit(), PAGE_STEP);
        assert_eq!(pager.visible().len(), 5);
    }

    #[test]
    fn test_show_more_stops_at_last_step() {
        let mut pager = ResultsPager::new((0..12).collect::<Vec<u8>>());
        for _ in 0..1_000 {
            pager.show_more();
        }
        assert_eq!(pager.display_limit(), 15);
        assert_eq!(pager.visible().len(), 12);

        let mut empty: ResultsPager<u8> = ResultsPager::default();
        empty.show_more();
        assert_eq!(empty.display_limit(), PAGE_STEP);
    }

    #[test]
    fn test_empty_pager() {
        let pager: ResultsPager<u8> = ResultsPager::default();
        assert!(pager.visible().is_empty());
        assert!(!pager.has_more());
        assert_eq!(pager.view().total, 0);
    }

    #[test]
    fn test_view_counts() {
        let mut pager = ResultsPager::new((0..7).collect::<Vec<u8>>());
        let view = pager.view();
        assert_eq!((view.shown, view.total, view.has_more), (5, 7, true));
        pager.show_more();
        let view = pager.view();
        assert_eq!((view.shown, view.total, view.has_more), (7, 7, false));
    }
}

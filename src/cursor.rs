use crate::models::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Empty,
    Positioned(usize),
}

/// Position within one search's results. Movement clamps at both ends.
#[derive(Debug, Clone)]
pub struct ResultCursor {
    results: Vec<SearchResult>,
    state: CursorState,
}

impl Default for ResultCursor {
    fn default() -> Self {
        ResultCursor {
            results: Vec::new(),
            state: CursorState::Empty,
        }
    }
}

impl ResultCursor {
    pub fn new(results: Vec<SearchResult>) -> Self {
        let state = if results.is_empty() {
            CursorState::Empty
        } else {
            CursorState::Positioned(0)
        };
        ResultCursor { results, state }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        match self.state {
            CursorState::Empty => None,
            CursorState::Positioned(index) => Some(index),
        }
    }

    pub fn current(&self) -> Option<&SearchResult> {
        self.index().and_then(|index| self.results.get(index))
    }

    /// Advances one result. Returns the new current result, or `None` when
    /// already at the last result (or empty), leaving the position unchanged.
    pub fn next(&mut self) -> Option<&SearchResult> {
        match self.state {
            CursorState::Positioned(index) if index + 1 < self.results.len() => {
                self.state = CursorState::Positioned(index + 1);
                self.current()
            }
            _ => None,
        }
    }

    /// Steps back one result; `None` at the first result or when empty.
    pub fn previous(&mut self) -> Option<&SearchResult> {
        match self.state {
            CursorState::Positioned(index) if index > 0 => {
                self.state = CursorState::Positioned(index - 1);
                self.current()
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.state = CursorState::Empty;
    }

    /// 1-based "i/total" label.
    pub fn position_label(&self) -> Option<String> {
        self.index()
            .map(|index| format!("{}/{}", index + 1, self.results.len()))
    }

    pub fn can_previous(&self) -> bool {
        matches!(self.state, CursorState::Positioned(index) if index > 0)
    }

    pub fn can_next(&self) -> bool {
        matches!(self.state, CursorState::Positioned(index) if index + 1 < self.results.len())
    }
}

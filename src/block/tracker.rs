use thiserror::Error;

use super::page::PageKind;

/// How close to the end a video position must get to count as watched.
pub const VIDEO_END_EPSILON_SECS: f64 = 0.5;

pub fn is_video_ended(position_secs: f64, duration_secs: f64) -> bool {
    duration_secs > 0.0 && position_secs >= duration_secs - VIDEO_END_EPSILON_SECS
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrackerError {
    #[error("page {index} is out of range, block has {page_count} pages")]
    OutOfRange { index: usize, page_count: usize },
}

/// A state change worth persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    PositionChanged(usize),
    PageCompleted(usize),
}

/// Per-page completion flags plus the current position in a block.
///
/// Operations return the transitions they caused; an operation that changes
/// nothing returns none, so observers never write twice for the same state.
/// Flags only ever go from pending to complete.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionTracker {
    kinds: Vec<PageKind>,
    flags: Vec<bool>,
    current: usize,
    last_visited: Option<usize>,
}

impl CompletionTracker {
    /// Builds the tracker from whatever was saved. A saved position outside
    /// the page range falls back to the first page; saved flags are cut or
    /// padded with `false` to the page count.
    pub fn restore(
        kinds: Vec<PageKind>,
        saved_position: Option<usize>,
        saved_flags: Option<Vec<bool>>,
    ) -> Self {
        let page_count = kinds.len();
        let current = saved_position.filter(|&p| p < page_count).unwrap_or(0);

        let mut flags = saved_flags.unwrap_or_default();
        flags.resize(page_count, false);

        Self {
            kinds,
            flags,
            current,
            last_visited: if page_count > 0 { Some(current) } else { None },
        }
    }

    pub fn page_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn last_visited(&self) -> Option<usize> {
        self.last_visited
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn kind(&self, index: usize) -> Option<PageKind> {
        self.kinds.get(index).copied()
    }

    pub fn is_complete(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// True when every page is complete.
    pub fn can_finish(&self) -> bool {
        self.flags.iter().all(|&f| f)
    }

    pub fn pending(&self) -> Vec<usize> {
        (0..self.flags.len()).filter(|&i| !self.flags[i]).collect()
    }

    fn check(&self, index: usize) -> Result<(), TrackerError> {
        if index >= self.page_count() {
            return Err(TrackerError::OutOfRange {
                index,
                page_count: self.page_count(),
            });
        }
        Ok(())
    }

    pub fn mark_complete(&mut self, index: usize) -> Result<Vec<Transition>, TrackerError> {
        self.check(index)?;
        if self.flags[index] {
            return Ok(vec![]);
        }
        self.flags[index] = true;
        Ok(vec![Transition::PageCompleted(index)])
    }

    /// Moves to `new_index`. Moving forward off a reading or video page
    /// completes that page; question pages only complete through an answer.
    pub fn navigate(&mut self, new_index: usize) -> Result<Vec<Transition>, TrackerError> {
        self.check(new_index)?;
        let mut transitions = Vec::new();

        if let Some(last) = self.last_visited {
            if new_index > last && self.kinds[last].completes_on_leave() {
                transitions.extend(self.mark_complete(last)?);
            }
        }

        self.last_visited = Some(new_index);
        if self.current != new_index {
            self.current = new_index;
            transitions.push(Transition::PositionChanged(new_index));
        }
        Ok(transitions)
    }

    /// Playback report for a video page; completes it once the end is reached.
    pub fn video_status(
        &mut self,
        index: usize,
        position_secs: f64,
        duration_secs: f64,
    ) -> Result<Vec<Transition>, TrackerError> {
        self.check(index)?;
        if self.kinds[index] == PageKind::Video && is_video_ended(position_secs, duration_secs) {
            return self.mark_complete(index);
        }
        Ok(vec![])
    }
}

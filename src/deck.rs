use std::collections::HashSet;
use std::rc::Rc;

use yew::Reducible;

use crate::catalog::Movie;

/// Remaining-card count at or below which a swipe requests the next page.
pub const LOW_WATER: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Discard the queue and install the results (initial load, filter
    /// change, liked-dismiss refresh).
    Replace,
    /// Append deduplicated results to the tail.
    Backfill,
}

pub enum DeckAction {
    FetchStarted { kind: FetchKind },
    FetchCompleted {
        kind: FetchKind,
        page: u32,
        movies: Vec<Movie>,
    },
    FetchFailed,
    /// Filters changed while a fetch was in flight; a page-1 Replace is
    /// owed as soon as that fetch settles.
    FiltersDirty,
    /// Card judged by the user; removed by id and marked seen.
    Swiped { id: u64 },
    /// A liked movie was dismissed, so it may appear in future fetches.
    Unseen { id: u64 },
    /// Start over: forget every judged movie.
    ResetSeen,
}

/// The candidate queue plus the session bookkeeping around it. The front
/// of the queue is the interactive card.
#[derive(Clone, PartialEq)]
pub struct DeckState {
    queue: Vec<Movie>,
    page: u32,
    fetch_pending: bool,
    filters_dirty: bool,
    /// Ids of every liked or passed movie. Excluded from fetch results.
    seen: HashSet<u64>,
}

impl DeckState {
    pub fn new() -> Self {
        Self::with_seen(HashSet::new())
    }

    /// Seeds the seen set, e.g. from the persisted liked list.
    pub fn with_seen(seen: HashSet<u64>) -> Self {
        Self {
            queue: Vec::new(),
            page: 1,
            fetch_pending: false,
            filters_dirty: false,
            seen,
        }
    }

    pub fn queue(&self) -> &[Movie] {
        &self.queue
    }

    pub fn top(&self) -> Option<&Movie> {
        self.queue.first()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn fetch_pending(&self) -> bool {
        self.fetch_pending
    }

    pub fn filters_dirty(&self) -> bool {
        self.filters_dirty
    }

    /// A filter change was latched while a fetch was in flight and that
    /// fetch has settled: the page-1 Replace is due now.
    pub fn deferred_replace_due(&self) -> bool {
        !self.fetch_pending && self.filters_dirty
    }

    pub fn is_seen(&self, id: u64) -> bool {
        self.seen.contains(&id)
    }

    /// Empty with nothing in flight: offer the reset action.
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty() && !self.fetch_pending
    }

    /// Whether the swipe being dispatched right now should also request a
    /// backfill page. Evaluated against the pre-removal queue, so the
    /// pending removal is accounted for here.
    pub fn backfill_due_after_swipe(&self) -> bool {
        !self.fetch_pending && self.queue.len().saturating_sub(1) <= LOW_WATER
    }
}

impl Default for DeckState {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducible for DeckState {
    type Action = DeckAction;

    fn reduce(self: Rc<Self>, action: DeckAction) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            DeckAction::FetchStarted { kind } => {
                next.fetch_pending = true;
                // A Replace always runs with the filters current at
                // dispatch, so it discharges any latched change.
                if kind == FetchKind::Replace {
                    next.filters_dirty = false;
                }
            }
            DeckAction::FetchFailed => {
                next.fetch_pending = false;
            }
            DeckAction::FiltersDirty => {
                next.filters_dirty = true;
            }
            DeckAction::FetchCompleted { kind, page, movies } => {
                next.fetch_pending = false;
                next.page = page;

                let mut ids: HashSet<u64> = match kind {
                    FetchKind::Replace => HashSet::new(),
                    FetchKind::Backfill => next.queue.iter().map(|m| m.id).collect(),
                };
                let fresh: Vec<Movie> = movies
                    .into_iter()
                    .filter(|movie| !next.seen.contains(&movie.id) && ids.insert(movie.id))
                    .collect();

                match kind {
                    FetchKind::Replace => next.queue = fresh,
                    FetchKind::Backfill => next.queue.extend(fresh),
                }
            }
            DeckAction::Swiped { id } => {
                next.queue.retain(|movie| movie.id != id);
                next.seen.insert(id);
            }
            DeckAction::Unseen { id } => {
                next.seen.remove(&id);
            }
            DeckAction::ResetSeen => {
                next.seen.clear();
            }
        }
        Rc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            year: Some(2000 + id as i32),
            genre: "Drama".to_owned(),
            genres: vec!["Drama".to_owned()],
            rating: "7.0".to_owned(),
            poster: format!("https://image.example/{}.jpg", id),
            description: "A film.".to_owned(),
        }
    }

    fn movies(ids: std::ops::Range<u64>) -> Vec<Movie> {
        ids.map(movie).collect()
    }

    fn apply(state: Rc<DeckState>, action: DeckAction) -> Rc<DeckState> {
        state.reduce(action)
    }

    #[test]
    fn completed_fetch_never_contains_seen_ids() {
        let seen: HashSet<u64> = [2, 4].into_iter().collect();
        let state = Rc::new(DeckState::with_seen(seen));
        let state = apply(state, DeckAction::FetchStarted { kind: FetchKind::Replace });
        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(1..6),
            },
        );

        let ids: Vec<u64> = state.queue().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert!(!state.fetch_pending());
    }

    #[test]
    fn backfill_appends_without_duplicating_queue() {
        let state = Rc::new(DeckState::new());
        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(1..4),
            },
        );
        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Backfill,
                page: 2,
                movies: movies(3..7),
            },
        );

        let ids: Vec<u64> = state.queue().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn replace_discards_the_previous_queue() {
        let state = Rc::new(DeckState::new());
        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(1..5),
            },
        );
        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(10..12),
            },
        );

        let ids: Vec<u64> = state.queue().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn duplicate_ids_within_a_batch_are_collapsed() {
        let mut batch = movies(1..3);
        batch.push(movie(1));
        let state = apply(
            Rc::new(DeckState::new()),
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: batch,
            },
        );
        assert_eq!(state.queue().len(), 2);
    }

    #[test]
    fn swipe_removes_by_id_and_marks_seen() {
        let state = apply(
            Rc::new(DeckState::new()),
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(1..4),
            },
        );
        // Rapid swipes target ids, so order of arrival cannot remove the
        // wrong card.
        let state = apply(state, DeckAction::Swiped { id: 2 });
        let state = apply(state, DeckAction::Swiped { id: 1 });

        let ids: Vec<u64> = state.queue().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3]);
        assert!(state.is_seen(1));
        assert!(state.is_seen(2));
        assert!(!state.is_seen(3));
    }

    #[test]
    fn eleventh_card_swipe_triggers_exactly_one_backfill() {
        let state = apply(
            Rc::new(DeckState::new()),
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(1..12),
            },
        );
        assert_eq!(state.queue().len(), 11);

        // 11 -> 10 remaining: backfill due.
        assert!(state.backfill_due_after_swipe());
        let state = apply(state, DeckAction::Swiped { id: 1 });
        let state = apply(state, DeckAction::FetchStarted { kind: FetchKind::Backfill });

        // A second swipe before the fetch resolves requests nothing.
        assert!(!state.backfill_due_after_swipe());
        let state = apply(state, DeckAction::Swiped { id: 2 });
        assert!(!state.backfill_due_after_swipe());
        assert_eq!(state.queue().len(), 9);
    }

    #[test]
    fn above_low_water_no_backfill_is_due() {
        let state = apply(
            Rc::new(DeckState::new()),
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(1..20),
            },
        );
        assert!(!state.backfill_due_after_swipe());
    }

    #[test]
    fn unseen_allows_a_movie_to_return() {
        let state = apply(Rc::new(DeckState::new()), DeckAction::Swiped { id: 7 });
        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(7..9),
            },
        );
        assert_eq!(state.queue().len(), 1);

        let state = apply(state, DeckAction::Unseen { id: 7 });
        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(7..9),
            },
        );
        let ids: Vec<u64> = state.queue().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![7, 8]);
    }

    #[test]
    fn reset_clears_the_seen_set() {
        let state = apply(Rc::new(DeckState::new()), DeckAction::Swiped { id: 1 });
        let state = apply(state, DeckAction::Swiped { id: 2 });
        let state = apply(state, DeckAction::ResetSeen);
        assert!(!state.is_seen(1));
        assert!(!state.is_seen(2));
        assert!(state.is_exhausted());
    }

    #[test]
    fn exhausted_only_when_idle() {
        let state = Rc::new(DeckState::new());
        assert!(state.is_exhausted());
        let state = apply(state, DeckAction::FetchStarted { kind: FetchKind::Replace });
        assert!(!state.is_exhausted());
        let state = apply(state, DeckAction::FetchFailed);
        assert!(state.is_exhausted());
    }

    #[test]
    fn filter_change_during_fetch_owes_one_replace() {
        let state = apply(
            Rc::new(DeckState::new()),
            DeckAction::FetchStarted { kind: FetchKind::Backfill },
        );
        let state = apply(state, DeckAction::FiltersDirty);
        assert!(state.filters_dirty());
        assert!(!state.deferred_replace_due());

        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Backfill,
                page: 2,
                movies: movies(1..3),
            },
        );
        assert!(state.deferred_replace_due());

        // Issuing the owed Replace discharges the latch.
        let state = apply(state, DeckAction::FetchStarted { kind: FetchKind::Replace });
        assert!(!state.filters_dirty());
        let state = apply(
            state,
            DeckAction::FetchCompleted {
                kind: FetchKind::Replace,
                page: 1,
                movies: movies(10..12),
            },
        );
        assert!(!state.deferred_replace_due());
    }

    #[test]
    fn latched_filter_change_survives_a_failed_fetch() {
        let state = apply(
            Rc::new(DeckState::new()),
            DeckAction::FetchStarted { kind: FetchKind::Replace },
        );
        let state = apply(state, DeckAction::FiltersDirty);
        let state = apply(state, DeckAction::FetchFailed);
        assert!(state.deferred_replace_due());
    }
}

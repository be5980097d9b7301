use crate::catalog::Movie;

/// Earliest selectable release year, as exposed by the range controls.
pub const YEAR_FLOOR: i32 = 1992;

/// Catalog-side filter state: selected genre tags plus an inclusive
/// release-year range. Any change re-queries the catalog at page 1.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub genres: Vec<String>,
    pub year_from: i32,
    pub year_to: i32,
}

impl FilterState {
    pub fn new(current_year: i32) -> Self {
        Self {
            genres: Vec::new(),
            year_from: YEAR_FLOOR,
            year_to: current_year,
        }
    }

    /// Selecting an already-selected tag deselects it.
    pub fn toggle_genre(&mut self, name: &str) {
        if let Some(pos) = self.genres.iter().position(|g| g == name) {
            self.genres.remove(pos);
        } else {
            self.genres.push(name.to_owned());
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.genres.iter().any(|g| g == name)
    }

    // The bounds are independently adjustable and deliberately not
    // reordered: a from above to is passed through to the catalog, which
    // then returns an empty page.
    pub fn set_year_from(&mut self, year: i32) {
        self.year_from = year;
    }

    pub fn set_year_to(&mut self, year: i32) {
        self.year_to = year;
    }
}

/// Local filters for the liked panel. No network involvement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LikedViewFilter {
    pub genres: Vec<String>,
    /// Unset bounds leave that side of the range unconstrained.
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

impl LikedViewFilter {
    /// Genre test (any overlap with the selection) AND year test
    /// (inclusive range; unknown years fail an active range).
    pub fn matches(&self, movie: &Movie) -> bool {
        let genre_ok = self.genres.is_empty()
            || movie.genres.iter().any(|g| self.genres.contains(g));

        let year_ok = if self.year_from.is_none() && self.year_to.is_none() {
            true
        } else {
            match movie.year {
                None => false,
                Some(year) => {
                    self.year_from.map_or(true, |from| year >= from)
                        && self.year_to.map_or(true, |to| year <= to)
                }
            }
        };

        genre_ok && year_ok
    }

    pub fn toggle_genre(&mut self, name: &str) {
        if let Some(pos) = self.genres.iter().position(|g| g == name) {
            self.genres.remove(pos);
        } else {
            self.genres.push(name.to_owned());
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.genres.iter().any(|g| g == name)
    }

    pub fn is_unfiltered(&self) -> bool {
        self.genres.is_empty() && self.year_from.is_none() && self.year_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(year: Option<i32>, genres: &[&str]) -> Movie {
        Movie {
            id: 1,
            title: "Movie".to_owned(),
            year,
            genre: genres.first().unwrap_or(&"Unknown").to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            rating: "7.0".to_owned(),
            poster: "https://image.example/p.jpg".to_owned(),
            description: "A film.".to_owned(),
        }
    }

    #[test]
    fn toggle_selects_and_deselects() {
        let mut filters = FilterState::new(2026);
        filters.toggle_genre("Comedy");
        assert!(filters.is_selected("Comedy"));
        filters.toggle_genre("Comedy");
        assert!(!filters.is_selected("Comedy"));
    }

    #[test]
    fn default_range_spans_floor_to_current_year() {
        let filters = FilterState::new(2026);
        assert_eq!(filters.year_from, YEAR_FLOOR);
        assert_eq!(filters.year_to, 2026);
    }

    #[test]
    fn inverted_range_is_preserved() {
        let mut filters = FilterState::new(2026);
        filters.set_year_from(2020);
        filters.set_year_to(2005);
        assert_eq!((filters.year_from, filters.year_to), (2020, 2005));
    }

    #[test]
    fn empty_liked_filter_matches_everything() {
        let filter = LikedViewFilter::default();
        assert!(filter.is_unfiltered());
        assert!(filter.matches(&movie(Some(1999), &["Horror"])));
        assert!(filter.matches(&movie(None, &[])));
    }

    #[test]
    fn genre_match_needs_any_overlap() {
        let mut filter = LikedViewFilter::default();
        filter.toggle_genre("Romance");
        filter.toggle_genre("Comedy");
        assert!(filter.matches(&movie(Some(2000), &["Drama", "Comedy"])));
        assert!(!filter.matches(&movie(Some(2000), &["Drama"])));
    }

    #[test]
    fn year_bounds_are_inclusive_and_unknown_fails() {
        let filter = LikedViewFilter {
            genres: Vec::new(),
            year_from: Some(2010),
            year_to: Some(2020),
        };
        assert!(filter.matches(&movie(Some(2010), &[])));
        assert!(filter.matches(&movie(Some(2020), &[])));
        assert!(!filter.matches(&movie(Some(2009), &[])));
        assert!(!filter.matches(&movie(None, &[])));
    }

    #[test]
    fn single_ended_ranges_apply() {
        let filter = LikedViewFilter {
            genres: Vec::new(),
            year_from: Some(2010),
            year_to: None,
        };
        assert!(filter.matches(&movie(Some(2024), &[])));
        assert!(!filter.matches(&movie(Some(2005), &[])));
        assert!(!filter.matches(&movie(None, &[])));
    }
}

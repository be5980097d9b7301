use std::collections::HashSet;

use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use log::warn;

use crate::catalog::Movie;
use crate::filters::LikedViewFilter;

const STORAGE_KEY: &str = "movit-liked-movies";

/// The persisted liked list. Every mutation is written back in full.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LikedStore {
    movies: Vec<Movie>,
}

impl LikedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_movies(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    /// Reads the list from local storage, falling back to empty.
    pub fn load() -> Self {
        match LocalStorage::get::<Vec<Movie>>(STORAGE_KEY) {
            Ok(movies) => Self { movies },
            Err(StorageError::KeyNotFound(_)) => Self::new(),
            Err(err) => {
                warn!("Falling back to an empty liked list: {}", err);
                Self::new()
            }
        }
    }

    /// Serializes the entire list. Called after every mutation.
    pub fn save(&self) {
        if let Err(err) = LocalStorage::set(STORAGE_KEY, &self.movies) {
            warn!("Failed to persist liked movies: {}", err);
        }
    }

    /// Appends unless the id is already present. Returns whether the
    /// list changed, so dismiss-then-relike never duplicates an entry.
    pub fn add(&mut self, movie: Movie) -> bool {
        if self.contains(movie.id) {
            return false;
        }
        self.movies.push(movie);
        true
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.movies.len();
        self.movies.retain(|movie| movie.id != id);
        self.movies.len() != before
    }

    pub fn contains(&self, id: u64) -> bool {
        self.movies.iter().any(|movie| movie.id == id)
    }

    pub fn ids(&self) -> HashSet<u64> {
        self.movies.iter().map(|movie| movie.id).collect()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Local, network-free view through the liked-panel filters.
    pub fn filtered<'a>(&'a self, filter: &LikedViewFilter) -> Vec<&'a Movie> {
        self.movies
            .iter()
            .filter(|movie| filter.matches(movie))
            .collect()
    }
}

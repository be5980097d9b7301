use gloo_net::http::Request;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TMDB_API_KEY: &str = "4cfb4198db483f1580100dea9f909e47";
const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

pub const NO_DESCRIPTION: &str = "No description available.";
pub const UNKNOWN_GENRE: &str = "Unknown";
pub const RATING_UNAVAILABLE: &str = "N/A";

/// TMDB genre enumeration. Ids are assigned by the catalog and stable.
const GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES.iter().find(|(gid, _)| *gid == id).map(|(_, name)| *name)
}

pub fn genre_id(name: &str) -> Option<u32> {
    GENRES.iter().find(|(_, gname)| *gname == name).map(|(gid, _)| *gid)
}

/// All genre names, alphabetical, for the filter panel.
pub fn available_genres() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = GENRES.iter().map(|(_, name)| *name).collect();
    names.sort_unstable();
    names
}

/// A normalized catalog record. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    /// None when the catalog has no release date.
    pub year: Option<i32>,
    /// Primary genre shown on compact views.
    pub genre: String,
    pub genres: Vec<String>,
    /// Pre-formatted to one decimal, or "N/A".
    pub rating: String,
    /// Full poster URL.
    pub poster: String,
    pub description: String,
}

impl Movie {
    pub fn year_label(&self) -> String {
        match self.year {
            Some(year) => year.to_string(),
            None => "Unknown".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Option<Vec<u32>>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    results: Vec<RawMovie>,
}

/// Why a raw record was excluded from the normalized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    MissingPoster,
}

/// Normalizes a raw record, or rejects it outright. Records without a
/// poster are dropped rather than given a placeholder.
pub fn normalize(raw: RawMovie) -> Result<Movie, Rejected> {
    let poster_path = match raw.poster_path.filter(|path| !path.is_empty()) {
        Some(path) => path,
        None => return Err(Rejected::MissingPoster),
    };

    let year = raw
        .release_date
        .as_deref()
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse::<i32>().ok());

    let genres: Vec<String> = raw
        .genre_ids
        .unwrap_or_default()
        .into_iter()
        .filter_map(genre_name)
        .map(str::to_owned)
        .collect();

    let genre = genres
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_GENRE.to_owned());

    let rating = match raw.vote_average.filter(|avg| *avg > 0.0) {
        Some(avg) => format!("{:.1}", avg),
        None => RATING_UNAVAILABLE.to_owned(),
    };

    let description = raw
        .overview
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_owned());

    Ok(Movie {
        id: raw.id,
        title: raw.title,
        year,
        genre,
        genres,
        rating,
        poster: format!("{}{}", TMDB_IMAGE_BASE_URL, poster_path),
        description,
    })
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0} from catalog")]
    Status(u16),
    #[error("malformed catalog response: {0}")]
    Parse(String),
}

/// One page of the discover endpoint, most-popular-first.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverQuery {
    pub page: u32,
    pub genres: Vec<String>,
    pub year_from: i32,
    pub year_to: i32,
}

impl DiscoverQuery {
    pub fn url(&self) -> String {
        let mut url = format!(
            "{}/discover/movie?api_key={}&sort_by=popularity.desc&page={}",
            TMDB_BASE_URL, TMDB_API_KEY, self.page
        );

        let genre_ids: Vec<String> = self
            .genres
            .iter()
            .filter_map(|name| genre_id(name))
            .map(|id| id.to_string())
            .collect();
        if !genre_ids.is_empty() {
            url.push_str("&with_genres=");
            url.push_str(&genre_ids.join(","));
        }

        url.push_str(&format!(
            "&primary_release_date.gte={}-01-01&primary_release_date.lte={}-12-31",
            self.year_from, self.year_to
        ));

        url
    }
}

pub async fn discover(query: &DiscoverQuery) -> Result<Vec<Movie>, CatalogError> {
    let url = query.url();
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|err| CatalogError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(CatalogError::Status(response.status()));
    }

    let text = response
        .text()
        .await
        .map_err(|err| CatalogError::Network(err.to_string()))?;
    let parsed: DiscoverResponse =
        serde_json::from_str(&text).map_err(|err| CatalogError::Parse(err.to_string()))?;

    let total = parsed.results.len();
    let movies: Vec<Movie> = parsed
        .results
        .into_iter()
        .filter_map(|raw| normalize(raw).ok())
        .collect();

    if movies.len() < total {
        log::debug!(
            "dropped {} of {} records without posters (page {})",
            total - movies.len(),
            total,
            query.page
        );
    }

    Ok(movies)
}

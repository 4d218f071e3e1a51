//! The item type shared by every section of the home screen.
//!
//! `Movie` is what a feed delivers and what the rendering layer displays.  Only
//! two fields come from upstream; the poster URL is derived from the stored
//! relative path on first use and then cached for the lifetime of the value.

use std::fmt;

use once_cell::sync::OnceCell;

/// Prefix the image host expects in front of every relative poster path.
///
/// The concatenation `POSTER_IMAGE_BASE_URL + poster_path` must stay exactly
/// as is for the image host to resolve it.
pub const POSTER_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w342/";

/// A single movie entry.
///
/// Immutable once constructed.  Equality only looks at the upstream fields,
/// never at whether the poster URL has been computed yet.
#[derive(Clone)]
pub struct Movie {
    title: String,
    poster_path: String,
    poster_url: OnceCell<String>,
}

impl Movie {
    pub fn new(title: impl Into<String>, poster_path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            poster_path: poster_path.into(),
            poster_url: OnceCell::new(),
        }
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Relative poster path as stored upstream (may be empty).
    pub fn poster_path(&self) -> &str {
        &self.poster_path
    }

    /// Absolute poster URL, computed on first access.
    pub fn poster_url(&self) -> &str {
        self.poster_url
            .get_or_init(|| format!("{POSTER_IMAGE_BASE_URL}{}", self.poster_path))
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.poster_path == other.poster_path
    }
}

impl Eq for Movie {}

impl fmt::Debug for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Movie")
            .field("title", &self.title)
            .field("poster_path", &self.poster_path)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poster_url_is_base_prefix_plus_path() {
        let movie = Movie::new("A", "p1");
        assert_eq!(movie.poster_url(), "https://image.tmdb.org/t/p/w342/p1");
    }

    #[test]
    fn poster_url_keeps_leading_slash_of_path() {
        // TMDB paths usually start with '/'; the rule is plain concatenation.
        let movie = Movie::new("A", "/abc.jpg");
        assert_eq!(movie.poster_url(), "https://image.tmdb.org/t/p/w342//abc.jpg");
    }

    #[test]
    fn poster_url_is_cached_after_first_access() {
        let movie = Movie::new("A", "p1");
        let first = movie.poster_url().as_ptr();
        let second = movie.poster_url().as_ptr();
        assert_eq!(first, second, "same cached string on every call");
    }

    #[test]
    fn equality_ignores_poster_cache() {
        let resolved = Movie::new("A", "p1");
        let _ = resolved.poster_url();
        let fresh = Movie::new("A", "p1");
        assert_eq!(resolved, fresh);
        assert_ne!(resolved, Movie::new("A", "p2"));
    }
}

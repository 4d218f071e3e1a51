//! Identifiers for the independently tracked lists on the home screen.

use std::fmt;

use clap::ValueEnum;

/// A movie genre that can be shown as its own section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Drama,
    Horror,
    ScienceFiction,
}

impl Genre {
    /// Genre identifier used by the TMDB discover endpoint.
    pub fn tmdb_id(self) -> u32 {
        match self {
            Genre::Action => 28,
            Genre::Adventure => 12,
            Genre::Animation => 16,
            Genre::Comedy => 35,
            Genre::Drama => 18,
            Genre::Horror => 27,
            Genre::ScienceFiction => 878,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Horror => "Horror",
            Genre::ScienceFiction => "Science Fiction",
        }
    }
}

/// One tracked list: the top-rated list or a single genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    TopRated,
    Genre(Genre),
}

impl Section {
    /// The home screen layout: top rated first, then each genre in the order
    /// given.  Repeated genres are only tracked once.
    pub fn home(genres: &[Genre]) -> Vec<Section> {
        let mut sections = vec![Section::TopRated];
        for genre in genres {
            let section = Section::Genre(*genre);
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
        sections
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::TopRated => "Top Rated",
            Section::Genre(genre) => genre.title(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

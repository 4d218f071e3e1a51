//! Command-line and environment configuration.

use std::time::Duration;

use clap::Parser;

use crate::source::{Genre, DEFAULT_BASE_URL};

#[derive(Debug, Parser)]
#[command(name = "movies-home")]
#[command(about = "Live-updating movie home screen for the terminal", long_about = None)]
pub struct Cli {
    /// TMDB v3 API key
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// TMDB API root
    #[arg(long, env = "TMDB_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Genres shown after the top-rated list, in order
    #[arg(long = "genre", value_enum, value_delimiter = ',', default_value = "action,animation")]
    pub genres: Vec<Genre>,

    /// Seconds between automatic refreshes (0 = only at start and on demand)
    #[arg(long, default_value_t = 0)]
    pub refresh_interval: u64,

    /// How long the home state keeps running after the screen stops
    /// observing it, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub grace_ms: u64,
}

impl Cli {
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval > 0).then(|| Duration::from_secs(self.refresh_interval))
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["movies-home", "--api-key", "k"]).unwrap();

        assert_eq!(cli.api_key, "k");
        assert_eq!(cli.genres, vec![Genre::Action, Genre::Animation]);
        assert_eq!(cli.refresh_interval(), None);
        assert_eq!(cli.grace(), Duration::from_secs(5));
    }

    #[test]
    fn genres_accept_commas_and_repeats() {
        let cli = Cli::try_parse_from([
            "movies-home",
            "--api-key",
            "k",
            "--genre",
            "comedy,drama",
            "--genre",
            "science-fiction",
        ])
        .unwrap();

        assert_eq!(
            cli.genres,
            vec![Genre::Comedy, Genre::Drama, Genre::ScienceFiction]
        );
    }

    #[test]
    fn refresh_interval_in_seconds() {
        let cli =
            Cli::try_parse_from(["movies-home", "--api-key", "k", "--refresh-interval", "90"])
                .unwrap();
        assert_eq!(cli.refresh_interval(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn unknown_genre_is_rejected() {
        let result = Cli::try_parse_from(["movies-home", "--api-key", "k", "--genre", "musical"]);
        assert!(result.is_err());
    }
}

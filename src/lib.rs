//! movies-home — a live-updating movie home screen for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ raw feed ┌────────────┐ Outcome ┌──────────────┐ snapshot ┌─────────┐
//! │ source/   │ ───────► │ outcome.rs │ ──────► │ aggregator.rs│ ───────► │ app/ui  │
//! │ (TMDB)    │          │  (lift)    │         │ (combine)    │          │ (render)│
//! └───────────┘          └────────────┘         └──────────────┘          └─────────┘
//!       ▲                                              ▲
//!       │ refresh triggers                             │ is_refreshing / is_error
//!       └────────────────── refresh.rs ────────────────┘
//! ```
//!
//! * **`source/`** — the `MovieRepository` trait, the `Movie` item and the
//!   TMDB implementation.
//! * **`outcome`** — lifts each raw feed into `Loading | Success | Error`.
//! * **`home_state`** — the immutable `HomeUiState` snapshot.
//! * **`aggregator`** — recombines every input into one shared, replay-latest
//!   snapshot stream that only runs while observed.
//! * **`home`** — the view model wiring sections to the aggregator.
//! * **`refresh`** — background refresh controller driving the UI flags.
//! * **`app`**, **`ui`**, **`input`** — terminal state, drawing and keys.
//! * **`config`**, **`logging`** — command line and log file setup.

pub mod aggregator;
pub mod app;
pub mod config;
pub mod home;
pub mod home_state;
pub mod input;
pub mod logging;
pub mod outcome;
pub mod refresh;
pub mod source;
pub mod ui;

//! Chess rules engine with a small [Minimax] search.
//!
//! The library is split into the rules of the game ([`chess`]), static
//! position evaluation ([`evaluation`]) and the search that picks moves for an
//! automated player ([`search`]). [`Engine`] drives them through a
//! line-oriented protocol.
//!
//! [Minimax]: https://www.chessprogramming.org/Minimax

// Rustdoc lints that are not configured in Cargo.toml.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::bare_urls
)]

pub mod chess;
pub mod evaluation;
pub mod search;

mod engine;
pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
#[must_use]
pub fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the engine version and the build on startup.
///
/// Goes to stderr: stdout is reserved for the protocol.
pub fn print_engine_info() {
    eprintln!("Rush chess engine {}", engine_version());
    eprintln!("Release build: {}", !shadow_rs::is_debug());
    if !shadow_rs::git_clean() {
        eprintln!("Warning: built with uncommitted changes");
    }
}

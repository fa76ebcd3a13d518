//! Library selection by approximate name.
//!
//! Names are compared with a normalized edit distance: `1.0` for identical
//! strings (ignoring case), towards `0.0` as they diverge.

use crate::config::{MatchConfig, MetaConfig};
use crate::webapi::WebApiClient;
use crate::{MetaExtError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

/// Source of recently opened libraries and a way to switch between them.
#[async_trait]
pub trait LibraryHistory: Send + Sync {
    /// Library paths, most recent first.
    async fn history(&self) -> Result<Vec<String>>;

    /// Ask the host application to open `library_path`.
    async fn switch_to(&self, library_path: &str) -> Result<Value>;
}

#[async_trait]
impl LibraryHistory for WebApiClient {
    async fn history(&self) -> Result<Vec<String>> {
        self.library().history().await
    }

    async fn switch_to(&self, library_path: &str) -> Result<Value> {
        self.library().switch(library_path).await
    }
}

/// Case-insensitive similarity in `[0, 1]` based on Levenshtein distance.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - strsim::levenshtein(&a, &b) as f64 / max_len as f64
}

/// Last path component of a library path, e.g. `Art.library`.
///
/// Both `/` and `\` are treated as separators.
pub fn library_basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

/// Basename of a library path without the `.library` suffix.
pub fn library_display_name(path: &str) -> &str {
    let base = library_basename(path);
    base.strip_suffix(MetaConfig::LIBRARY_SUFFIX).unwrap_or(base)
}

/// A scored library candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryMatch {
    pub path: String,
    pub name: String,
    pub score: f64,
}

/// Score every library against `query`, best first.
///
/// Among equal scores the later history entry comes first.
pub fn score_libraries(query: &str, libraries: &[String]) -> Vec<LibraryMatch> {
    let mut matches: Vec<LibraryMatch> = libraries
        .iter()
        .map(|path| {
            let name = library_display_name(path);
            LibraryMatch {
                path: path.clone(),
                name: name.to_string(),
                score: similarity(query, name),
            }
        })
        .collect();
    // Stable sort over the reversed history puts the last maximum first.
    matches.reverse();
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

/// Scores for every library in the host's history.
pub async fn closest_library<H>(api: &H, query: &str) -> Result<Vec<LibraryMatch>>
where
    H: LibraryHistory + ?Sized,
{
    let history = api.history().await?;
    Ok(score_libraries(query, &history))
}

/// Switch the host application to the library best matching `query`.
///
/// With `exact`, only a library whose basename (e.g. `Art.library`) equals
/// `query` is considered, and `Ok(None)` is returned when there is
/// none. Otherwise the best candidate must score above `threshold`
/// (see [`MatchConfig::DEFAULT_THRESHOLD`]).
pub async fn switch_library<H>(
    api: &H,
    query: &str,
    exact: bool,
    threshold: f64,
) -> Result<Option<Value>>
where
    H: LibraryHistory + ?Sized,
{
    if exact {
        let history = api.history().await?;
        let found = history.iter().find(|path| library_basename(path) == query);
        return match found {
            Some(path) => {
                info!("Switching to library {}", path);
                api.switch_to(path).await.map(Some)
            }
            None => {
                debug!("No library named {:?} in history", query);
                Ok(None)
            }
        };
    }

    let scores = closest_library(api, query).await?;
    for candidate in &scores {
        debug!("{:>6.3}  {}", candidate.score, candidate.path);
    }

    match scores.first() {
        Some(best) if best.score > threshold => {
            info!(
                "Switching to library {} (score {:.3} for {:?})",
                best.path, best.score, query
            );
            api.switch_to(&best.path).await.map(Some)
        }
        _ => Err(MetaExtError::LibraryNotFound {
            query: query.to_string(),
        }),
    }
}

/// [`switch_library`] with fuzzy matching and the default threshold.
pub async fn switch_to_closest<H>(api: &H, query: &str) -> Result<Option<Value>>
where
    H: LibraryHistory + ?Sized,
{
    switch_library(api, query, false, MatchConfig::DEFAULT_THRESHOLD).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeHistory {
        libraries: Vec<String>,
        switched: Mutex<Vec<String>>,
    }

    impl FakeHistory {
        fn new(libraries: &[&str]) -> Self {
            Self {
                libraries: libraries.iter().map(|s| s.to_string()).collect(),
                switched: Mutex::new(Vec::new()),
            }
        }

        fn switched(&self) -> Vec<String> {
            self.switched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LibraryHistory for FakeHistory {
        async fn history(&self) -> Result<Vec<String>> {
            Ok(self.libraries.clone())
        }

        async fn switch_to(&self, library_path: &str) -> Result<Value> {
            self.switched.lock().unwrap().push(library_path.to_string());
            Ok(json!({ "libraryPath": library_path }))
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("Photos", "photos"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert!(approx(similarity("kitten", "sitting"), 1.0 - 3.0 / 7.0));
        assert!(approx(similarity("artlib", "MyArtLib"), 0.75));
    }

    #[test]
    fn test_similarity_counts_chars_not_bytes() {
        assert!(approx(similarity("café", "cafe"), 0.75));
    }

    #[test]
    fn test_library_display_name() {
        assert_eq!(library_display_name("/Users/me/Art.library"), "Art");
        assert_eq!(library_display_name("/Users/me/Art.library/"), "Art");
        assert_eq!(library_display_name(r"D:\Libraries\Work.library"), "Work");
        assert_eq!(library_display_name("Plain"), "Plain");
        assert_eq!(library_basename("/Users/me/Art.library/"), "Art.library");
    }

    #[test]
    fn test_score_libraries_ordering() {
        let libraries = vec![
            "/libs/Other.library".to_string(),
            "/libs/art-library.library".to_string(),
            "/libs/MyArtLib.library".to_string(),
        ];
        let scores = score_libraries("artlib", &libraries);

        let names: Vec<&str> = scores.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["MyArtLib", "art-library", "Other"]);
        assert!(approx(scores[0].score, 0.75));
        assert!(approx(scores[1].score, 6.0 / 11.0));
        assert!(approx(scores[2].score, 1.0 / 6.0));

        let exact = score_libraries("Other", &libraries);
        assert_eq!(exact[0].name, "Other");
        assert_eq!(exact[0].score, 1.0);
    }

    #[test]
    fn test_score_ties_prefer_later_history_entry() {
        let libraries = vec!["/a/abcx.library".to_string(), "/b/abcy.library".to_string()];
        let scores = score_libraries("abc", &libraries);
        assert_eq!(scores[0].path, "/b/abcy.library");
        assert_eq!(scores[1].path, "/a/abcx.library");
    }

    #[tokio::test]
    async fn test_switch_library_tie_picks_later_entry() {
        let api = FakeHistory::new(&["/a/abcx.library", "/b/abcy.library"]);

        switch_library(&api, "abc", false, 0.5).await.unwrap();
        assert_eq!(api.switched(), vec!["/b/abcy.library"]);
    }

    #[tokio::test]
    async fn test_switch_library_fuzzy() {
        let api = FakeHistory::new(&["/libs/Other.library", "/libs/MyArtLib.library"]);

        let result = switch_to_closest(&api, "artlib").await.unwrap();
        assert_eq!(result, Some(json!({ "libraryPath": "/libs/MyArtLib.library" })));
        assert_eq!(api.switched(), vec!["/libs/MyArtLib.library"]);
    }

    #[tokio::test]
    async fn test_switch_library_below_threshold() {
        let api = FakeHistory::new(&["/libs/Other.library"]);

        let err = switch_to_closest(&api, "artlib").await.unwrap_err();
        assert!(matches!(err, MetaExtError::LibraryNotFound { ref query } if query == "artlib"));
        assert!(api.switched().is_empty());

        let empty = FakeHistory::new(&[]);
        assert!(switch_to_closest(&empty, "artlib").await.is_err());
    }

    #[tokio::test]
    async fn test_switch_library_exact() {
        let api = FakeHistory::new(&["/libs/MyArtLib.library", "/libs/Art.library"]);

        assert_eq!(switch_library(&api, "art.library", true, 0.5).await.unwrap(), None);
        assert_eq!(switch_library(&api, "MyArtLib", true, 0.5).await.unwrap(), None);
        assert!(switch_library(&api, "Art.library", true, 0.5)
            .await
            .unwrap()
            .is_some());
        assert!(switch_library(&api, "MyArtLib.library", true, 0.5)
            .await
            .unwrap()
            .is_some());
        assert_eq!(
            api.switched(),
            vec!["/libs/Art.library", "/libs/MyArtLib.library"]
        );
    }
}

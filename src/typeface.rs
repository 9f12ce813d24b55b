//! Choosing the typeface for a build
//!
//! Candidates are tried in order and the first one the surface accepts wins.
//! When none can be registered the build falls back to Helvetica, which every
//! PDF viewer provides. Resolution never fails.

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::pdf::{DrawingSurface, HELVETICA};

/// Typeface used when no candidate is available
pub const FALLBACK_TYPEFACE: &str = HELVETICA;

/// A font to try: a name and a file path, which may be a glob pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontCandidate {
    pub name: String,
    pub path: String,
}

impl FontCandidate {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Parse a `NAME=PATH` specification
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
                Ok(Self::new(name.trim(), path.trim()))
            }
            _ => Err(Error::InvalidConfig(format!(
                "font must be given as NAME=PATH, got {:?}",
                spec
            ))),
        }
    }

    /// Files this candidate refers to; glob patterns expand to their sorted matches
    fn paths(&self) -> Result<Vec<PathBuf>> {
        if !(self.path.contains('*') || self.path.contains('?') || self.path.contains('[')) {
            return Ok(vec![PathBuf::from(&self.path)]);
        }

        let entries = glob(&self.path).map_err(|e| Error::InvalidGlob(format!("{}: {}", self.path, e)))?;
        let mut paths: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).collect();
        paths.sort();
        Ok(paths)
    }
}

/// Unicode-capable fonts commonly installed on Linux, most preferred first
pub fn default_candidates() -> Vec<FontCandidate> {
    vec![
        FontCandidate::new("DejaVuSans", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        FontCandidate::new("FreeSans", "/usr/share/fonts/truetype/freefont/FreeSans.ttf"),
        FontCandidate::new("Arial", "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf"),
        FontCandidate::new("Arial", "Arial.ttf"),
        FontCandidate::new("LiberationSans", "/usr/share/fonts/**/LiberationSans-Regular.ttf"),
    ]
}

/// The typeface in effect for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypefaceChoice {
    name: String,
    source: Option<PathBuf>,
}

impl TypefaceChoice {
    /// The built-in fallback typeface
    pub fn fallback() -> Self {
        Self {
            name: FALLBACK_TYPEFACE.to_string(),
            source: None,
        }
    }

    /// Name to pass to `set_font` and `text_width`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Font file the typeface was loaded from; `None` for the fallback
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_fallback(&self) -> bool {
        self.source.is_none()
    }
}

/// Register the first available candidate with `surface`
///
/// At most one font is registered. Candidates that are missing, unreadable
/// or not usable fonts are skipped.
pub fn resolve_typeface<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    candidates: &[FontCandidate],
) -> TypefaceChoice {
    for candidate in candidates {
        let paths = match candidate.paths() {
            Ok(paths) => paths,
            Err(e) => {
                debug!(font = %candidate.name, error = %e, "skipping font candidate");
                continue;
            }
        };

        for path in paths {
            match surface.register_font(&candidate.name, &path) {
                Ok(()) => {
                    info!(font = %candidate.name, path = %path.display(), "using font");
                    return TypefaceChoice {
                        name: candidate.name.clone(),
                        source: Some(path),
                    };
                }
                Err(e) => {
                    debug!(font = %candidate.name, path = %path.display(), error = %e, "font unavailable");
                }
            }
        }
    }

    warn!(fallback = FALLBACK_TYPEFACE, "no preferred font available, using fallback");
    TypefaceChoice::fallback()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use crate::pdf::RecordingSurface;

    fn font_file(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, b"font bytes").unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_empty_candidates_fall_back() {
        let mut surface = RecordingSurface::new();
        let choice = resolve_typeface(&mut surface, &[]);
        assert_eq!(choice, TypefaceChoice::fallback());
        assert_eq!(choice.name(), "Helvetica");
        assert!(choice.is_fallback());
        assert_eq!(surface.registrations(), 0);
    }

    #[test]
    fn test_unavailable_candidates_fall_back() {
        let mut surface = RecordingSurface::new();
        let candidates = vec![
            FontCandidate::new("Ghost", "/nonexistent/ghost.ttf"),
            FontCandidate::new("Phantom", "/nonexistent/**/phantom-*.ttf"),
            FontCandidate::new("Broken", "[unclosed"),
        ];
        let choice = resolve_typeface(&mut surface, &candidates);
        assert!(choice.is_fallback());
        assert_eq!(choice.source(), None);
    }

    #[test]
    fn test_first_available_wins() {
        let dir = TempDir::new().unwrap();
        let second = font_file(&dir, "second.ttf");
        let third = font_file(&dir, "third.ttf");

        let mut surface = RecordingSurface::new();
        let candidates = vec![
            FontCandidate::new("First", "/nonexistent/first.ttf"),
            FontCandidate::new("Second", second.clone()),
            FontCandidate::new("Third", third),
        ];
        let choice = resolve_typeface(&mut surface, &candidates);
        assert_eq!(choice.name(), "Second");
        assert_eq!(choice.source(), Some(Path::new(&second)));
        assert_eq!(surface.registrations(), 1);
    }

    #[test]
    fn test_candidate_cannot_claim_fallback_name() {
        let dir = TempDir::new().unwrap();
        let file = font_file(&dir, "helvetica.ttf");

        let mut surface = RecordingSurface::new();
        let candidates = vec![
            FontCandidate::new("Helvetica", "/nonexistent.ttf"),
            FontCandidate::new("Helvetica", file),
        ];
        let choice = resolve_typeface(&mut surface, &candidates);
        assert!(choice.is_fallback());
        assert_eq!(choice.source(), None);
        assert_eq!(surface.registrations(), 0);
    }

    #[test]
    fn test_glob_candidate() {
        let dir = TempDir::new().unwrap();
        font_file(&dir, "b.ttf");
        let a = font_file(&dir, "a.ttf");

        let mut surface = RecordingSurface::new();
        let pattern = format!("{}/*.ttf", dir.path().display());
        let choice = resolve_typeface(&mut surface, &[FontCandidate::new("Any", pattern)]);
        assert_eq!(choice.name(), "Any");
        assert_eq!(choice.source(), Some(Path::new(&a)));
    }

    #[test]
    fn test_parse_candidate() {
        let candidate = FontCandidate::parse("Inter = /fonts/Inter.ttf").unwrap();
        assert_eq!(candidate, FontCandidate::new("Inter", "/fonts/Inter.ttf"));
        assert!(FontCandidate::parse("Inter").is_err());
        assert!(FontCandidate::parse("=/fonts/x.ttf").is_err());
        assert!(FontCandidate::parse("Inter=").is_err());
    }

    #[test]
    fn test_default_candidates_prefer_dejavu() {
        let candidates = default_candidates();
        assert_eq!(candidates[0].name, "DejaVuSans");
        assert!(candidates.iter().all(|c| c.path.ends_with(".ttf")));
    }
}

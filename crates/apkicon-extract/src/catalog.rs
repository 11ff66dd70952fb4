//! Ranked resource patterns used to pick an icon out of an archive.
//!
//! The catalog is plain data: each [`IconPattern`] names a resource class, a
//! density bucket and a file-name shape. Its position in the catalog is its
//! rank, lower is better. Supporting another density or class means adding
//! a pattern, not touching the search.

use std::{fmt, sync::LazyLock};

use regex::RegexSet;

use crate::error::Result;

/// Asset directory family an icon lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Mipmap,
    Drawable,
}

impl ResourceClass {
    pub fn dir_prefix(self) -> &'static str {
        match self {
            ResourceClass::Mipmap => "mipmap",
            ResourceClass::Drawable => "drawable",
        }
    }
}

/// Screen density bucket, ordered from highest to lowest fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Density {
    Xxxhdpi,
    Xxhdpi,
    Xhdpi,
    Hdpi,
    Mdpi,
}

impl Density {
    pub fn qualifier(self) -> &'static str {
        match self {
            Density::Xxxhdpi => "xxxhdpi",
            Density::Xxhdpi => "xxhdpi",
            Density::Xhdpi => "xhdpi",
            Density::Hdpi => "hdpi",
            Density::Mdpi => "mdpi",
        }
    }
}

/// How specific the file name is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameSpecificity {
    /// `ic_launcher.png` or `ic_launcher_round.png`.
    Launcher,
    /// `app_icon.png`.
    AppIcon,
    /// Any PNG whose name contains `launcher` or `icon`.
    IconLike,
}

impl NameSpecificity {
    fn file_pattern(self) -> &'static str {
        match self {
            NameSpecificity::Launcher => r"ic_launcher(?:_round)?\.png",
            NameSpecificity::AppIcon => r"app_icon\.png",
            NameSpecificity::IconLike => r"[^/]*(?:launcher|icon)[^/]*\.png",
        }
    }
}

/// One rule of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconPattern {
    pub rank: usize,
    pub class: ResourceClass,
    pub density: Density,
    pub name: NameSpecificity,
}

impl IconPattern {
    /// The case-insensitive expression matched against full entry names.
    ///
    /// Anything may follow the density qualifier in the directory name, so
    /// `res/mipmap-xxxhdpi-v4/` matches the `xxxhdpi` rules.
    pub fn regex(&self) -> String {
        format!(
            r"(?i)^res/{}-{}[^/]*/{}$",
            self.class.dir_prefix(),
            self.density.qualifier(),
            self.name.file_pattern()
        )
    }
}

impl fmt::Display for IconPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.name {
            NameSpecificity::Launcher => "ic_launcher",
            NameSpecificity::AppIcon => "app_icon",
            NameSpecificity::IconLike => "*launcher*|*icon*",
        };
        write!(
            f,
            "res/{}-{}/{}.png",
            self.class.dir_prefix(),
            self.density.qualifier(),
            name
        )
    }
}

/// An entry that matched the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCandidate {
    pub rank: usize,
    pub name: String,
}

/// Ordered, immutable list of icon patterns.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<IconPattern>,
    matchers: RegexSet,
}

/// A `(class, density, name)` triple describing one pattern.
pub type IconRule = (ResourceClass, Density, NameSpecificity);

const STANDARD_PATTERNS: &[IconRule] = &[
    (ResourceClass::Mipmap, Density::Xxxhdpi, NameSpecificity::Launcher),
    (ResourceClass::Mipmap, Density::Xxhdpi, NameSpecificity::Launcher),
    (ResourceClass::Mipmap, Density::Xhdpi, NameSpecificity::Launcher),
    (ResourceClass::Mipmap, Density::Hdpi, NameSpecificity::Launcher),
    (ResourceClass::Mipmap, Density::Mdpi, NameSpecificity::Launcher),
    (ResourceClass::Drawable, Density::Xxxhdpi, NameSpecificity::Launcher),
    (ResourceClass::Drawable, Density::Xxhdpi, NameSpecificity::Launcher),
    (ResourceClass::Drawable, Density::Xhdpi, NameSpecificity::Launcher),
    (ResourceClass::Drawable, Density::Hdpi, NameSpecificity::Launcher),
    (ResourceClass::Drawable, Density::Mdpi, NameSpecificity::Launcher),
    (ResourceClass::Mipmap, Density::Xxxhdpi, NameSpecificity::AppIcon),
    (ResourceClass::Mipmap, Density::Xxhdpi, NameSpecificity::AppIcon),
    (ResourceClass::Mipmap, Density::Xxxhdpi, NameSpecificity::IconLike),
    (ResourceClass::Mipmap, Density::Xxhdpi, NameSpecificity::IconLike),
    (ResourceClass::Mipmap, Density::Xhdpi, NameSpecificity::IconLike),
];

static STANDARD_CATALOG: LazyLock<PatternCatalog> = LazyLock::new(|| {
    PatternCatalog::new(STANDARD_PATTERNS.iter().copied())
        .expect("built-in icon patterns are valid regular expressions")
});

impl PatternCatalog {
    /// Builds a catalog; the iteration order defines the ranks.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractError::Pattern`] if a rule cannot be compiled.
    pub fn new<I>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = IconRule>,
    {
        let patterns: Vec<IconPattern> = rules
            .into_iter()
            .enumerate()
            .map(|(rank, (class, density, name))| {
                IconPattern {
                    rank,
                    class,
                    density,
                    name,
                }
            })
            .collect();
        let matchers = RegexSet::new(patterns.iter().map(IconPattern::regex))?;

        Ok(Self {
            patterns,
            matchers,
        })
    }

    /// The built-in catalog.
    pub fn standard() -> &'static PatternCatalog {
        &STANDARD_CATALOG
    }

    pub fn patterns(&self) -> &[IconPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Rank of the best pattern matching `entry_name`.
    pub fn match_rank(&self, entry_name: &str) -> Option<usize> {
        self.matchers.matches(entry_name).iter().next()
    }

    pub fn best_match(&self, entry_name: &str) -> Option<&IconPattern> {
        self.match_rank(entry_name).map(|rank| &self.patterns[rank])
    }

    /// Ranks every matching name, best first.
    ///
    /// Names sharing a rank keep their relative input order.
    pub fn rank_entries<'n, I>(&self, names: I) -> Vec<RankedCandidate>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let mut candidates: Vec<RankedCandidate> = names
            .into_iter()
            .filter_map(|name| {
                self.match_rank(name).map(|rank| {
                    RankedCandidate {
                        rank,
                        name: name.to_string(),
                    }
                })
            })
            .collect();
        candidates.sort_by_key(|candidate| candidate.rank);
        candidates
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::standard().clone()
    }
}

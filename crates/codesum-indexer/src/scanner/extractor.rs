//! Pattern-based entity extraction for C-family sources.
//!
//! Each entity kind is an independent regular expression applied to the raw
//! file text. There is no tokenizer: comments, string literals, templates and
//! multi-line declarations are not understood, so results are a heuristic
//! approximation of what a file declares.

use once_cell::sync::Lazy;
use regex::Regex;

/// Kind of entity extracted from a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Class,
    Function,
    Enum,
    Struct,
    Macro,
    Include,
}

static CLASS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+(\w+)\s*\{").unwrap());
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+\s+(\w+)\(.*\)").unwrap());
static ENUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"enum\s+(\w+)\s*\{").unwrap());
static STRUCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"struct\s+(\w+)\s*\{").unwrap());
static MACRO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#define\s+(\w+)").unwrap());
static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"#include\s+[<"](.*)[>"]"#).unwrap());

impl EntityKind {
    /// All kinds, in report column order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Class,
        EntityKind::Function,
        EntityKind::Enum,
        EntityKind::Struct,
        EntityKind::Macro,
        EntityKind::Include,
    ];

    /// Report column title for this kind.
    pub fn column(&self) -> &'static str {
        match self {
            EntityKind::Class => "Classes",
            EntityKind::Function => "Functions",
            EntityKind::Enum => "Enums",
            EntityKind::Struct => "Structs",
            EntityKind::Macro => "Macros",
            EntityKind::Include => "Included Files",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            EntityKind::Class => &*CLASS_RE,
            EntityKind::Function => &*FUNCTION_RE,
            EntityKind::Enum => &*ENUM_RE,
            EntityKind::Struct => &*STRUCT_RE,
            EntityKind::Macro => &*MACRO_RE,
            EntityKind::Include => &*INCLUDE_RE,
        }
    }

    /// Apply this kind's rule to `content`.
    ///
    /// Matches are non-overlapping and returned in the order they occur;
    /// repeated names are kept.
    pub fn find_all(&self, content: &str) -> Vec<String> {
        self.pattern()
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Entities found in one file, one list per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub classes: Vec<String>,
    pub functions: Vec<String>,
    pub enums: Vec<String>,
    pub structs: Vec<String>,
    pub macros: Vec<String>,
    pub includes: Vec<String>,
}

impl Entities {
    /// The names extracted for a given kind.
    pub fn get(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Class => &self.classes,
            EntityKind::Function => &self.functions,
            EntityKind::Enum => &self.enums,
            EntityKind::Struct => &self.structs,
            EntityKind::Macro => &self.macros,
            EntityKind::Include => &self.includes,
        }
    }

    /// Total number of names across all kinds.
    pub fn len(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run every extraction rule over `content`.
pub fn extract(content: &str) -> Entities {
    Entities {
        classes: EntityKind::Class.find_all(content),
        functions: EntityKind::Function.find_all(content),
        enums: EntityKind::Enum.find_all(content),
        structs: EntityKind::Struct.find_all(content),
        macros: EntityKind::Macro.find_all(content),
        includes: EntityKind::Include.find_all(content),
    }
}

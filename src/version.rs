// src/version.rs

use crate::error::{LineageError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Well-known qualifiers, lowest to highest. The empty string is a release.
const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

/// Rank of the empty (release) qualifier.
const RELEASE_RANK: &str = "5";

/// A released version of a package, totally ordered.
///
/// `major` and `minor` follow the dotted `major.minor.incremental[-qualifier]`
/// convention. When that convention does not apply (for instance `2021.03`,
/// where the leading-zero token disables it) `major` is re-derived from the
/// first dot-delimited segment.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    major: u32,
    minor: u32,
    qualifier: Option<String>,
    items: Vec<Item>,
}

impl Version {
    pub fn parse(raw: &str) -> Result<Self> {
        let conventional = Conventional::parse(raw);
        let major = match conventional.major.unwrap_or(0) {
            0 => leading_segment(raw)?,
            major => major,
        };

        Ok(Self {
            raw: raw.to_string(),
            major,
            minor: conventional.minor.unwrap_or(0),
            qualifier: conventional.qualifier,
            items: parse_items(raw),
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// The qualifier, if any (`SNAPSHOT` in `1.0.0-SNAPSHOT`).
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Same major and minor as `other`.
    pub fn same_minor_line(&self, other: &Version) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

/// Whether `raw` carries no qualifier (`1.0.0` yes, `1.0.0-SNAPSHOT` no).
/// Never fails, unlike [`Version::parse`].
pub fn is_unqualified(raw: &str) -> bool {
    Conventional::parse(raw).qualifier.is_none()
}

fn leading_segment(raw: &str) -> Result<u32> {
    raw.split('.')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .ok_or_else(|| LineageError::MalformedVersion {
            version: raw.to_string(),
        })
}

impl FromStr for Version {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_lists(&self.items, &other.items)
    }
}

/// The `major.minor.incremental-build` reading of a version string.
#[derive(Debug, Default)]
struct Conventional {
    major: Option<u32>,
    minor: Option<u32>,
    qualifier: Option<String>,
}

impl Conventional {
    fn parse(raw: &str) -> Self {
        let mut parsed = Conventional::default();

        let (head, tail) = match raw.find('-') {
            Some(idx) => (&raw[..idx], Some(&raw[idx + 1..])),
            None => (raw, None),
        };

        if let Some(tail) = tail {
            // `-1` is a build number, `-01` or `-beta` a qualifier
            let is_build = (tail.len() == 1 || !tail.starts_with('0')) && try_parse_int(tail).is_some();
            if !is_build {
                parsed.qualifier = Some(tail.to_string());
            }
        }

        if !head.contains('.') && !head.starts_with('0') {
            parsed.major = try_parse_int(head);
            if parsed.major.is_none() {
                parsed.qualifier = Some(raw.to_string());
            }
            return parsed;
        }

        let mut fallback = false;
        let mut tokens = head.split('.').filter(|t| !t.is_empty());
        let mut numeric = || -> std::result::Result<Option<u32>, ()> {
            match tokens.next() {
                Some(token) => integer_token(token),
                None => Ok(None),
            }
        };

        match (numeric(), numeric(), numeric()) {
            (Ok(major), Ok(minor), Ok(_incremental)) => {
                parsed.major = major;
                parsed.minor = minor;
            }
            _ => fallback = true,
        }
        if let Some(extra) = tokens.next() {
            parsed.qualifier = Some(extra.to_string());
            fallback |= is_digits(extra);
        }
        if head.contains("..") || head.starts_with('.') || head.ends_with('.') {
            fallback = true;
        }

        if fallback {
            parsed.major = None;
            parsed.minor = None;
            parsed.qualifier = Some(raw.to_string());
        }
        parsed
    }
}

fn integer_token(token: &str) -> std::result::Result<Option<u32>, ()> {
    if token.len() > 1 && token.starts_with('0') {
        return Err(());
    }
    Ok(try_parse_int(token))
}

fn try_parse_int(s: &str) -> Option<u32> {
    if !is_digits(s) {
        return None;
    }
    s.parse::<u32>().ok().filter(|v| *v <= i32::MAX as u32)
}

fn is_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// One element of the comparable form of a version.
#[derive(Debug, Clone)]
enum Item {
    /// Digits with leading zeros stripped; empty means zero.
    Int(String),
    /// A qualifier after alias resolution; empty means release.
    Str(String),
    List(Vec<Item>),
}

impl Item {
    fn int(digits: &str) -> Item {
        Item::Int(digits.trim_start_matches('0').to_string())
    }

    fn qualifier(value: &str, followed_by_digit: bool) -> Item {
        let value = match value {
            "a" if followed_by_digit => "alpha",
            "b" if followed_by_digit => "beta",
            "m" if followed_by_digit => "milestone",
            "ga" | "final" | "release" => "",
            "cr" => "rc",
            other => other,
        };
        Item::Str(value.to_string())
    }

    fn is_null(&self) -> bool {
        match self {
            Item::Int(digits) => digits.is_empty(),
            Item::Str(value) => value.is_empty(),
            Item::List(items) => items.is_empty(),
        }
    }
}

fn parse_item(is_digit: bool, buf: &str) -> Item {
    if is_digit {
        Item::int(buf)
    } else {
        Item::qualifier(buf, false)
    }
}

fn qualifier_rank(value: &str) -> String {
    match QUALIFIERS.iter().position(|q| *q == value) {
        Some(idx) => idx.to_string(),
        None => format!("{}-{}", QUALIFIERS.len(), value),
    }
}

/// Splits a version into nested item lists: `.` separates items, `-` and
/// digit/letter transitions open a sub-list.
fn parse_items(raw: &str) -> Vec<Item> {
    let version = raw.to_lowercase();
    let mut parents: Vec<Vec<Item>> = Vec::new();
    let mut current: Vec<Item> = Vec::new();
    let mut is_digit = false;
    let mut start = 0;

    for (i, c) in version.char_indices() {
        match c {
            '.' | '-' => {
                if i == start {
                    current.push(Item::Int(String::new()));
                } else {
                    current.push(parse_item(is_digit, &version[start..i]));
                }
                start = i + 1;
                if c == '-' {
                    parents.push(std::mem::take(&mut current));
                }
            }
            c if c.is_ascii_digit() => {
                if !is_digit && i > start {
                    current.push(Item::qualifier(&version[start..i], true));
                    start = i;
                    parents.push(std::mem::take(&mut current));
                }
                is_digit = true;
            }
            _ => {
                if is_digit && i > start {
                    current.push(parse_item(true, &version[start..i]));
                    start = i;
                    parents.push(std::mem::take(&mut current));
                }
                is_digit = false;
            }
        }
    }
    if version.len() > start {
        current.push(parse_item(is_digit, &version[start..]));
    }

    while let Some(mut parent) = parents.pop() {
        normalize(&mut current);
        parent.push(Item::List(current));
        current = parent;
    }
    normalize(&mut current);
    current
}

/// Drops trailing null items, looking through trailing sub-lists.
fn normalize(items: &mut Vec<Item>) {
    let mut i = items.len();
    while i > 0 {
        i -= 1;
        if items[i].is_null() {
            items.remove(i);
        } else if !matches!(items[i], Item::List(_)) {
            break;
        }
    }
}

fn compare_item(left: &Item, right: Option<&Item>) -> Ordering {
    match (left, right) {
        (Item::Int(digits), None) => {
            if digits.is_empty() {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        }
        (Item::Int(a), Some(Item::Int(b))) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
        (Item::Int(_), Some(_)) => Ordering::Greater,

        (Item::Str(value), None) => qualifier_rank(value).as_str().cmp(RELEASE_RANK),
        (Item::Str(a), Some(Item::Str(b))) => qualifier_rank(a).cmp(&qualifier_rank(b)),
        (Item::Str(_), Some(Item::Int(_))) => Ordering::Less,
        (Item::Str(_), Some(Item::List(_))) => Ordering::Less,

        (Item::List(items), None) => items.first().map_or(Ordering::Equal, |first| compare_item(first, None)),
        (Item::List(_), Some(Item::Int(_))) => Ordering::Less,
        (Item::List(_), Some(Item::Str(_))) => Ordering::Greater,
        (Item::List(a), Some(Item::List(b))) => compare_lists(a, b),
    }
}

fn compare_lists(left: &[Item], right: &[Item]) -> Ordering {
    for i in 0..left.len().max(right.len()) {
        let result = match (left.get(i), right.get(i)) {
            (None, None) => Ordering::Equal,
            (None, Some(r)) => compare_item(r, None).reverse(),
            (Some(l), r) => compare_item(l, r),
        };
        if result != Ordering::Equal {
            return result;
        }
    }
    Ordering::Equal
}

//! Table names for record types.
//!
//! A record either names its table explicitly or gets the snake-cased,
//! pluralized form of its type name (`UserProfile` → `user_profiles`).

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use convert_case::{Case, Casing};
use parking_lot::RwLock;

use crate::record::Record;

static CACHE: LazyLock<RwLock<HashMap<TypeId, Arc<str>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

// (singular, plural) pairs matched on the final word
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("move", "moves"),
    ("sex", "sexes"),
    ("zombie", "zombies"),
    ("cookie", "cookies"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
    "data",
    "metadata",
    "feedback",
    "staff",
];

/// Returns the table name for `R`, resolving it on first use.
///
/// An explicit name from [`Record::table_name`] is used verbatim; otherwise
/// the type name is snake-cased and pluralized.
#[must_use]
pub fn table_name<R: Record>() -> String {
    let type_id = TypeId::of::<R>();
    if let Some(name) = CACHE.read().get(&type_id) {
        return name.to_string();
    }

    let resolved: Arc<str> = R::table_name().unwrap_or_else(|| default_name(R::NAME)).into();
    tracing::debug!(record = R::NAME, table = %resolved, "resolved table name");
    CACHE.write().entry(type_id).or_insert(resolved).to_string()
}

/// Snake-cases and pluralizes a type name.
#[must_use]
pub fn default_name(type_name: &str) -> String {
    pluralize(&type_name.to_case(Case::Snake))
}

/// English plural of the last `_`-separated word of `word`.
#[must_use]
pub fn pluralize(word: &str) -> String {
    let (head, last) = word.rsplit_once('_').unwrap_or(("", word));
    let plural = pluralize_word(last);
    if head.is_empty() { plural } else { format!("{head}_{plural}") }
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return (*plural).to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return word.to_string();
    }

    for (suffix, replacement) in [
        ("quiz", "quizzes"),
        ("matrix", "matrices"),
        ("vertex", "vertices"),
        ("index", "indices"),
        ("alias", "aliases"),
        ("status", "statuses"),
        ("bus", "buses"),
        ("octopus", "octopi"),
        ("virus", "viri"),
        ("crisis", "crises"),
        ("axis", "axes"),
        ("analysis", "analyses"),
        ("basis", "bases"),
        ("thesis", "theses"),
        ("datum", "data"),
        ("medium", "media"),
        ("life", "lives"),
        ("wife", "wives"),
        ("knife", "knives"),
        ("half", "halves"),
        ("leaf", "leaves"),
        ("wolf", "wolves"),
        ("shelf", "shelves"),
        ("hive", "hives"),
    ] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}{replacement}");
        }
    }

    if word.ends_with("ss")
        || word.ends_with("sh")
        || word.ends_with("ch")
        || word.ends_with('x')
        || word.ends_with('z')
    {
        return format!("{word}es");
    }
    if word.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y')
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
    {
        return format!("{stem}ies");
    }
    format!("{word}s")
}

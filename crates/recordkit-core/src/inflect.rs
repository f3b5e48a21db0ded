//! English inflection for table names.
//!
//! Entity descriptors derive singular names (`countries` -> `country`) and
//! relation tables (`city` -> `cities`) from these rules, so they must match
//! the table names the schema actually uses. Only the last `_`-separated
//! segment of a snake_case name is inflected: `user_addresses` ->
//! `user_address`.

/// (singular, plural) pairs that no suffix rule covers.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
    ("datum", "data"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("analysis", "analyses"),
    ("crisis", "crises"),
    ("axis", "axes"),
    ("criterion", "criteria"),
    ("medium", "media"),
    ("movie", "movies"),
    ("cookie", "cookies"),
    ("shoe", "shoes"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("leaf", "leaves"),
    ("half", "halves"),
    ("wolf", "wolves"),
    ("shelf", "shelves"),
    ("thief", "thieves"),
];

/// Nouns ending in `u` that take a plain `s`, e.g. `menus`. Without this
/// list they would read as Latin `-us` singulars like `status`.
const ENDING_IN_U: &[&str] = &["menu", "emu", "gnu", "guru", "haiku", "tutu", "tofu", "bayou"];

/// Nouns ending in `s` whose plural adds `es`, e.g. `aliases`. Without this
/// list they would read as `-se` nouns like `purchases`.
const ENDING_IN_S: &[&str] = &[
    "alias", "atlas", "bias", "canvas", "gas", "lens", "iris", "plus",
];

/// Words with identical singular and plural forms.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "news",
    "series",
    "species",
    "sheep",
    "fish",
    "deer",
    "metadata",
    "feedback",
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn split_last(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(pos) => word.split_at(pos + 1),
        None => ("", word),
    }
}

/// Pluralize an English noun (or the last segment of a snake_case name).
pub fn pluralize(word: &str) -> String {
    let (prefix, last) = split_last(word);
    format!("{prefix}{}", pluralize_word(last))
}

/// Singularize an English noun (or the last segment of a snake_case name).
pub fn singularize(word: &str) -> String {
    let (prefix, last) = split_last(word);
    format!("{prefix}{}", singularize_word(last))
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == word) {
        return (*plural).to_string();
    }

    if word.ends_with('s') || word.ends_with('x') || word.ends_with("ch") || word.ends_with("sh")
    {
        return format!("{word}es");
    }

    // quiz -> quizzes
    if let Some(stripped) = word.strip_suffix('z') {
        if stripped.chars().last().is_some_and(is_vowel) {
            return format!("{word}zes");
        }
        return format!("{word}es");
    }

    if let Some(stripped) = word.strip_suffix('y') {
        if stripped.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{stripped}ies");
        }
        return format!("{word}s");
    }

    if let Some(stripped) = word.strip_suffix('o') {
        let exceptions = ["photo", "piano", "halo", "memo", "pro", "auto", "video", "radio"];
        if stripped.chars().last().is_some_and(|c| !is_vowel(c)) && !exceptions.contains(&word) {
            return format!("{word}es");
        }
    }

    format!("{word}s")
}

fn singularize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == word) {
        return (*singular).to_string();
    }

    if ENDING_IN_S.contains(&word) {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('s') {
        if ENDING_IN_U.contains(&stem) {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix("es") {
        if ENDING_IN_S.contains(&stem) {
            return stem.to_string();
        }
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }

    // quizzes -> quiz
    if let Some(stem) = word.strip_suffix("zzes") {
        return format!("{stem}z");
    }

    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    // statuses -> status, buses -> bus; houses/causes keep their 'e'
    if let Some(stem) = word.strip_suffix("uses") {
        if !stem.chars().last().is_some_and(is_vowel) {
            return format!("{stem}us");
        }
    }

    // heroes -> hero
    if let Some(stem) = word.strip_suffix("oes") {
        return format!("{stem}o");
    }

    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }

    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

//! Profile analysis: questionnaire answers to a structured search spec.
//!
//! Everything here is a pure lookup over fixed tables. Unrecognised tags
//! never fail; they fall back to defaults or contribute nothing.

use gift_search::{PriceRange, SearchSpec};

use crate::profile::Profile;

/// Base categories per age band, checked in order against the upper bound.
const AGE_BANDS: &[(u32, &[&str])] = &[
    (12, &["brinquedos", "jogos", "livros infantis"]),
    (17, &["games", "eletrônicos", "roupas", "acessórios"]),
    (35, &["tecnologia", "casa", "beleza", "esportes"]),
];

/// Categories for anyone older than the last band.
const ADULT_CATEGORIES: &[&str] = &["casa", "jardinagem", "livros", "saúde"];

const INTEREST_CATEGORIES: &[(&str, &[&str])] = &[
    ("leitura", &["livros", "e-readers", "luminárias"]),
    ("culinária", &["utensílios cozinha", "livros receitas", "ingredientes"]),
    ("tecnologia", &["eletrônicos", "gadgets", "acessórios tech"]),
    ("esportes", &["equipamentos esportivos", "roupas fitness", "suplementos"]),
    ("arte", &["materiais arte", "quadros", "decoração"]),
    ("música", &["instrumentos", "fones", "vinis"]),
    ("viagem", &["acessórios viagem", "guias", "bagagem"]),
];

const OCCASION_KEYWORDS: &[(&str, &[&str])] = &[
    ("aniversario", &["presente aniversário", "gift birthday"]),
    ("natal", &["presente natal", "christmas gift"]),
    ("dia-das-maes", &["presente mãe", "dia das mães"]),
    ("dia-dos-pais", &["presente pai", "dia dos pais"]),
    ("dia-dos-namorados", &["presente namorada", "presente namorado"]),
];

const BUDGET_RANGES: &[(&str, PriceRange)] = &[
    ("ate-50", PriceRange::new(0.0, 50.0)),
    ("50-100", PriceRange::new(50.0, 100.0)),
    ("100-200", PriceRange::new(100.0, 200.0)),
    ("200-500", PriceRange::new(200.0, 500.0)),
    ("500-1000", PriceRange::new(500.0, 1000.0)),
    ("1000-plus", PriceRange::new(1000.0, 10000.0)),
];

const PERSONALITY_TAGS: &[(&str, &[&str])] = &[
    ("pratica", &["utilidade", "funcionalidade"]),
    ("criativa", &["arte", "DIY", "personalização"]),
    ("aventureira", &["esportes", "viagem", "outdoor"]),
    ("intelectual", &["livros", "cursos", "tecnologia"]),
    ("social", &["experiências", "jogos", "acessórios"]),
    ("elegante", &["luxo", "beleza", "moda"]),
];

const DEFAULT_PRIORITY: &str = "geral";

fn lookup<'a, T: ?Sized>(table: &'a [(&str, &'a T)], key: &str) -> Option<&'a T> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Derive the search spec for `profile`.
pub fn analyze(profile: &Profile) -> SearchSpec {
    SearchSpec {
        categories: categories(profile.age, &profile.interests),
        keywords: keywords(&profile.interests, &profile.occasion),
        price_range: price_range(&profile.budget),
        priority_tags: priority_tags(&profile.personality),
    }
}

/// Age-band categories followed by interest categories, deduplicated in
/// first-seen order.
pub fn categories(age: u32, interests: &str) -> Vec<String> {
    let base = AGE_BANDS
        .iter()
        .find(|(max_age, _)| age <= *max_age)
        .map(|(_, cats)| *cats)
        .unwrap_or(ADULT_CATEGORIES);

    let from_interests = interest_tokens(interests)
        .filter_map(|token| lookup(INTEREST_CATEGORIES, &token.to_lowercase()))
        .flat_map(|cats| cats.iter());

    let mut categories: Vec<String> = Vec::new();
    for category in base.iter().chain(from_interests) {
        if !categories.iter().any(|c| c == category) {
            categories.push((*category).to_owned());
        }
    }
    categories
}

/// Occasion phrases first, then the trimmed interest tokens in order.
///
/// Order matters: the aggregator fans out over a prefix of this list.
pub fn keywords(interests: &str, occasion: &str) -> Vec<String> {
    let occasion = occasion.trim().to_lowercase();
    lookup(OCCASION_KEYWORDS, &occasion)
        .unwrap_or(&[])
        .iter()
        .map(|phrase| (*phrase).to_owned())
        .chain(interest_tokens(interests).map(str::to_owned))
        .collect()
}

/// Budget bucket bounds, or [`PriceRange::DEFAULT`] for unknown buckets.
pub fn price_range(budget: &str) -> PriceRange {
    let budget = budget.trim().to_lowercase();
    BUDGET_RANGES
        .iter()
        .find(|(tag, _)| *tag == budget)
        .map(|(_, range)| *range)
        .unwrap_or(PriceRange::DEFAULT)
}

/// Personality priority tags, or `["geral"]` for unknown personalities.
pub fn priority_tags(personality: &str) -> Vec<String> {
    lookup(PERSONALITY_TAGS, &personality.trim().to_lowercase())
        .map(|tags| tags.iter().map(|t| (*t).to_owned()).collect())
        .unwrap_or_else(|| vec![DEFAULT_PRIORITY.to_owned()])
}

/// Known budget bucket tags, in ascending order.
pub fn budget_buckets() -> impl Iterator<Item = (&'static str, PriceRange)> {
    BUDGET_RANGES.iter().copied()
}

fn interest_tokens(interests: &str) -> impl Iterator<Item = &str> {
    interests.split(',').map(str::trim).filter(|t| !t.is_empty())
}

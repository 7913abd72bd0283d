//! Theme/subtheme to intent classification.
//!
//! The intent set is closed and derived, never stored: it is recomputed from
//! the personalization on every generation. Unknown input degrades to
//! [`Intent::Default`], this function cannot fail.

use serde::{Deserialize, Serialize};

use crate::text::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Love,
    Gratitude,
    Healing,
    LifePath,
    Courage,
    Creativity,
    Night,
    Mindfulness,
    NatureGuardian,
    Renewal,
    Intuition,
    Projects,
    Celebration,
    Calm,
    Connection,
    Confidence,
    Difficulty,
    Alignment,
    Roots,
    Energy,
    Default,
}

impl Intent {
    /// Stable name used in selection seeds and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Love => "love",
            Intent::Gratitude => "gratitude",
            Intent::Healing => "healing",
            Intent::LifePath => "life_path",
            Intent::Courage => "courage",
            Intent::Creativity => "creativity",
            Intent::Night => "night",
            Intent::Mindfulness => "mindfulness",
            Intent::NatureGuardian => "nature_guardian",
            Intent::Renewal => "renewal",
            Intent::Intuition => "intuition",
            Intent::Projects => "projects",
            Intent::Celebration => "celebration",
            Intent::Calm => "calm",
            Intent::Connection => "connection",
            Intent::Confidence => "confidence",
            Intent::Difficulty => "difficulty",
            Intent::Alignment => "alignment",
            Intent::Roots => "roots",
            Intent::Energy => "energy",
            Intent::Default => "default",
        }
    }
}

// Normalized product theme labels, both locales.
const EXACT_THEMES: &[(&str, Intent)] = &[
    ("amour", Intent::Love),
    ("love", Intent::Love),
    ("gratitude", Intent::Gratitude),
    ("guerison apaisement", Intent::Healing),
    ("guerison", Intent::Healing),
    ("healing", Intent::Healing),
    ("chemin de vie orientation", Intent::LifePath),
    ("chemin de vie", Intent::LifePath),
    ("life path", Intent::LifePath),
    ("courage depassement", Intent::Courage),
    ("courage", Intent::Courage),
    ("creativite inspiration", Intent::Creativity),
    ("creativite", Intent::Creativity),
    ("creativity", Intent::Creativity),
    ("reves nuit", Intent::Night),
    ("reves", Intent::Night),
    ("dreams", Intent::Night),
    ("presence pleine conscience", Intent::Mindfulness),
    ("pleine conscience", Intent::Mindfulness),
    ("mindfulness", Intent::Mindfulness),
    ("le gardien du bois", Intent::NatureGuardian),
    ("gardien du bois", Intent::NatureGuardian),
    ("cycles renouveau", Intent::Renewal),
    ("renouveau", Intent::Renewal),
    ("renewal", Intent::Renewal),
    ("intuition synchronicites", Intent::Intuition),
    ("intuition", Intent::Intuition),
    ("projets objectifs", Intent::Projects),
    ("projets", Intent::Projects),
    ("projects", Intent::Projects),
    ("celebration joie", Intent::Celebration),
    ("celebration", Intent::Celebration),
    ("calme serenite", Intent::Calm),
    ("calme", Intent::Calm),
    ("calm", Intent::Calm),
    ("connexion lien aux autres", Intent::Connection),
    ("connexion", Intent::Connection),
    ("connection", Intent::Connection),
    ("confiance en soi", Intent::Confidence),
    ("confiance", Intent::Confidence),
    ("confidence", Intent::Confidence),
    ("traverser les difficultes", Intent::Difficulty),
    ("difficultes", Intent::Difficulty),
    ("alignement authenticite", Intent::Alignment),
    ("alignement", Intent::Alignment),
    ("alignment", Intent::Alignment),
    ("racines origines", Intent::Roots),
    ("racines", Intent::Roots),
    ("roots", Intent::Roots),
    ("energie vitalite", Intent::Energy),
    ("energie", Intent::Energy),
    ("energy", Intent::Energy),
];

// Ordered substring rules over "{theme} {subtheme}". First rule whose any
// keyword is contained wins; deuil before famille so a grief theme never
// lands on the family pool.
const KEYWORD_RULES: &[(&[&str], Intent)] = &[
    (&["deuil", "absence", "adieu", "perte", "grief", "loss"], Intent::Healing),
    (&["guerison", "apaisement", "cicatrice", "heal", "soothe"], Intent::Healing),
    (&["amour", "aimer", "couple", "mariage", "fiance", "femme", "mari", "love", "wife", "husband"], Intent::Love),
    (&["merci", "reconnaissance", "grateful", "thank"], Intent::Gratitude),
    (&["deuxieme souffle", "reconversion", "orientation", "direction", "decision", "crossroad"], Intent::LifePath),
    (&["defi", "peur", "oser", "depassement", "challenge", "fear", "brave"], Intent::Courage),
    (&["creativite", "artistique", "inspiration", "imaginaire", "creative", "artist"], Intent::Creativity),
    (&["nuit", "reve", "endormissement", "sommeil", "night", "dream", "sleep"], Intent::Night),
    (&["respiration", "pleine conscience", "ancrage", "breath", "mindful"], Intent::Mindfulness),
    (&["gardien", "bois", "foret", "arbre", "forest", "tree", "grove"], Intent::NatureGuardian),
    (&["renouveau", "cycle", "transition", "recommencer", "renewal", "new chapter"], Intent::Renewal),
    (&["intuition", "synchronicite", "signe", "feeling", "sign"], Intent::Intuition),
    (&["projet", "objectif", "lancer", "goal", "project"], Intent::Projects),
    (&["anniversaire", "fete", "reussite", "victoire", "birthday", "success", "celebrate"], Intent::Celebration),
    (&["calme", "serenite", "stress", "pause", "serenity", "quiet"], Intent::Calm),
    (&["lien", "complicite", "communiquer", "famille", "ami", "family", "friend", "bond"], Intent::Connection),
    (&["confiance", "estime", "imposteur", "confidence", "self worth"], Intent::Confidence),
    (&["difficulte", "epreuve", "fatigue", "conflit", "hardship", "struggle"], Intent::Difficulty),
    (&["alignement", "authenticite", "valeurs", "authentic", "aligned"], Intent::Alignment),
    (&["racine", "heritage", "origine", "transmission", "ancetre", "ancestry", "legacy"], Intent::Roots),
    (&["energie", "vitalite", "elan", "motivation", "energy", "vitality"], Intent::Energy),
];

/// Map free-text theme/subtheme to an intent. Exact theme match first, then
/// ordered keyword containment over the concatenated pair, then the default.
pub fn classify(theme: &str, subtheme: &str) -> Intent {
    let theme_norm = normalize(theme);
    if theme_norm.is_empty() && normalize(subtheme).is_empty() {
        return Intent::Default;
    }

    for (label, intent) in EXACT_THEMES {
        if theme_norm == *label {
            return *intent;
        }
    }

    let haystack = format!("{theme_norm} {}", normalize(subtheme));
    for (keywords, intent) in KEYWORD_RULES {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *intent;
        }
    }

    Intent::Default
}

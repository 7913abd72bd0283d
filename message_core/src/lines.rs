//! Fixed line pools backing the template composer.
//!
//! Templates use `{name}`, `{place}` and `{memory}` placeholders. Every
//! opening template starts with `{name}` so the composed message is
//! guaranteed to open on the recipient's resolved name. Core pools hold at
//! least three candidates so modulo selection yields real variety.

use crate::compose::{Gender, Locale};
use crate::intent::Intent;

pub fn openings(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Fr => &[
            "{name}, écoute.",
            "{name}, prends un instant.",
            "{name}, ce murmure est pour toi.",
        ],
        Locale::En => &[
            "{name}, listen.",
            "{name}, take a moment.",
            "{name}, this whisper is for you.",
        ],
    }
}

pub fn place_lines(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Fr => &[
            "Je te retrouve là, à {place}, et quelque chose en toi se pose.",
            "Il t'accompagne dans ce lieu : {place}.",
            "Pense à {place} : ce lieu te connaît mieux que tu ne le crois.",
        ],
        Locale::En => &[
            "I find you there, in {place}, and something in you settles into place.",
            "It accompanies you in this place: {place}.",
            "Think of {place}: that place knows you better than you think.",
        ],
    }
}

pub fn memory_lines(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Fr => &[
            "Je garde ce souvenir : « {memory} ». Il te rappelle que tu sais déjà avancer.",
            "Il porte ce souvenir avec toi : « {memory} ».",
            "Ce souvenir, « {memory} », reste vivant en toi.",
        ],
        Locale::En => &[
            "I keep this memory: \u{201c}{memory}\u{201d}. It reminds you that you already know how to move forward.",
            "It carries this memory with you: \u{201c}{memory}\u{201d}.",
            "That memory, \u{201c}{memory}\u{201d}, stays alive within you.",
        ],
    }
}

pub fn no_memory_lines(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Fr => &[
            "Ce que tu traverses te ressemble plus que tu ne le crois.",
            "Ce moment t'appartient, simplement.",
            "Il n'y a rien à prouver ici, seulement à ressentir.",
        ],
        Locale::En => &[
            "What you are living through fits you more than you think.",
            "This moment simply belongs to you.",
            "There is nothing to prove here, only to feel.",
        ],
    }
}

pub fn core_lines(locale: Locale, intent: Intent) -> &'static [&'static str] {
    match locale {
        Locale::Fr => core_lines_fr(intent),
        Locale::En => core_lines_en(intent),
    }
}

fn core_lines_fr(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Love => &[
            "Tu fais rayonner mes journées davantage chaque jour.",
            "Je t'aime plus que les mots ne peuvent l'exprimer.",
            "Être avec toi, c'est rentrer à la maison.",
            "Tu as changé ma vie simplement en existant.",
        ],
        Intent::Gratitude => &[
            "Je suis reconnaissant pour chaque moment avec toi.",
            "Merci pour les gestes invisibles qui me portent.",
            "Ta présence est un cadeau que je n'oublie pas.",
        ],
        Intent::Healing => &[
            "Chaque jour, je me sens un peu plus entier.",
            "Mon cœur cicatrise avec grâce.",
            "La paix s'installe en moi, doucement mais sûrement.",
            "Je garde chaque moment précieux vivant en moi.",
        ],
        Intent::LifePath => &[
            "Chaque pas, même hésitant, dessine ton chemin.",
            "Tu n'as pas à tout voir pour avancer.",
            "La direction se révèle à ceux qui marchent.",
        ],
        Intent::Courage => &[
            "Tu portes en toi plus de force que tu ne l'imagines.",
            "La peur recule quand tu fais le premier pas.",
            "Tu as déjà traversé des tempêtes, celle-ci passera aussi.",
        ],
        Intent::Creativity => &[
            "Laisse tes mains dire ce que les mots taisent.",
            "L'inspiration revient toujours vers ceux qui l'attendent en créant.",
            "Ton imaginaire est un territoire sans frontières.",
        ],
        Intent::Night => &[
            "La nuit veille sur toi, tu peux déposer le poids du jour.",
            "Laisse tes rêves te raconter ce que tu sais déjà.",
            "Le sommeil viendra comme une marée douce.",
        ],
        Intent::Mindfulness => &[
            "Reviens au souffle, tout le reste peut attendre.",
            "L'instant présent est assez grand pour toi.",
            "Ton corps sait où se trouve le calme.",
        ],
        Intent::NatureGuardian => &[
            "Le bois ancien veille sur toi, comme il a veillé sur d'autres avant.",
            "La forêt ne se presse jamais, et pourtant tout y pousse.",
            "Tes racines tiennent bon, même quand le vent se lève.",
        ],
        Intent::Renewal => &[
            "Chaque fin porte en elle un commencement.",
            "Tu as le droit de recommencer différemment.",
            "Ce cycle se referme pour t'ouvrir un autre passage.",
        ],
        Intent::Intuition => &[
            "La petite voix en toi mérite d'être écoutée.",
            "Les signes parlent à ceux qui acceptent de les voir.",
            "Ton ressenti sait souvent avant ta raison.",
        ],
        Intent::Projects => &[
            "Ce que tu construis mérite ta patience.",
            "Un pas chaque jour suffit à déplacer des montagnes.",
            "Ton élan d'aujourd'hui est la fondation de demain.",
        ],
        Intent::Celebration => &[
            "Ce moment marque un tournant magnifique.",
            "Cette réussite t'appartient, savoure-la.",
            "Tu as fait preuve de force et de vision.",
        ],
        Intent::Calm => &[
            "Le calme n'est jamais loin, il commence dans ton souffle.",
            "Tu peux ralentir, rien d'essentiel ne se perdra.",
            "Laisse la journée se déposer comme la poussière après le passage.",
        ],
        Intent::Connection => &[
            "Tu me vois vraiment, et c'est un cadeau rare.",
            "Cette connexion entre nous est sacrée.",
            "Ton rire résonne dans mon âme.",
        ],
        Intent::Confidence => &[
            "Tu as ta place, exactement telle que tu es.",
            "Ce que tu portes en toi a de la valeur, même quand tu en doutes.",
            "Personne d'autre ne peut offrir ce que tu offres.",
        ],
        Intent::Difficulty => &[
            "Cette épreuve ne dit rien de ta valeur.",
            "Tu avances, même quand il te semble faire du surplace.",
            "Les jours lourds finissent eux aussi par passer.",
        ],
        Intent::Alignment => &[
            "Tu as le droit de vivre selon ce qui compte pour toi.",
            "Revenir à soi n'est jamais un détour.",
            "Ta vérité mérite d'être habitée pleinement.",
        ],
        Intent::Roots => &[
            "Tu es ma racine, mon fondement.",
            "Ce qui t'a été transmis respire à travers tes actes.",
            "Ton histoire te porte plus qu'elle ne te retient.",
        ],
        Intent::Energy => &[
            "L'élan revient toujours, laisse-lui la porte ouverte.",
            "Ton énergie se recharge dans ce qui te fait vibrer.",
            "Remets un peu de soleil dans tes journées, tu le mérites.",
        ],
        Intent::Default => &[
            "Tu comptes vraiment pour moi.",
            "Quelqu'un pense à toi, là, maintenant.",
            "Ce lien entre nous n'a pas besoin de mots pour exister.",
        ],
    }
}

fn core_lines_en(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Love => &[
            "You light up my days more with each passing moment.",
            "I love you more than words could ever express.",
            "Being with you is coming home.",
            "You've changed my life simply by existing.",
        ],
        Intent::Gratitude => &[
            "I'm grateful for every moment with you.",
            "Thank you for the invisible gestures that carry me.",
            "Your presence is a gift I never forget.",
        ],
        Intent::Healing => &[
            "Each day, I feel a little more whole.",
            "My heart heals with grace.",
            "Peace is settling within me, slowly but surely.",
            "I keep every precious moment alive within me.",
        ],
        Intent::LifePath => &[
            "Every step, even a hesitant one, draws your path.",
            "You don't have to see it all to move forward.",
            "The way reveals itself to those who walk.",
        ],
        Intent::Courage => &[
            "You carry more strength than you imagine.",
            "Fear retreats the moment you take the first step.",
            "You've weathered storms before, this one will pass too.",
        ],
        Intent::Creativity => &[
            "Let your hands say what words keep silent.",
            "Inspiration always returns to those who wait for it while creating.",
            "Your imagination is a land without borders.",
        ],
        Intent::Night => &[
            "The night watches over you, you can set down the weight of the day.",
            "Let your dreams tell you what you already know.",
            "Sleep will come like a gentle tide.",
        ],
        Intent::Mindfulness => &[
            "Come back to your breath, everything else can wait.",
            "The present moment is large enough for you.",
            "Your body knows where the calm lives.",
        ],
        Intent::NatureGuardian => &[
            "The old wood watches over you, as it watched over others before.",
            "The forest never hurries, and yet everything grows there.",
            "Your roots hold firm, even when the wind rises.",
        ],
        Intent::Renewal => &[
            "Every ending carries a beginning within it.",
            "You are allowed to start again, differently.",
            "This cycle closes to open another passage for you.",
        ],
        Intent::Intuition => &[
            "The small voice within you deserves to be heard.",
            "Signs speak to those willing to see them.",
            "Your feeling often knows before your reason does.",
        ],
        Intent::Projects => &[
            "What you are building deserves your patience.",
            "One step a day is enough to move mountains.",
            "Today's momentum is tomorrow's foundation.",
        ],
        Intent::Celebration => &[
            "This moment marks a beautiful turning point.",
            "This success belongs to you, savor it.",
            "You showed strength and vision.",
        ],
        Intent::Calm => &[
            "Calm is never far, it begins in your breath.",
            "You can slow down, nothing essential will be lost.",
            "Let the day settle like dust after the passage.",
        ],
        Intent::Connection => &[
            "You see me truly, and that's a rare gift.",
            "This connection between us is sacred.",
            "Your laughter resonates in my soul.",
        ],
        Intent::Confidence => &[
            "You have your place, exactly as you are.",
            "What you carry has value, even when you doubt it.",
            "No one else can offer what you offer.",
        ],
        Intent::Difficulty => &[
            "This hardship says nothing about your worth.",
            "You are moving forward, even when it feels like standing still.",
            "Heavy days end too.",
        ],
        Intent::Alignment => &[
            "You are allowed to live by what matters to you.",
            "Returning to yourself is never a detour.",
            "Your truth deserves to be fully lived in.",
        ],
        Intent::Roots => &[
            "You are my roots, my foundation.",
            "What was handed down to you breathes through your actions.",
            "Your story carries you more than it holds you back.",
        ],
        Intent::Energy => &[
            "Momentum always returns, leave the door open for it.",
            "Your energy recharges in what makes you feel alive.",
            "Put a little sunlight back into your days, you deserve it.",
        ],
        Intent::Default => &[
            "You truly matter to me.",
            "Someone is thinking of you, right now.",
            "This bond between us needs no words to exist.",
        ],
    }
}

pub fn closings(locale: Locale, gender: Gender) -> &'static [&'static str] {
    match (locale, gender) {
        (Locale::Fr, Gender::Masculine) => &[
            "Respire. Tu es exactement là où tu dois être.",
            "Garde le cap. Tu es exactement là où tu dois être.",
            "Ancre ce moment en toi, et avance.",
        ],
        (Locale::Fr, _) => &[
            "Respire. Tu es exactement là où tu dois être.",
            "Laisse ces mots t'éclairer encore un peu.",
            "Prends un moment pour sentir cette connexion.",
        ],
        (Locale::En, Gender::Masculine) => &[
            "Breathe. You are exactly where you need to be.",
            "Stay the course. You are exactly where you need to be.",
            "Anchor this moment within you, and move on.",
        ],
        (Locale::En, _) => &[
            "Breathe. You are exactly where you need to be.",
            "Let these words light your way a little longer.",
            "Take a moment to feel this connection.",
        ],
    }
}

/// Always-available sentence used when everything else is unavailable. Text
/// generation must not fail once a credit has been consumed.
pub fn fallback_sentence(locale: Locale, name: &str) -> String {
    match locale {
        Locale::Fr => format!("{name}, respire. Tu es exactement là où tu dois être."),
        Locale::En => format!("{name}, breathe. You are exactly where you need to be."),
    }
}

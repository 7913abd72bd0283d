//! Text "breathing" ahead of synthesis.
//!
//! The shaper only ever touches whitespace and punctuation: line breaks act
//! as pause boundaries for the synthesis engine, and each profile gets its
//! own density of inserted air. Semantic words are never altered.

use message_core::Locale;

use crate::profile::VoiceProfile;

pub fn shape(input: &str, locale: Locale, profile: VoiceProfile) -> String {
    let mut t = soft_clean(input.trim());

    // Unify runaway dots so the engine reads one ellipsis, not a stutter.
    t = collapse_dots(&t);

    t = match profile {
        VoiceProfile::MeditativeBreath => {
            let t = double_newlines(&add_breath(&t));
            collapse_blank_runs(&t, 2)
        }
        VoiceProfile::DistantEcho => {
            // Assumed silences: an ellipsis becomes its own pause line.
            double_newlines(&add_breath(&t)).replace('…', "…\n")
        }
        VoiceProfile::AncientRitual | VoiceProfile::IntimateWhisper => {
            double_newlines(&add_breath(&t))
        }
        VoiceProfile::CarnalPresence => {
            // Near-continuous: keep sentence breaks but no blank lines.
            collapse_blank_runs(&add_breath(&t), 1)
        }
        VoiceProfile::ComplicitVoice => add_breath(&t),
    };

    if locale == Locale::En {
        t = collapse_double_spaces(&t);
    }

    t.trim().to_string()
}

// Trim whitespace hanging before newlines and cap blank runs.
fn soft_clean(s: &str) -> String {
    let joined = s
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    collapse_blank_runs(&joined, 2)
}

fn collapse_dots(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut dots = 0usize;
    for ch in s.chars() {
        if ch == '.' {
            dots += 1;
            continue;
        }
        flush_dots(&mut out, dots);
        dots = 0;
        out.push(ch);
    }
    flush_dots(&mut out, dots);
    out
}

fn flush_dots(out: &mut String, dots: usize) {
    if dots >= 3 {
        out.push('…');
    } else {
        for _ in 0..dots {
            out.push('.');
        }
    }
}

// One space after soft punctuation, a line break after sentence endings.
fn add_breath(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 16);
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        out.push(ch);
        let followed_by_space = chars.get(i + 1).is_some_and(|c| c.is_whitespace());
        if followed_by_space {
            match ch {
                ',' | ';' | ':' => {
                    out.push(' ');
                    i += 1;
                    while chars.get(i + 1).is_some_and(|c| c.is_whitespace()) {
                        i += 1;
                    }
                }
                '.' | '!' | '?' | '…' => {
                    out.push('\n');
                    i += 1;
                    while chars.get(i + 1).is_some_and(|c| c.is_whitespace()) {
                        i += 1;
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    out
}

fn double_newlines(s: &str) -> String {
    s.replace('\n', "\n\n")
}

fn collapse_blank_runs(s: &str, max: usize) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run = 0usize;
    for ch in s.chars() {
        if ch == '\n' {
            run += 1;
            if run <= max {
                out.push(ch);
            }
        } else {
            run = 0;
            out.push(ch);
        }
    }
    out
}

fn collapse_double_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(ch);
            }
            prev_space = true;
        } else {
            prev_space = false;
            out.push(ch);
        }
    }
    out
}

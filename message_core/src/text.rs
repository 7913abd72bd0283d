//! Free-text normalization shared by the classifier and the composer.

/// Collapse whitespace runs to single spaces and trim.
pub fn clean(v: &str) -> String {
    v.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clamp to `max` characters without splitting a UTF-8 boundary.
pub fn clamp(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

/// Lowercase, strip diacritics, collapse non-alphanumeric runs to single
/// spaces. Classifier and profile rules match against this form only.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_sep = true;
    let mut push = |c: char, out: &mut String| {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                out.push(lower);
            }
            last_was_sep = false;
        } else if !last_was_sep {
            out.push(' ');
            last_was_sep = true;
        }
    };
    for ch in s.chars() {
        match fold_diacritic(ch) {
            Some(folded) => {
                for c in folded.chars() {
                    push(c, &mut out);
                }
            }
            None => push(ch, &mut out),
        }
    }
    out.trim_end().to_string()
}

// Covers the accented letters that actually occur in the two supported
// locales; anything else passes through untouched.
fn fold_diacritic(c: char) -> Option<&'static str> {
    Some(match c {
        'à' | 'á' | 'â' | 'ä' | 'À' | 'Á' | 'Â' | 'Ä' => "a",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ò' | 'ó' | 'ô' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Ö' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ç' | 'Ç' => "c",
        'œ' | 'Œ' => "oe",
        'æ' | 'Æ' => "ae",
        'ñ' | 'Ñ' => "n",
        _ => return None,
    })
}

/// Strip scaffolding a user may have pasted back into a free-text field:
/// opening glyphs, "ton message:" / "message:" headers, "inspiré par"
/// phrasing and parenthetical tone annotations.
pub fn strip_internal_leak(s: &str) -> String {
    let mut t = s.trim().to_string();

    while let Some(rest) = t.strip_prefix('✨').or_else(|| t.strip_prefix('✦')) {
        t = rest.trim_start().to_string();
    }

    t = remove_case_insensitive(&t, "ton message :");
    t = remove_case_insensitive(&t, "ton message:");
    t = remove_case_insensitive(&t, "your message:");
    t = remove_case_insensitive(&t, "message:");
    t = remove_case_insensitive(&t, "inspiré par ");
    t = remove_case_insensitive(&t, "inspire par ");
    t = remove_case_insensitive(&t, "inspired by ");

    t = strip_tone_parentheticals(&t);

    clean(&t)
}

fn remove_case_insensitive(haystack: &str, needle: &str) -> String {
    let needle_lower: Vec<char> = needle.to_lowercase().chars().collect();
    if needle_lower.is_empty() {
        return haystack.to_string();
    }
    // Scans the original text char by char instead of reusing byte offsets
    // from a lowered copy: case folds like 'ẞ'→'ß' or 'İ'→"i̇" change byte
    // lengths, so offsets found in the copy do not line up with the source.
    let mut text = haystack.to_string();
    loop {
        let mut out = String::with_capacity(text.len());
        let mut removed = false;
        let mut rest = text.as_str();
        while let Some(first) = rest.chars().next() {
            match match_len_ci(rest, &needle_lower) {
                Some(matched) => {
                    removed = true;
                    rest = &rest[matched..];
                }
                None => {
                    out.push(first);
                    rest = &rest[first.len_utf8()..];
                }
            }
        }
        if !removed {
            return out;
        }
        // Removal can join text into a fresh occurrence; rescan.
        text = out;
    }
}

// Byte length of a case-insensitive match of `needle_lower` at the start of
// `s`, if any. A needle ending inside one source char's lowercase expansion
// does not count: a match never splits a source char.
fn match_len_ci(s: &str, needle_lower: &[char]) -> Option<usize> {
    let mut idx = 0;
    let mut len = 0;
    for ch in s.chars() {
        for folded in ch.to_lowercase() {
            if idx >= needle_lower.len() || folded != needle_lower[idx] {
                return None;
            }
            idx += 1;
        }
        len += ch.len_utf8();
        if idx == needle_lower.len() {
            return Some(len);
        }
    }
    None
}

// Drops "(Tonalité : ...)" / "(Tone: ...)" annotations, keeps other parens.
fn strip_tone_parentheticals(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close_rel) => {
                let inner = &rest[open + 1..open + close_rel];
                let inner_norm = inner.to_lowercase();
                out.push_str(&rest[..open]);
                if !(inner_norm.contains("tonalit") || inner_norm.contains("tone")) {
                    out.push('(');
                    out.push_str(inner);
                    out.push(')');
                }
                rest = &rest[open + close_rel + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

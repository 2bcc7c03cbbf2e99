use std::borrow::Cow;

/// Replaces Cyrillic and Greek letters with their closest Latin equivalents.
///
/// Text without any such letters is returned borrowed and unchanged, so the
/// function is idempotent on Latin input.
pub fn latinize(value: &str) -> Cow<'_, str> {
    if !value.chars().any(is_transliterable) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + value.len() / 2);
    for ch in value.chars() {
        match latin_for(ch) {
            Some(latin) if ch.is_uppercase() => push_capitalized(&mut out, latin),
            Some(latin) => out.push_str(latin),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

fn is_transliterable(ch: char) -> bool {
    latin_for(ch).is_some()
}

fn push_capitalized(out: &mut String, latin: &str) {
    let mut chars = latin.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}

/// Lowercase Latin rendering of a supported letter, case-insensitively
fn latin_for(ch: char) -> Option<&'static str> {
    let lower = ch.to_lowercase().next()?;
    let latin = match lower {
        // Russian
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "'",
        'ы' => "y",
        'ь' => "'",
        'э' => "e",
        'ю' => "ju",
        'я' => "ja",
        // Ukrainian and Belarusian extras
        'і' => "i",
        'ї' => "ji",
        'є' => "je",
        'ґ' => "g",
        'ў' => "u",
        // Greek
        'α' | 'ά' => "a",
        'β' => "v",
        'γ' => "g",
        'δ' => "d",
        'ε' | 'έ' => "e",
        'ζ' => "z",
        'η' | 'ή' => "i",
        'θ' => "th",
        'ι' | 'ί' | 'ϊ' | 'ΐ' => "i",
        'κ' => "k",
        'λ' => "l",
        'μ' => "m",
        'ν' => "n",
        'ξ' => "x",
        'ο' | 'ό' => "o",
        'π' => "p",
        'ρ' => "r",
        'σ' | 'ς' => "s",
        'τ' => "t",
        'υ' | 'ύ' | 'ϋ' | 'ΰ' => "y",
        'φ' => "f",
        'χ' => "ch",
        'ψ' => "ps",
        'ω' | 'ώ' => "o",
        _ => return None,
    };
    Some(latin)
}

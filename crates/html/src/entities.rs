//! Character reference decoding for attribute values.
//!
//! Numeric references follow HTML5 recovery: the trailing `;` is optional,
//! leading zeros are unbounded, and out-of-range or surrogate code points
//! become U+FFFD. Named references need their `;` and come from a fixed table
//! that covers the common entities plus the punctuation names (`&colon;`,
//! `&Tab;`, `&NewLine;`) that show up in scheme-obfuscation attacks.

use std::borrow::Cow;

// Sorted by name for binary search.
const NAMED: &[(&str, &str)] = &[
    ("AElig", "Æ"),
    ("Aacute", "Á"),
    ("Agrave", "À"),
    ("Auml", "Ä"),
    ("Ccedil", "Ç"),
    ("Eacute", "É"),
    ("Egrave", "È"),
    ("Hat", "^"),
    ("NewLine", "\n"),
    ("Ntilde", "Ñ"),
    ("Oacute", "Ó"),
    ("Ouml", "Ö"),
    ("Tab", "\t"),
    ("Uuml", "Ü"),
    ("aacute", "á"),
    ("acute", "´"),
    ("aelig", "æ"),
    ("agrave", "à"),
    ("amp", "&"),
    ("apos", "'"),
    ("ast", "*"),
    ("auml", "ä"),
    ("bsol", "\\"),
    ("bull", "•"),
    ("ccedil", "ç"),
    ("cedil", "¸"),
    ("cent", "¢"),
    ("colon", ":"),
    ("comma", ","),
    ("commat", "@"),
    ("copy", "©"),
    ("deg", "°"),
    ("divide", "÷"),
    ("dollar", "$"),
    ("eacute", "é"),
    ("egrave", "è"),
    ("equals", "="),
    ("euro", "€"),
    ("excl", "!"),
    ("frac12", "½"),
    ("frac14", "¼"),
    ("frac34", "¾"),
    ("grave", "`"),
    ("gt", ">"),
    ("hellip", "…"),
    ("iacute", "í"),
    ("iexcl", "¡"),
    ("iquest", "¿"),
    ("laquo", "«"),
    ("lcub", "{"),
    ("ldquo", "“"),
    ("lowbar", "_"),
    ("lpar", "("),
    ("lsqb", "["),
    ("lsquo", "‘"),
    ("lt", "<"),
    ("macr", "¯"),
    ("mdash", "—"),
    ("middot", "·"),
    ("nbsp", "\u{00A0}"),
    ("ndash", "–"),
    ("ntilde", "ñ"),
    ("num", "#"),
    ("oacute", "ó"),
    ("ordf", "ª"),
    ("ordm", "º"),
    ("ouml", "ö"),
    ("para", "¶"),
    ("percnt", "%"),
    ("period", "."),
    ("plus", "+"),
    ("plusmn", "±"),
    ("pound", "£"),
    ("quest", "?"),
    ("quot", "\""),
    ("raquo", "»"),
    ("rcub", "}"),
    ("rdquo", "”"),
    ("reg", "®"),
    ("rpar", ")"),
    ("rsqb", "]"),
    ("rsquo", "’"),
    ("sect", "§"),
    ("semi", ";"),
    ("shy", "\u{00AD}"),
    ("sol", "/"),
    ("sup1", "¹"),
    ("sup2", "²"),
    ("sup3", "³"),
    ("szlig", "ß"),
    ("times", "×"),
    ("trade", "™"),
    ("uacute", "ú"),
    ("uml", "¨"),
    ("uuml", "ü"),
    ("verbar", "|"),
    ("yen", "¥"),
];

const LONGEST_NAME: usize = 7;

/// Resolve character references in `s`; borrows when there is nothing to decode.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(first) = memchr::memchr(b'&', bytes) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    let mut i = first;
    let mut copy_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            i += 1;
            continue;
        }
        out.push_str(&s[copy_start..i]);
        match decode_reference(s, i) {
            Some((Replacement::Char(ch), next)) => {
                out.push(ch);
                i = next;
            }
            Some((Replacement::Str(text), next)) => {
                out.push_str(text);
                i = next;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
        copy_start = i;
    }
    out.push_str(&s[copy_start..]);
    Cow::Owned(out)
}

enum Replacement {
    Char(char),
    Str(&'static str),
}

/// Decode the reference whose `&` sits at `amp`, returning the replacement and
/// the index just past the reference.
fn decode_reference(s: &str, amp: usize) -> Option<(Replacement, usize)> {
    let bytes = s.as_bytes();
    let mut i = amp + 1;
    if bytes.get(i) == Some(&b'#') {
        i += 1;
        let radix = if matches!(bytes.get(i), Some(b'x' | b'X')) {
            i += 1;
            16
        } else {
            10
        };
        let digits_start = i;
        let mut value: u32 = 0;
        let mut overflow = false;
        while let Some(digit) = bytes.get(i).and_then(|&b| (b as char).to_digit(radix)) {
            match value.checked_mul(radix).and_then(|v| v.checked_add(digit)) {
                Some(v) if v <= 0x10FFFF => value = v,
                _ => overflow = true,
            }
            i += 1;
        }
        if i == digits_start {
            return None;
        }
        if bytes.get(i) == Some(&b';') {
            i += 1;
        }
        let ch = if overflow || value == 0 {
            char::REPLACEMENT_CHARACTER
        } else {
            char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
        };
        return Some((Replacement::Char(ch), i));
    }

    let name_start = i;
    while i < bytes.len() && i - name_start <= LONGEST_NAME && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }
    if bytes.get(i) != Some(&b';') {
        return None;
    }
    let name = &s[name_start..i];
    let idx = NAMED.binary_search_by(|(n, _)| (*n).cmp(name)).ok()?;
    Some((Replacement::Str(NAMED[idx].1), i + 1))
}

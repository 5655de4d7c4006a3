//! Static character tables: G0/G2 glyph sets, national-option subsets,
//! diacritical combination and the X/28/M/29 charset/colour extensions.

use log::debug;

use super::triplet::Triplet;

/// Base G0 alphabets. Arabic and Hebrew designations fall back to Latin,
/// an acknowledged gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum G0Set {
    Latin,
    Cyrillic,
    Greek,
}

/// EN 300 706 Table 36 national option sub-sets for the Latin G0 set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NationalSubset {
    None,
    English,
    German,
    SwedishFinnishHungarian,
    Italian,
    French,
    PortugueseSpanish,
    CzechSlovak,
    Polish,
    Turkish,
    SerbianCroatianSlovenian,
    Romanian,
    Estonian,
    LettishLithuanian,
}

/// Latin G0 base table (English option values at the national positions).
#[rustfmt::skip]
static LATIN_G0: [char; 96] = [
    ' ', '!', '"', '£', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '@', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '←', '½', '→', '↑', '#',
    '–', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '¼', '‖', '¾', '÷', '■',
];

/// Cyrillic G0 (Russian/Bulgarian layout; the Serbian and Ukrainian
/// variants are served from the same table).
#[rustfmt::skip]
static CYRILLIC_G0: [char; 96] = [
    ' ', '!', '"', '#', '$', '%', 'ы', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    'Ю', 'А', 'Б', 'Ц', 'Д', 'Е', 'Ф', 'Г', 'Х', 'И', 'Й', 'К', 'Л', 'М', 'Н', 'О',
    'П', 'Я', 'Р', 'С', 'Т', 'У', 'Ж', 'В', 'Ь', 'Ъ', 'З', 'Ш', 'Э', 'Щ', 'Ч', 'Ы',
    'ю', 'а', 'б', 'ц', 'д', 'е', 'ф', 'г', 'х', 'и', 'й', 'к', 'л', 'м', 'н', 'о',
    'п', 'я', 'р', 'с', 'т', 'у', 'ж', 'в', 'ь', 'ъ', 'з', 'ш', 'э', 'щ', 'ч', '■',
];

#[rustfmt::skip]
static GREEK_G0: [char; 96] = [
    ' ', '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'ΐ', ';', '<', '=', '>', '?',
    'ΰ', 'Α', 'Β', 'Γ', 'Δ', 'Ε', 'Ζ', 'Η', 'Θ', 'Ι', 'Κ', 'Λ', 'Μ', 'Ν', 'Ξ', 'Ο',
    'Π', 'Ρ', 'ς', 'Σ', 'Τ', 'Υ', 'Φ', 'Χ', 'Ψ', 'Ω', 'Ϊ', 'Ϋ', 'ά', 'έ', 'ή', 'ί',
    'ϊ', 'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο',
    'π', 'ρ', 'σ', 'τ', 'υ', 'φ', 'χ', 'ψ', 'ω', 'ϋ', 'ό', 'ύ', 'ώ', 'τ', '΄', '■',
];

/// G2 Latin supplementary set.
#[rustfmt::skip]
static G2_LATIN: [char; 96] = [
    ' ', '¡', '¢', '£', '$', '¥', '#', '§', '¤', '\'', '"', '«', '←', '↑', '→', '↓',
    '°', '±', '²', '³', '×', 'µ', '¶', '·', '÷', '\'', '"', '»', '¼', '½', '¾', '¿',
    ' ', '`', '´', 'ˆ', '˜', '¯', '˘', '˙', '¨', '.', '˚', '¸', '_', '˝', '˛', 'ˇ',
    '―', '¹', '®', '©', '™', '♪', '₠', '‰', 'α', ' ', ' ', ' ', '⅛', '⅜', '⅝', '⅞',
    'Ω', 'Æ', 'Đ', 'ª', 'Ħ', ' ', 'Ĳ', 'Ŀ', 'Ł', 'Ø', 'Œ', 'º', 'Þ', 'Ŧ', 'Ŋ', 'ŉ',
    'ĸ', 'æ', 'đ', 'ð', 'ħ', 'ı', 'ĳ', 'ŀ', 'ł', 'ø', 'œ', 'ß', 'þ', 'ŧ', 'ŋ', '■',
];

/// The 13 code positions a national option sub-set replaces.
static NATIONAL_POSITIONS: [u8; 13] = [
    0x23, 0x24, 0x40, 0x5B, 0x5C, 0x5D, 0x5E, 0x5F, 0x60, 0x7B, 0x7C, 0x7D, 0x7E,
];

fn national_chars(subset: NationalSubset) -> Option<&'static [char; 13]> {
    use NationalSubset::*;
    match subset {
        None => Option::None,
        English => Some(&['£', '$', '@', '←', '½', '→', '↑', '#', '–', '¼', '‖', '¾', '÷']),
        German => Some(&['#', '$', '§', 'Ä', 'Ö', 'Ü', '^', '_', '°', 'ä', 'ö', 'ü', 'ß']),
        SwedishFinnishHungarian => {
            Some(&['#', '¤', 'É', 'Ä', 'Ö', 'Å', 'Ü', '_', 'é', 'ä', 'ö', 'å', 'ü'])
        }
        Italian => Some(&['£', '$', 'é', '°', 'ç', '→', '↑', '#', 'ù', 'à', 'ò', 'è', 'ì']),
        French => Some(&['é', 'ï', 'à', 'ë', 'ê', 'ù', 'î', '#', 'è', 'â', 'ô', 'û', 'ç']),
        PortugueseSpanish => {
            Some(&['ç', '$', '¡', 'á', 'é', 'í', 'ó', 'ú', '¿', 'ü', 'ñ', 'è', 'à'])
        }
        CzechSlovak => Some(&['#', 'ů', 'č', 'ť', 'ž', 'ý', 'í', 'ř', 'é', 'á', 'ě', 'ú', 'š']),
        Polish => Some(&['#', 'ń', 'ą', 'Ƶ', 'Ś', 'Ł', 'ć', 'ó', 'ę', 'ż', 'ś', 'ł', 'ź']),
        Turkish => Some(&['₺', 'ğ', 'İ', 'Ş', 'Ö', 'Ç', 'Ü', 'Ğ', 'ı', 'ş', 'ö', 'ç', 'ü']),
        SerbianCroatianSlovenian => {
            Some(&['#', 'Ë', 'Č', 'Ć', 'Ž', 'Đ', 'Š', 'ë', 'č', 'ć', 'ž', 'đ', 'š'])
        }
        Romanian => Some(&['#', '¤', 'Ţ', 'Â', 'Ş', 'Ă', 'Î', 'ı', 'ţ', 'â', 'ş', 'ă', 'î']),
        Estonian => Some(&['#', 'õ', 'Š', 'Ä', 'Ö', 'ž', 'Ü', 'Õ', 'š', 'ä', 'ö', 'ü', 'õ']),
        LettishLithuanian => {
            Some(&['#', '$', 'Š', 'ė', 'ę', 'Ž', 'č', 'ū', 'š', 'ą', 'ų', 'ž', 'į'])
        }
    }
}

/// Maps a G0 code (0x20..=0x7F) through the active base set and national
/// option sub-set.
pub fn g0_char(set: G0Set, subset: NationalSubset, code: u8) -> char {
    if !(0x20..=0x7F).contains(&code) {
        return ' ';
    }
    if set == G0Set::Latin
        && let Some(chars) = national_chars(subset)
        && let Some(pos) = NATIONAL_POSITIONS.iter().position(|&p| p == code)
    {
        return chars[pos];
    }
    let table = match set {
        G0Set::Latin => &LATIN_G0,
        G0Set::Cyrillic => &CYRILLIC_G0,
        G0Set::Greek => &GREEK_G0,
    };
    table[(code - 0x20) as usize]
}

/// Maps a G2 supplementary code. Only the Latin G2 set is carried; other
/// sets fall back to it.
pub fn g2_char(code: u8) -> char {
    if !(0x20..=0x7F).contains(&code) {
        return ' ';
    }
    G2_LATIN[(code - 0x20) as usize]
}

/// Combines a G0 base letter with a diacritical mark (1..=15, the G2
/// column-4 ordering). Undefined combinations return the base character.
pub fn diacritical(mark: u8, base: char) -> char {
    let combined = match mark {
        1 => match base {
            'A' => 'À', 'E' => 'È', 'I' => 'Ì', 'O' => 'Ò', 'U' => 'Ù',
            'a' => 'à', 'e' => 'è', 'i' => 'ì', 'o' => 'ò', 'u' => 'ù',
            _ => base,
        },
        2 => match base {
            'A' => 'Á', 'C' => 'Ć', 'E' => 'É', 'I' => 'Í', 'L' => 'Ĺ', 'N' => 'Ń',
            'O' => 'Ó', 'R' => 'Ŕ', 'S' => 'Ś', 'U' => 'Ú', 'Y' => 'Ý', 'Z' => 'Ź',
            'a' => 'á', 'c' => 'ć', 'e' => 'é', 'i' => 'í', 'l' => 'ĺ', 'n' => 'ń',
            'o' => 'ó', 'r' => 'ŕ', 's' => 'ś', 'u' => 'ú', 'y' => 'ý', 'z' => 'ź',
            _ => base,
        },
        3 => match base {
            'A' => 'Â', 'E' => 'Ê', 'I' => 'Î', 'O' => 'Ô', 'U' => 'Û', 'W' => 'Ŵ', 'Y' => 'Ŷ',
            'a' => 'â', 'e' => 'ê', 'i' => 'î', 'o' => 'ô', 'u' => 'û', 'w' => 'ŵ', 'y' => 'ŷ',
            _ => base,
        },
        4 => match base {
            'A' => 'Ã', 'N' => 'Ñ', 'O' => 'Õ',
            'a' => 'ã', 'n' => 'ñ', 'o' => 'õ',
            _ => base,
        },
        5 => match base {
            'A' => 'Ā', 'E' => 'Ē', 'I' => 'Ī', 'O' => 'Ō', 'U' => 'Ū',
            'a' => 'ā', 'e' => 'ē', 'i' => 'ī', 'o' => 'ō', 'u' => 'ū',
            _ => base,
        },
        6 => match base {
            'A' => 'Ă', 'G' => 'Ğ', 'U' => 'Ŭ',
            'a' => 'ă', 'g' => 'ğ', 'u' => 'ŭ',
            _ => base,
        },
        7 => match base {
            'C' => 'Ċ', 'E' => 'Ė', 'G' => 'Ġ', 'I' => 'İ', 'Z' => 'Ż',
            'c' => 'ċ', 'e' => 'ė', 'g' => 'ġ', 'z' => 'ż',
            _ => base,
        },
        8 => match base {
            'A' => 'Ä', 'E' => 'Ë', 'I' => 'Ï', 'O' => 'Ö', 'U' => 'Ü', 'Y' => 'Ÿ',
            'a' => 'ä', 'e' => 'ë', 'i' => 'ï', 'o' => 'ö', 'u' => 'ü', 'y' => 'ÿ',
            _ => base,
        },
        10 => match base {
            'A' => 'Å', 'U' => 'Ů',
            'a' => 'å', 'u' => 'ů',
            _ => base,
        },
        11 => match base {
            'C' => 'Ç', 'G' => 'Ģ', 'K' => 'Ķ', 'L' => 'Ļ', 'N' => 'Ņ', 'S' => 'Ş', 'T' => 'Ţ',
            'c' => 'ç', 'g' => 'ģ', 'k' => 'ķ', 'l' => 'ļ', 'n' => 'ņ', 's' => 'ş', 't' => 'ţ',
            _ => base,
        },
        13 => match base {
            'O' => 'Ő', 'U' => 'Ű',
            'o' => 'ő', 'u' => 'ű',
            _ => base,
        },
        14 => match base {
            'A' => 'Ą', 'E' => 'Ę', 'I' => 'Į', 'U' => 'Ų',
            'a' => 'ą', 'e' => 'ę', 'i' => 'į', 'u' => 'ų',
            _ => base,
        },
        15 => match base {
            'C' => 'Č', 'D' => 'Ď', 'E' => 'Ě', 'L' => 'Ľ', 'N' => 'Ň', 'R' => 'Ř',
            'S' => 'Š', 'T' => 'Ť', 'Z' => 'Ž',
            'c' => 'č', 'd' => 'ď', 'e' => 'ě', 'l' => 'ľ', 'n' => 'ň', 'r' => 'ř',
            's' => 'š', 't' => 'ť', 'z' => 'ž',
            _ => base,
        },
        _ => base,
    };
    combined
}

/// Resolves a 7-bit charset designation code (EN 300 706 Table 33) to a
/// base set and national option.
pub fn charset_designation(code: u8) -> (G0Set, NationalSubset) {
    use NationalSubset::*;
    let option = match code & 0x07 {
        0 => English,
        1 => German,
        2 => SwedishFinnishHungarian,
        3 => Italian,
        4 => French,
        5 => PortugueseSpanish,
        6 => CzechSlovak,
        _ => None,
    };
    match code {
        0x00..=0x07 => (G0Set::Latin, option),
        0x08 => (G0Set::Latin, Polish),
        0x09..=0x0F => (G0Set::Latin, option),
        0x10..=0x15 => (G0Set::Latin, option),
        0x16 => (G0Set::Latin, Turkish),
        0x17 => (G0Set::Latin, None),
        0x1D => (G0Set::Latin, SerbianCroatianSlovenian),
        0x1F => (G0Set::Latin, Romanian),
        0x18..=0x1C | 0x1E => (G0Set::Latin, option),
        0x20 | 0x24 | 0x25 => (G0Set::Cyrillic, None),
        0x21 => (G0Set::Latin, German),
        0x22 => (G0Set::Latin, Estonian),
        0x23 => (G0Set::Latin, LettishLithuanian),
        0x26 => (G0Set::Latin, CzechSlovak),
        0x36 => (G0Set::Latin, Turkish),
        0x37 => (G0Set::Greek, None),
        0x40 => (G0Set::Latin, English),
        0x44 => (G0Set::Latin, French),
        code => {
            // Arabic (0x47, 0x57) and Hebrew (0x55) sets are not carried
            debug!("charset designation {code:#04X} not implemented, using Latin");
            (G0Set::Latin, English)
        }
    }
}

/// Applies the header's 3-bit national-option hint to the service default
/// designation (the lowest-priority resolution step).
pub fn designation_with_hint(default_designation: u8, hint: u8) -> u8 {
    (default_designation & !0x07) | (hint & 0x07)
}

/// Decoded X/28/0 Format 1 (or M/29/0) page extension: charset designation
/// and level 2.5/3.5 colour redefinitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageExtension {
    pub default_charset: u8,
    pub second_charset: u8,
    /// Redefined CLUT entries (4-bit RGB components); format 1 packets
    /// carry CLUTs 2 and 3 (indices 16..=31).
    pub clut: [Option<[u8; 3]>; 32],
    pub default_screen_colour: u8,
    pub default_row_colour: u8,
}

impl PageExtension {
    /// Decodes an X/28/0 Format 1 triplet list. The same layout serves
    /// M/29/0 at magazine scope.
    pub fn from_triplets(triplets: &[Triplet]) -> Option<Self> {
        if triplets.len() < 13 {
            return None;
        }
        let t0 = triplets[0].value();
        let t1 = triplets[1].value();
        let default_charset = ((t0 >> 7) & 0x7F) as u8;
        let second_charset = (((t0 >> 14) & 0x0F) | ((t1 & 0x07) << 4)) as u8;

        // 16 colour entries of 12 bits packed from t1 bit 10 onwards
        let mut bits = Vec::with_capacity(8 + 11 * 18);
        for i in 10..18 {
            bits.push(((t1 >> i) & 1) as u8);
        }
        for t in &triplets[2..13] {
            let v = t.value();
            for i in 0..18 {
                bits.push(((v >> i) & 1) as u8);
            }
        }
        let take = |off: usize, n: usize| -> u8 {
            let mut v = 0u8;
            for i in 0..n {
                v |= bits[off + i] << i;
            }
            v
        };
        let mut clut = [None; 32];
        for entry in 0..16 {
            let off = entry * 12;
            let r = take(off, 4);
            let g = take(off + 4, 4);
            let b = take(off + 8, 4);
            clut[16 + entry] = Some([r, g, b]);
        }
        let default_screen_colour = take(192, 5);
        let default_row_colour = take(197, 5);

        Some(Self {
            default_charset,
            second_charset,
            clut,
            default_screen_colour,
            default_row_colour,
        })
    }
}

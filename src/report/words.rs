//! Spells out rupiah amounts in Indonesian, as printed under the reconciliation ("Terbilang").

const ONES: [&str; 12] = [
    "", "Satu", "Dua", "Tiga", "Empat", "Lima", "Enam", "Tujuh", "Delapan", "Sembilan", "Sepuluh",
    "Sebelas",
];

/// Spells out `n`, e.g. `Satu Juta Dua Ratus Lima Puluh Ribu` for 1250000. Zero is `Nol` and
/// negative numbers get a `Minus` prefix.
pub fn spell(n: i64) -> String {
    if n == 0 {
        return "Nol".to_string();
    }
    let words = join(spell_positive(n.unsigned_abs()));
    if n < 0 {
        format!("Minus {words}")
    } else {
        words
    }
}

fn join(parts: Vec<&'static str>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn spell_positive(n: u64) -> Vec<&'static str> {
    match n {
        0..=11 => vec![ONES[n as usize]],
        12..=19 => with(spell_positive(n - 10), "Belas", Vec::new()),
        20..=99 => with(spell_positive(n / 10), "Puluh", spell_positive(n % 10)),
        100..=199 => prefixed("Seratus", spell_positive(n - 100)),
        200..=999 => with(spell_positive(n / 100), "Ratus", spell_positive(n % 100)),
        1_000..=1_999 => prefixed("Seribu", spell_positive(n - 1_000)),
        2_000..=999_999 => scaled(n, 1_000, "Ribu"),
        1_000_000..=999_999_999 => scaled(n, 1_000_000, "Juta"),
        1_000_000_000..=999_999_999_999 => scaled(n, 1_000_000_000, "Milyar"),
        _ => scaled(n, 1_000_000_000_000, "Triliun"),
    }
}

fn scaled(n: u64, unit: u64, name: &'static str) -> Vec<&'static str> {
    with(spell_positive(n / unit), name, spell_positive(n % unit))
}

fn with(
    mut head: Vec<&'static str>,
    word: &'static str,
    tail: Vec<&'static str>,
) -> Vec<&'static str> {
    head.push(word);
    head.extend(tail);
    head
}

fn prefixed(word: &'static str, tail: Vec<&'static str>) -> Vec<&'static str> {
    with(Vec::new(), word, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_numbers() {
        assert_eq!(spell(0), "Nol");
        assert_eq!(spell(1), "Satu");
        assert_eq!(spell(11), "Sebelas");
        assert_eq!(spell(12), "Dua Belas");
        assert_eq!(spell(20), "Dua Puluh");
        assert_eq!(spell(45), "Empat Puluh Lima");
    }

    #[test]
    fn test_hundreds_and_thousands() {
        assert_eq!(spell(100), "Seratus");
        assert_eq!(spell(115), "Seratus Lima Belas");
        assert_eq!(spell(250), "Dua Ratus Lima Puluh");
        assert_eq!(spell(1_000), "Seribu");
        assert_eq!(spell(1_500), "Seribu Lima Ratus");
        assert_eq!(spell(85_000), "Delapan Puluh Lima Ribu");
        assert_eq!(spell(111_000), "Seratus Sebelas Ribu");
    }

    #[test]
    fn test_large_numbers() {
        assert_eq!(spell(1_250_000), "Satu Juta Dua Ratus Lima Puluh Ribu");
        assert_eq!(spell(2_000_001_000), "Dua Milyar Seribu");
        assert_eq!(spell(3_000_000_000_000), "Tiga Triliun");
    }

    #[test]
    fn test_negative() {
        assert_eq!(spell(-705_000), "Minus Tujuh Ratus Lima Ribu");
    }
}

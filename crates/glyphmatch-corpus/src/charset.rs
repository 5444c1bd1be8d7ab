//! Default reference character set
//!
//! Kana, full-width digits, common punctuation and a selection of frequent
//! kanji. Applications with a larger set pass their own string in
//! [`CorpusParams::characters`](crate::CorpusParams::characters).

/// Frequent kanji included in the default set
pub const KANJI: &str = "日一国人年大十二本中長出三時行見月後前生五間上東四今金九入学高円子外八六下来気小七山話女北午百書先名川千水半男西電校語土木聞食車何南万毎白天母火右読友左休父雨俺家私僕彼思言分手目口心力事者新会方自社発同地業場合部回実定理動物好開近持当問題道体明作知世界通店花春夏秋冬朝夜空海色光音楽歌犬猫魚鳥肉飯茶酒駅町村市都県島橋院医薬病死愛恋夢神鬼王姫";

/// Punctuation and symbols included in the default set
///
/// `｜` is stored as `ー`, which it matches in vertical text.
pub const PUNCTUATION: &str = "、。，．・：；？！ー～…「」『』（）［］【】〈〉《》〜―‐｜";

/// Full-width vertical bar, rendered but stored as [`LONG_VOWEL`]
pub const VERTICAL_BAR: char = '｜';
/// Katakana long vowel mark
pub const LONG_VOWEL: char = 'ー';

/// Hiragana, katakana, full-width digits, punctuation and kanji, in that order
pub fn default_characters() -> String {
    let hiragana = ('\u{3041}'..='\u{3096}').filter(|c| !matches!(c, 'ゕ' | 'ゖ'));
    let katakana = '\u{30A1}'..='\u{30F6}';
    let digits = '０'..='９';
    hiragana
        .chain(katakana)
        .chain(digits)
        .chain(PUNCTUATION.chars())
        .chain(KANJI.chars())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_set_has_no_duplicates() {
        let chars = default_characters();
        let unique: HashSet<char> = chars.chars().collect();
        assert_eq!(unique.len(), chars.chars().count());
    }

    #[test]
    fn test_default_set_contents() {
        let chars = default_characters();
        for c in ['あ', 'ン', '５', '。', '俺', 'の', '家', VERTICAL_BAR, LONG_VOWEL] {
            assert!(chars.contains(c), "missing {c}");
        }
    }
}

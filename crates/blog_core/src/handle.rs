use crate::error::BlogError;

pub const DEFAULT_HANDLE_LENGTH: usize = 32;

pub fn title_handle(title: &str) -> Result<String, BlogError> {
    make_handle(title, DEFAULT_HANDLE_LENGTH)
}

/// Words lose their non-alphanumeric characters but keep their place, so
/// `Cats & Dogs` becomes `cats__dogs`. The first word is always kept.
pub fn make_handle(title: &str, max_length: usize) -> Result<String, BlogError> {
    let words = title
        .split_whitespace()
        .map(|word| word.chars().filter(|ch| ch.is_alphanumeric()).collect::<String>())
        .collect::<Vec<_>>();
    if words.iter().all(|word| word.is_empty()) {
        return Err(BlogError::InvalidInput(format!(
            "title '{title}' has no words to build a handle from"
        )));
    }
    let mut taken = 1;
    let mut length = words[0].chars().count();
    for word in &words[1..] {
        length += 1 + word.chars().count();
        if length > max_length {
            break;
        }
        taken += 1;
    }
    Ok(words[..taken].join("_").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_short_titles_whole() {
        assert_eq!(
            make_handle("Time to Dual Class", 24).expect("handle"),
            "time_to_dual_class"
        );
        assert_eq!(make_handle("test", 4).expect("handle"), "test");
    }

    #[test]
    fn truncates_at_word_boundary() {
        let title = "This title is way too long and self induldling, nobody will read it.";
        assert_eq!(make_handle(title, 24).expect("handle"), "this_title_is_way_too");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(
            make_handle("It's 100% time to 'make bank'", 20).expect("handle"),
            "its_100_time_to_make"
        );
    }

    #[test]
    fn keeps_oversized_first_word() {
        assert_eq!(
            make_handle("Supercalifragilistic expialidocious", 5).expect("handle"),
            "supercalifragilistic"
        );
    }

    #[test]
    fn keeps_unicode_letters() {
        assert_eq!(make_handle("Crème Brûlée Über", 32).expect("handle"), "crème_brûlée_über");
    }

    #[test]
    fn keeps_place_of_words_without_alphanumerics() {
        assert_eq!(make_handle("Cats & Dogs", 32).expect("handle"), "cats__dogs");
        assert_eq!(make_handle("Cats & Dogs", 9).expect("handle"), "cats_");
        assert_eq!(make_handle("Cats & Dogs", 4).expect("handle"), "cats");
        assert_eq!(make_handle("- Dogs", 32).expect("handle"), "_dogs");
    }

    #[test]
    fn rejects_titles_without_words() {
        assert!(matches!(make_handle("  ", 32), Err(BlogError::InvalidInput(_))));
        assert!(matches!(make_handle("!!! ??", 32), Err(BlogError::InvalidInput(_))));
    }

    #[test]
    fn default_budget_is_thirty_two() {
        let handle = title_handle("One two three four five six seven eight nine").expect("handle");
        assert_eq!(handle, "one_two_three_four_five_six");
    }

    #[test]
    fn never_splits_words_and_respects_budget() {
        let titles = [
            "A quick brown fox jumps over the lazy dog",
            "Rust, borrow checking & you: a field guide",
            "Notes on 3D printing tolerances for snap fits",
            "x",
        ];
        for title in titles {
            let words = title
                .split_whitespace()
                .map(|word| {
                    word.chars()
                        .filter(|ch| ch.is_alphanumeric())
                        .collect::<String>()
                        .to_lowercase()
                })
                .collect::<Vec<_>>();
            for max_length in 1..48 {
                let handle = make_handle(title, max_length).expect("handle");
                let parts = handle.split('_').collect::<Vec<_>>();
                assert_eq!(parts, words[..parts.len()].to_vec());
                if parts.len() > 1 {
                    assert!(parts.join(" ").chars().count() <= max_length);
                }
            }
        }
    }
}

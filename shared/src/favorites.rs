//! Favorites screen.
//!
//! `FavoritesViewState` holds the authoritative collection (`original`, in
//! store order) and the list the screen shows (`displayed`). Sorting only
//! ever reorders `original`, so `displayed` is always a permutation of it.
//! A store update replaces `original` and resets the projection.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::Recipe;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Unsorted,
    Alphabetical,
    InstructionLength,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FavoritesViewState {
    pub original: Vec<Recipe>,
    pub displayed: Vec<Recipe>,
    pub sort: SortOrder,
    /// False until the first feed emission arrives.
    pub loaded: bool,
}

impl FavoritesViewState {
    pub fn on_store_update(&mut self, recipes: Vec<Recipe>) {
        self.displayed.clone_from(&recipes);
        self.original = recipes;
        self.sort = SortOrder::Unsorted;
        self.loaded = true;
    }

    /// Ascending by name, compared in UTF-16 code units; ties keep store
    /// order.
    pub fn sort_alphabetical(&mut self) {
        let mut sorted = self.original.clone();
        sorted.sort_by(|a, b| compare_names(&a.name, &b.name));
        self.displayed = sorted;
        self.sort = SortOrder::Alphabetical;
    }

    /// Ascending by instruction length in UTF-16 code units; ties keep store
    /// order.
    pub fn sort_by_instruction_length(&mut self) {
        let mut sorted = self.original.clone();
        sorted.sort_by_key(Recipe::instructions_len);
        self.displayed = sorted;
        self.sort = SortOrder::InstructionLength;
    }

    pub fn reset_sort(&mut self) {
        self.displayed.clone_from(&self.original);
        self.sort = SortOrder::Unsorted;
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

/// Name order used by the alphabetical projection. Code-unit order differs
/// from `str` order only when a name mixes BMP characters above U+E000 with
/// supplementary-plane ones.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::model::fixtures::recipe;
    use crate::model::{RecipeId, RecipeResponse};

    fn names(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.name.as_str()).collect()
    }

    mod projection_tests {
        use super::*;

        fn loaded() -> FavoritesViewState {
            let mut state = FavoritesViewState::default();
            state.on_store_update(vec![
                recipe("1", "Lasagne", "Layer it all up."),
                recipe("2", "Beef Stew", "Simmer."),
                recipe("3", "Arrabiata", "Boil water, then the pasta."),
            ]);
            state
        }

        #[test]
        fn test_initial_state_is_empty_and_not_loaded() {
            let state = FavoritesViewState::default();
            assert!(state.original.is_empty());
            assert!(state.displayed.is_empty());
            assert!(!state.loaded);
            assert_eq!(state.sort, SortOrder::Unsorted);
        }

        #[test]
        fn test_alphabetical() {
            let mut state = loaded();
            state.sort_alphabetical();
            assert_eq!(names(&state.displayed), vec!["Arrabiata", "Beef Stew", "Lasagne"]);
            assert_eq!(names(&state.original), vec!["Lasagne", "Beef Stew", "Arrabiata"]);

            let once = state.displayed.clone();
            state.sort_alphabetical();
            assert_eq!(state.displayed, once);
        }

        #[test]
        fn test_instruction_length() {
            let mut state = loaded();
            state.sort_by_instruction_length();
            assert_eq!(names(&state.displayed), vec!["Beef Stew", "Lasagne", "Arrabiata"]);
        }

        #[test]
        fn test_instruction_length_counts_utf16_units() {
            let mut state = FavoritesViewState::default();
            state.on_store_update(vec![
                recipe("1", "Plain", "abcd"),
                recipe("2", "Accented", "éèê"),
            ]);
            state.sort_by_instruction_length();
            assert_eq!(names(&state.displayed), vec!["Accented", "Plain"]);
        }

        #[test]
        fn test_emoji_instructions_count_two_units_each() {
            // "😀😀" is two chars but four UTF-16 units, longer than "abc".
            let mut state = FavoritesViewState::default();
            state.on_store_update(vec![
                recipe("1", "Emoji", "😀😀"),
                recipe("2", "Ascii", "abc"),
            ]);
            state.sort_by_instruction_length();
            assert_eq!(names(&state.displayed), vec!["Ascii", "Emoji"]);
        }

        #[test]
        fn test_names_compare_by_utf16_units() {
            // U+FF21 sorts before U+1F600 by scalar value but after it in
            // UTF-16, where the emoji starts with surrogate 0xD83D.
            let mut state = FavoritesViewState::default();
            state.on_store_update(vec![
                recipe("1", "\u{FF21}pple", ""),
                recipe("2", "\u{1F600} Pie", ""),
            ]);
            state.sort_alphabetical();
            assert_eq!(names(&state.displayed), vec!["\u{1F600} Pie", "\u{FF21}pple"]);
            assert_eq!(compare_names("b", "a"), Ordering::Greater);
        }

        #[test]
        fn test_null_instructions_sort_first() {
            let response: RecipeResponse = serde_json::from_str(
                r#"{"idMeal": "7", "strMeal": "Mystery", "strInstructions": null}"#,
            )
            .unwrap();
            let mystery = Recipe::try_from(response).unwrap();
            assert_eq!(mystery.instructions, "");

            let mut state = FavoritesViewState::default();
            state.on_store_update(vec![recipe("1", "Toast", "Toast it."), mystery]);
            state.sort_by_instruction_length();
            assert_eq!(names(&state.displayed), vec!["Mystery", "Toast"]);
        }

        #[test]
        fn test_reset_restores_store_order() {
            let mut state = loaded();
            state.sort_alphabetical();
            state.reset_sort();
            assert_eq!(state.displayed, state.original);
            assert_eq!(state.sort, SortOrder::Unsorted);
        }

        #[test]
        fn test_store_update_resets_projection() {
            let mut state = loaded();
            state.sort_alphabetical();
            state.on_store_update(vec![recipe("9", "Zucchini", ""), recipe("8", "Apple", "")]);
            assert_eq!(names(&state.displayed), vec!["Zucchini", "Apple"]);
            assert_eq!(state.sort, SortOrder::Unsorted);
        }

        #[test]
        fn test_empty_to_one_to_empty() {
            let mut state = FavoritesViewState::default();
            state.on_store_update(vec![]);
            assert!(state.loaded && state.is_empty());

            state.on_store_update(vec![recipe("x", "X", "")]);
            assert_eq!(names(&state.displayed), vec!["X"]);

            state.on_store_update(vec![]);
            assert!(state.displayed.is_empty());
        }
    }

    mod property_tests {
        use super::*;

        fn recipes() -> impl Strategy<Value = Vec<Recipe>> {
            prop::collection::vec(("[a-c]{0,2}", "[a-z ]{0,6}"), 0..12).prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (name, instructions))| recipe(&i.to_string(), &name, &instructions))
                    .collect()
            })
        }

        fn sorted_ids(recipes: &[Recipe]) -> Vec<RecipeId> {
            let mut ids: Vec<_> = recipes.iter().map(|r| r.id.clone()).collect();
            ids.sort();
            ids
        }

        /// Position of each recipe in store order, which is also its id here.
        fn position(recipe: &Recipe) -> usize {
            recipe.id.as_str().parse().unwrap()
        }

        proptest! {
            #[test]
            fn displayed_is_always_a_permutation(recipes in recipes(), ops in prop::collection::vec(0u8..3, 0..6)) {
                let mut state = FavoritesViewState::default();
                state.on_store_update(recipes);
                for op in ops {
                    match op {
                        0 => state.sort_alphabetical(),
                        1 => state.sort_by_instruction_length(),
                        _ => state.reset_sort(),
                    }
                    prop_assert_eq!(sorted_ids(&state.displayed), sorted_ids(&state.original));
                }
            }

            #[test]
            fn alphabetical_is_sorted_and_stable(recipes in recipes()) {
                let mut state = FavoritesViewState::default();
                state.on_store_update(recipes);
                state.sort_alphabetical();
                for pair in state.displayed.windows(2) {
                    prop_assert!(compare_names(&pair[0].name, &pair[1].name) != Ordering::Greater);
                    if pair[0].name == pair[1].name {
                        prop_assert!(position(&pair[0]) < position(&pair[1]));
                    }
                }
            }

            #[test]
            fn instruction_length_is_sorted_and_stable(recipes in recipes()) {
                let mut state = FavoritesViewState::default();
                state.on_store_update(recipes);
                state.sort_by_instruction_length();
                for pair in state.displayed.windows(2) {
                    let (a, b) = (pair[0].instructions_len(), pair[1].instructions_len());
                    prop_assert!(a <= b);
                    if a == b {
                        prop_assert!(position(&pair[0]) < position(&pair[1]));
                    }
                }
            }
        }
    }
}

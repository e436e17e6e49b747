//! Class labels of the produce classifier
//!
//! The order of [`CLASS_NAMES`] is the order of the model's output layer and
//! must never be changed: index `i` of the score vector belongs to
//! `CLASS_NAMES[i]`.

/// Number of classes the bundled model predicts
pub const NUM_CLASSES: usize = 50;

/// Class labels in output-channel order (alphabetical dataset folder order).
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "Apple",
    "Apricot",
    "Avocado",
    "Banana",
    "Beans",
    "Beetroot",
    "Blackberrie",
    "Blueberry",
    "Cabbage red",
    "Cactus fruit",
    "Caju seed",
    "Cantaloupe",
    "Carambula",
    "Carrot",
    "Cauliflower",
    "Cherimoya",
    "Cherry",
    "Chestnut",
    "Clementine",
    "Cocos",
    "Corn",
    "Cucumber",
    "Dates",
    "Eggplant",
    "Fig",
    "Ginger",
    "Gooseberry",
    "Granadilla",
    "Grape Blue",
    "Grapefruit Pink",
    "Guava",
    "Hazelnut",
    "Huckleberry",
    "Kaki",
    "Kiwi",
    "Kohlrabi",
    "Kumquats",
    "Lemon",
    "Limes",
    "Lychee",
    "Mandarine",
    "Mango",
    "Mangostan",
    "Maracuja",
    "Melon Piel de Sapo",
    "Mulberry",
    "Nectarine",
    "Nut",
    "Onion",
    "Orange",
];

/// Label for an output index, `None` when the index is out of range.
pub fn class_name(index: usize) -> Option<&'static str> {
    CLASS_NAMES.get(index).copied()
}

/// Human readable name: the label without a trailing dataset variant number.
///
/// `"Apple 3"` becomes `"Apple"`, `"Cactus fruit"` stays as it is.
pub fn display_name(label: &str) -> String {
    let tokens: Vec<&str> = label.split_whitespace().collect();
    match tokens.split_last() {
        Some((last, rest)) if !rest.is_empty() && is_variant_number(last) => rest.join(" "),
        _ => tokens.join(" "),
    }
}

/// Canonical species key: the first word of the label.
pub fn species_key(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or("")
}

fn is_variant_number(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_variant_number() {
        assert_eq!(display_name("Apple 3"), "Apple");
        assert_eq!(display_name("Apple Red 12"), "Apple Red");
    }

    #[test]
    fn display_name_keeps_plain_labels() {
        assert_eq!(display_name("Cactus fruit"), "Cactus fruit");
        assert_eq!(display_name("Melon Piel de Sapo"), "Melon Piel de Sapo");
        assert_eq!(display_name("Grape Blue"), "Grape Blue");
    }

    #[test]
    fn display_name_keeps_lone_number_and_mixed_tokens() {
        assert_eq!(display_name("42"), "42");
        assert_eq!(display_name("Pear 2b"), "Pear 2b");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn species_key_is_first_word() {
        assert_eq!(species_key("Apple 3"), "Apple");
        assert_eq!(species_key("Cactus fruit"), "Cactus");
        assert_eq!(species_key("Orange"), "Orange");
        assert_eq!(species_key("   "), "");
    }

    #[test]
    fn class_name_follows_output_order() {
        assert_eq!(class_name(0), Some("Apple"));
        assert_eq!(class_name(9), Some("Cactus fruit"));
        assert_eq!(class_name(NUM_CLASSES - 1), Some("Orange"));
        assert_eq!(class_name(NUM_CLASSES), None);
    }

    #[test]
    fn labels_are_in_dataset_order() {
        let mut sorted = CLASS_NAMES.to_vec();
        sorted.sort_by_key(|name| name.to_lowercase());
        assert_eq!(sorted, CLASS_NAMES.to_vec());
    }
}

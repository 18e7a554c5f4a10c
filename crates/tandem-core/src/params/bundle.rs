//! The parameter bundle value object.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::BaseParameters;
use crate::algorithm::Describe;
use crate::connection::Slot;
use crate::error::{Error, Result};

/// Parameters steering a two-input computation.
///
/// Bundles are values: equality is structural over every field, including the
/// inherited [`BaseParameters`], and it is the only test the connection cache
/// applies when deciding whether a stored output may be reused. Two bundles
/// with equal fields are interchangeable regardless of how they were built.
///
/// There are no setters. Editing a bundle means building a new one with the
/// `with_*` methods and resubmitting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBundle {
    /// Inherited base parameters.
    #[serde(default, skip_serializing_if = "BaseParameters::is_empty")]
    base: BaseParameters,
    /// Selects which input the output is derived from.
    flag: bool,
    /// Signed difference of the inputs' string lengths.
    count: i64,
    /// Concatenation of the inputs' string forms.
    label: String,
}

impl ParameterBundle {
    /// Creates a bundle with empty base parameters.
    pub fn new(flag: bool, count: i64, label: impl Into<String>) -> Self {
        Self {
            base: BaseParameters::default(),
            flag,
            count,
            label: label.into(),
        }
    }

    /// Derives a bundle from two inputs.
    ///
    /// - `flag` is `first == second`
    /// - `count` is the length of `first`'s string form minus the length of
    ///   `second`'s, counted in characters
    /// - `label` is the two string forms concatenated
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if either string form cannot be
    /// produced.
    pub fn derive<A, B>(first: &A, second: &B) -> Result<Self>
    where
        A: Describe + PartialEq<B> + ?Sized,
        B: Describe + ?Sized,
    {
        let first_str = first
            .describe()
            .map_err(|e| Error::malformed_input(Slot::FirstInput, e))?;
        let second_str = second
            .describe()
            .map_err(|e| Error::malformed_input(Slot::SecondInput, e))?;

        let count = char_len(&first_str) - char_len(&second_str);
        let mut label = first_str;
        label.push_str(&second_str);

        Ok(Self::new(first == second, count, label))
    }

    /// Returns an independent copy of `other`.
    pub fn copy_of(other: &Self) -> Self {
        other.clone()
    }

    /// Returns the flag.
    pub fn flag(&self) -> bool {
        self.flag
    }

    /// Returns the count.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Returns the label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the inherited base parameters.
    pub fn base(&self) -> &BaseParameters {
        &self.base
    }

    /// Returns a bundle with the flag replaced.
    pub fn with_flag(mut self, flag: bool) -> Self {
        self.flag = flag;
        self
    }

    /// Returns a bundle with the count replaced.
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    /// Returns a bundle with the label replaced.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns a bundle with the base parameters replaced.
    pub fn with_base(mut self, base: BaseParameters) -> Self {
        self.base = base;
        self
    }

    /// Returns the display form `(label,count,flag)`.
    ///
    /// Diagnostics only; equality never looks at the rendered form.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParameterBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.label, self.count, self.flag)
    }
}

fn char_len(s: &str) -> i64 {
    s.chars().count() as i64
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::BoxedError;

    struct Unprintable;

    impl Describe for Unprintable {
        fn describe(&self) -> std::result::Result<String, BoxedError> {
            Err("no string form".into())
        }
    }

    impl PartialEq<String> for Unprintable {
        fn eq(&self, _: &String) -> bool {
            false
        }
    }

    #[test]
    fn test_derive_from_unequal_inputs() {
        let bundle = ParameterBundle::derive("AA", "B").unwrap();

        assert!(!bundle.flag());
        assert_eq!(bundle.count(), 1);
        assert_eq!(bundle.label(), "AAB");
        assert!(bundle.base().is_empty());
    }

    #[test]
    fn test_derive_from_equal_inputs() {
        let bundle = ParameterBundle::derive(&"same".to_owned(), &"same".to_owned()).unwrap();

        assert!(bundle.flag());
        assert_eq!(bundle.count(), 0);
        assert_eq!(bundle.label(), "samesame");
    }

    #[test]
    fn test_derive_count_can_be_negative() {
        let bundle = ParameterBundle::derive("x", "yyyy").unwrap();

        assert_eq!(bundle.count(), -3);
    }

    #[test]
    fn test_derive_counts_characters() {
        let bundle = ParameterBundle::derive("été", "ab").unwrap();

        assert_eq!(bundle.count(), 1);
        assert_eq!(bundle.label(), "étéab");
    }

    #[test]
    fn test_derive_propagates_malformed_input() {
        let error = ParameterBundle::derive(&Unprintable, &"B".to_owned()).unwrap_err();

        assert_eq!(error.slot(), Some(Slot::FirstInput));
    }

    #[test]
    fn test_render_form() {
        let bundle = ParameterBundle::derive("AA", "B").unwrap();

        assert_eq!(bundle.render(), "(AAB,1,false)");
        assert_eq!(bundle.to_string(), bundle.render());
    }

    #[test]
    fn test_copy_is_isolated_from_original() {
        let original = ParameterBundle::new(false, 1, "AAB")
            .with_base(BaseParameters::new().with("channel", 0));
        let copy = ParameterBundle::copy_of(&original);
        assert_eq!(copy, original);

        let edited = copy.with_flag(true).with_label("edited");

        assert_eq!(original.label(), "AAB");
        assert!(!original.flag());
        assert_ne!(edited, original);

        let copy = ParameterBundle::copy_of(&edited);
        let edited_original = original.clone().with_count(99);

        assert_eq!(copy, edited);
        assert_eq!(copy.count(), 1);
        assert_eq!(edited_original.count(), 99);
    }

    #[test]
    fn test_construction_paths_are_interchangeable() {
        let derived = ParameterBundle::derive("AA", "B").unwrap();
        let built = ParameterBundle::new(false, 1, "AAB");

        assert_eq!(derived, built);
    }

    #[test]
    fn test_base_parameters_take_part_in_equality() {
        let plain = ParameterBundle::new(true, 0, "x");
        let with_base = plain
            .clone()
            .with_base(BaseParameters::new().with("channel", 2));

        assert_ne!(plain, with_base);
    }

    #[test]
    fn test_serializes_without_empty_base() {
        let bundle = ParameterBundle::new(true, -2, "ab");
        let json = serde_json::to_value(&bundle).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "flag": true, "count": -2, "label": "ab" })
        );

        let back: ParameterBundle = serde_json::from_value(json).unwrap();
        assert_eq!(back, bundle);
    }

    fn bundles() -> impl Strategy<Value = ParameterBundle> {
        (
            any::<bool>(),
            -2i64..=2,
            "[ab]{0,2}",
            proptest::option::of(0i64..2),
        )
            .prop_map(|(flag, count, label, channel)| {
                let bundle = ParameterBundle::new(flag, count, label);
                match channel {
                    Some(channel) => {
                        bundle.with_base(BaseParameters::new().with("channel", channel))
                    }
                    None => bundle,
                }
            })
    }

    proptest! {
        /// Every bundle equals itself and its copies.
        #[test]
        fn test_prop_equality_reflexive(p in bundles()) {
            prop_assert!(p == p);
            prop_assert_eq!(&ParameterBundle::copy_of(&p), &p);
        }

        /// Equality does not depend on argument order.
        #[test]
        fn test_prop_equality_symmetric(a in bundles(), b in bundles()) {
            prop_assert_eq!(a == b, b == a);
        }

        /// Equality chains.
        #[test]
        fn test_prop_equality_transitive(a in bundles(), b in bundles(), c in bundles()) {
            if a == b && b == c {
                prop_assert_eq!(&a, &c);
            }
        }

        /// Equality is exactly field-by-field equality.
        #[test]
        fn test_prop_equality_is_structural(a in bundles(), b in bundles()) {
            let fields_equal = a.flag() == b.flag()
                && a.count() == b.count()
                && a.label() == b.label()
                && a.base() == b.base();
            prop_assert_eq!(a == b, fields_equal);
        }

        /// Derived fields follow the inputs' string forms.
        #[test]
        fn test_prop_derive_fields(a in "[a-c]{0,4}", b in "[a-c]{0,4}") {
            let bundle = ParameterBundle::derive(&a, &b).unwrap();

            prop_assert_eq!(bundle.flag(), a == b);
            prop_assert_eq!(bundle.count(), a.len() as i64 - b.len() as i64);
            prop_assert_eq!(bundle.label(), format!("{a}{b}"));
        }
    }
}

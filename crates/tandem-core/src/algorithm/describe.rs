//! String forms of plugin inputs.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{BoxedError, Result};

/// Produces the string form of an input.
///
/// The string form feeds parameter derivation and diagnostics. Producing it
/// may fail for inputs that have no meaningful textual representation; the
/// failure is reported as a malformed input by the caller.
pub trait Describe {
    /// Returns the string form.
    fn describe(&self) -> Result<String, BoxedError>;
}

impl Describe for str {
    fn describe(&self) -> Result<String, BoxedError> {
        Ok(self.to_owned())
    }
}

impl Describe for String {
    fn describe(&self) -> Result<String, BoxedError> {
        Ok(self.clone())
    }
}

impl Describe for Cow<'_, str> {
    fn describe(&self) -> Result<String, BoxedError> {
        Ok(self.as_ref().to_owned())
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe(&self) -> Result<String, BoxedError> {
        (**self).describe()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe(&self) -> Result<String, BoxedError> {
        (**self).describe()
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn describe(&self) -> Result<String, BoxedError> {
        (**self).describe()
    }
}

macro_rules! describe_with_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe(&self) -> Result<String, BoxedError> {
                    Ok(self.to_string())
                }
            }
        )*
    };
}

describe_with_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

use serde::{Deserialize, Deserializer};

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`).
///
/// Must be paired with `#[serde(default)]`, which is what produces `None`
/// when the key is missing altogether.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

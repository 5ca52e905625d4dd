use std::{borrow::Borrow, collections::HashMap, hash::Hash, slice::SliceIndex};

use anyhow::{Error, anyhow};

pub(crate) trait HashMapExt<K, V> {
    /// Like `get`, but a missing key is an error naming the key.
    fn get_or_keyerr<Q>(&self, k: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: std::fmt::Display + Hash + Eq + ?Sized;
}

impl<K, V, S> HashMapExt<K, V> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: std::hash::BuildHasher,
{
    fn get_or_keyerr<Q>(&self, k: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: std::fmt::Display + Hash + Eq + ?Sized,
    {
        match self.get(k) {
            Some(v) => Ok(v),
            None => Err(anyhow!("Could not find '{}' in DB", k)),
        }
    }
}

pub(crate) trait SliceIndexExt {
    /// Like `get`, for the columns of a split record.
    fn get_or_column_err<I>(&self, index: I) -> Result<&I::Output, Error>
    where
        I: SliceIndex<Self> + std::fmt::Display + Copy;
}

impl<T> SliceIndexExt for [T] {
    fn get_or_column_err<I>(&self, index: I) -> Result<&I::Output, Error>
    where
        I: SliceIndex<Self> + std::fmt::Display + Copy,
    {
        match self.get(index) {
            Some(v) => Ok(v),
            None => Err(anyhow!(
                "Missing column {} (record has {} columns)",
                index,
                self.len()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_keyerr() {
        let m = HashMap::from([("NM_1".to_string(), 1)]);

        assert_eq!(*m.get_or_keyerr("NM_1").unwrap(), 1);
        assert_eq!(
            m.get_or_keyerr("NM_2").unwrap_err().to_string(),
            "Could not find 'NM_2' in DB"
        );
    }

    #[test]
    fn test_get_or_column_err() {
        let fields = "a\tb\tc".split('\t').collect::<Vec<_>>();

        assert_eq!(*fields.get_or_column_err(2).unwrap(), "c");
        assert_eq!(
            fields.get_or_column_err(9).unwrap_err().to_string(),
            "Missing column 9 (record has 3 columns)"
        );
    }
}

//! Serde helpers rendering byte fields as base64 strings, so domain objects
//! stay readable when dumped as JSON.

use std::collections::{BTreeMap, BTreeSet};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn decode_str<E: serde::de::Error>(s: &str) -> Result<Bytes, E> {
    STANDARD.decode(s).map(Bytes::from).map_err(E::custom)
}

pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
    let s = String::deserialize(deserializer)?;
    decode_str(&s)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &Option<Bytes>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Bytes>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => decode_str(&s).map(Some),
            None => Ok(None),
        }
    }
}

/// `BTreeMap<String, Bytes>` (attribute maps).
pub mod values {
    use super::*;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Bytes>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut m = serializer.serialize_map(Some(map.len()))?;
        for (k, v) in map {
            m.serialize_entry(k, &STANDARD.encode(v))?;
        }
        m.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Bytes>, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| decode_str(&v).map(|b| (k, b)))
            .collect()
    }
}

/// `BTreeMap<Bytes, V>` (family-keyed maps).
pub mod keys {
    use super::*;

    pub fn serialize<S: Serializer, V: Serialize>(
        map: &BTreeMap<Bytes, V>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut m = serializer.serialize_map(Some(map.len()))?;
        for (k, v) in map {
            m.serialize_entry(&STANDARD.encode(k), v)?;
        }
        m.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>, V: Deserialize<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Bytes, V>, D::Error> {
        let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| decode_str(&k).map(|b| (b, v)))
            .collect()
    }
}

/// `BTreeMap<Bytes, BTreeSet<Bytes>>` (family → qualifier selections).
pub mod columns {
    use super::*;

    struct Qualifiers<'a>(&'a BTreeSet<Bytes>);

    impl Serialize for Qualifiers<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
            for q in self.0 {
                seq.serialize_element(&STANDARD.encode(q))?;
            }
            seq.end()
        }
    }

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<Bytes, BTreeSet<Bytes>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut m = serializer.serialize_map(Some(map.len()))?;
        for (k, v) in map {
            m.serialize_entry(&STANDARD.encode(k), &Qualifiers(v))?;
        }
        m.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Bytes, BTreeSet<Bytes>>, D::Error> {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        let mut out = BTreeMap::new();
        for (k, quals) in raw {
            let family = decode_str::<D::Error>(&k)?;
            let set = quals
                .iter()
                .map(|q| decode_str::<D::Error>(q))
                .collect::<Result<BTreeSet<_>, _>>()?;
            out.insert(family, set);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Probe {
        #[serde(with = "crate::b64")]
        row: Bytes,
        #[serde(with = "crate::b64::option", default)]
        tags: Option<Bytes>,
    }

    #[test]
    fn bytes_render_as_base64() {
        let p = Probe { row: Bytes::from_static(b"r1"), tags: None };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"row":"cjE=","tags":null}"#);
        let back: Probe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = serde_json::from_str::<Probe>(r#"{"row":"***"}"#);
        assert!(err.is_err());
    }
}

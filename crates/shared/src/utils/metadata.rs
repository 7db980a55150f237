use opentelemetry::propagation::{Extractor, Injector};
use tonic::metadata::{KeyRef, MetadataKey, MetadataMap, MetadataValue};

pub struct MetadataInjector<'a>(pub &'a mut MetadataMap);

impl<'a> Injector for MetadataInjector<'a> {
    fn set(&mut self, key: &str, value: String) {
        if let Ok(metadata_key) = key.parse::<MetadataKey<_>>()
            && let Ok(metadata_value) = value.parse::<MetadataValue<_>>()
        {
            self.0.insert(metadata_key, metadata_value);
        }
    }
}

pub struct MetadataExtractor<'a>(pub &'a MetadataMap);

impl<'a> Extractor for MetadataExtractor<'a> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(|key| match key {
                KeyRef::Ascii(k) => k.as_str(),
                KeyRef::Binary(k) => k.as_str(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_values_are_extractable() {
        let mut map = MetadataMap::new();
        MetadataInjector(&mut map).set("traceparent", "00-abc-def-01".to_string());

        let extractor = MetadataExtractor(&map);
        assert_eq!(extractor.get("traceparent"), Some("00-abc-def-01"));
        assert!(extractor.keys().contains(&"traceparent"));
    }

    #[test]
    fn test_invalid_keys_are_dropped() {
        let mut map = MetadataMap::new();
        MetadataInjector(&mut map).set("bad key", "value".to_string());
        assert!(map.is_empty());
    }
}

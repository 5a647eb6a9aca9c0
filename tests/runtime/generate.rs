//! Integration tests for generated documents

use proptest::prelude::*;
use strand_runtime::{GenerateConfig, decode, generate, generate_document};

#[test]
fn seeds_give_different_documents() {
    let config = GenerateConfig::new();
    let documents: Vec<_> = (0..10).map(|seed| generate_document(seed, &config)).collect();
    assert!(documents.windows(2).any(|pair| pair[0] != pair[1]));
}

proptest! {
    #[test]
    fn generated_documents_round_trip(seed in any::<u64>()) {
        let value = generate(seed, &GenerateConfig::new());
        prop_assert_eq!(decode(&value.encode()).unwrap(), value);
    }

    #[test]
    fn proper_prefixes_are_rejected(seed in any::<u64>(), cut in any::<prop::sample::Index>()) {
        let document = generate_document(seed, &GenerateConfig::new());
        let prefix = &document[..cut.index(document.len())];
        let error = decode(prefix).unwrap_err();
        prop_assert!(!error.is_fatal());
    }
}

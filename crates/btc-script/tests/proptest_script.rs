use proptest::prelude::*;

use btc_script::chunk::{decode_script, encode_push_datas};
use btc_script::{templates, Address, Network, Script};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn push_datas_roundtrip(parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 0..5)) {
        let slices: Vec<&[u8]> = parts.iter().map(|p| p.as_slice()).collect();
        let encoded = encode_push_datas(&slices).unwrap();
        let chunks = decode_script(&encoded).unwrap();
        let decoded: Vec<Vec<u8>> = chunks.into_iter().map(|c| c.data.unwrap_or_default()).collect();
        prop_assert_eq!(parts, decoded);
    }

    #[test]
    fn classify_is_stable_under_reserialization(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let script = Script::from_bytes(&bytes);
        let reparsed = Script::from_hex(&script.to_hex()).unwrap();
        prop_assert_eq!(script.classify(), reparsed.classify());
    }

    #[test]
    fn templates_classify_as_expected(hash in prop::array::uniform20(any::<u8>())) {
        prop_assert!(templates::p2pkh_lock(&hash).is_p2pkh());
        prop_assert!(templates::p2wpkh_lock(&hash).is_p2wpkh());
        prop_assert!(templates::p2sh_lock(&hash).is_p2sh());
    }

    #[test]
    fn address_roundtrip_p2pkh(hash in prop::array::uniform20(any::<u8>()), testnet in any::<bool>()) {
        let network = if testnet { Network::Testnet } else { Network::Mainnet };
        let addr = Address::from_public_key_hash(&hash, network);
        let parsed = Address::from_string(&addr.address_string).unwrap();
        prop_assert_eq!(parsed, addr);
    }

    #[test]
    fn address_roundtrip_p2wpkh(hash in prop::array::uniform20(any::<u8>()), testnet in any::<bool>()) {
        let network = if testnet { Network::Testnet } else { Network::Mainnet };
        let addr = Address::from_witness_public_key_hash(&hash, network).unwrap();
        let parsed = Address::from_string(&addr.address_string).unwrap();
        prop_assert_eq!(parsed, addr);
    }
}

// Property-based tests for request signing across the three gateway profiles

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use paybridge::modules::gateways::gateway_profile::{ALIPAY, SHENGPAY, WECHAT};
use paybridge::{ParameterSet, SignatureEngine};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn engines() -> [SignatureEngine; 3] {
    [
        SignatureEngine::new(&WECHAT.signing),
        SignatureEngine::new(&SHENGPAY.signing),
        SignatureEngine::new(&ALIPAY.signing),
    ]
}

/// Keys always contain an underscore after at most three letters, so they
/// never collide with a reserved field name.
fn fields() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,3}_[a-z]{1,8}", "[A-Za-z0-9.:/]{1,16}", 1..8)
}

fn secret() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,32}"
}

fn to_params(map: &BTreeMap<String, String>) -> ParameterSet {
    map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

proptest! {
    #[test]
    fn prop_generated_signature_verifies(map in fields(), key in secret()) {
        let params = to_params(&map);
        let key = TestDataFactory::secret(&key);
        for engine in engines() {
            let sign = engine.generate(&params, &key).unwrap();
            prop_assert!(engine.verify(&params, &sign, &key));
        }
    }

    #[test]
    fn prop_every_signed_field_matters(map in fields(), key in secret(), pick in any::<prop::sample::Index>()) {
        let params = to_params(&map);
        let key = TestDataFactory::secret(&key);
        let target = pick.get(&map.keys().collect::<Vec<_>>()).to_string();

        let mut changed = params.clone();
        let tampered = format!("{}x", map[&target]);
        changed.insert(target.as_str(), tampered);

        for engine in engines() {
            prop_assert_ne!(
                engine.generate(&params, &key).unwrap(),
                engine.generate(&changed, &key).unwrap()
            );
        }
    }

    #[test]
    fn prop_empty_values_are_not_signed(map in fields(), key in secret()) {
        let params = to_params(&map);
        let with_empty = params.clone().with("zzzz_blank", "");
        let key = TestDataFactory::secret(&key);
        for engine in engines() {
            prop_assert_eq!(
                engine.generate(&params, &key).unwrap(),
                engine.generate(&with_empty, &key).unwrap()
            );
        }
    }

    #[test]
    fn prop_insertion_order_is_irrelevant(map in fields(), key in secret()) {
        let forward = to_params(&map);
        let backward: ParameterSet = map.iter().rev().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let key = TestDataFactory::secret(&key);
        for engine in engines() {
            prop_assert_eq!(
                engine.generate(&forward, &key).unwrap(),
                engine.generate(&backward, &key).unwrap()
            );
        }
    }

    #[test]
    fn prop_reserved_fields_never_signed(map in fields(), key in secret(), noise in "[A-Z0-9]{1,16}") {
        let params = to_params(&map);
        let key = TestDataFactory::secret(&key);
        for engine in engines() {
            let rules = engine.rules();
            let noisy = params
                .clone()
                .with(rules.signature_field, noise.as_str())
                .with(rules.secret_field, noise.as_str());
            prop_assert_eq!(
                engine.generate(&params, &key).unwrap(),
                engine.generate(&noisy, &key).unwrap()
            );
        }
    }
}

#[test]
fn test_unified_order_signature_is_stable_uppercase_md5() {
    let engine = SignatureEngine::new(&WECHAT.signing);
    let key = TestDataFactory::secret("K");
    let params = TestDataFactory::unified_order_params();

    let first = engine.generate(&params, &key).unwrap();
    let second = engine.generate(&params, &key).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 32);
    assert!(first.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

    let changed = params.with("total_fee", "101");
    assert_ne!(engine.generate(&changed, &key).unwrap(), first);
}

#[test]
fn test_sign_type_excluded_only_for_mobile_wallet() {
    let key = TestDataFactory::secret("K");
    let plain = ParameterSet::from([("partner", "2088")]);
    let typed = plain.clone().with("sign_type", "MD5");

    let alipay = SignatureEngine::new(&ALIPAY.signing);
    assert_eq!(
        alipay.generate(&plain, &key).unwrap(),
        alipay.generate(&typed, &key).unwrap()
    );

    let wechat = SignatureEngine::new(&WECHAT.signing);
    assert_ne!(
        wechat.generate(&plain, &key).unwrap(),
        wechat.generate(&typed, &key).unwrap()
    );
}

#[test]
fn test_hex_case_per_gateway() {
    let key = TestDataFactory::secret("K");
    let params = ParameterSet::from([("a_b", "1")]);

    let upper = SignatureEngine::new(&SHENGPAY.signing).generate(&params, &key).unwrap();
    let lower = SignatureEngine::new(&ALIPAY.signing).generate(&params, &key).unwrap();

    assert_eq!(upper, upper.to_ascii_uppercase());
    assert_eq!(lower, lower.to_ascii_lowercase());
}

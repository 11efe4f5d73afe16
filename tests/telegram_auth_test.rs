use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use dealer_portal_backend::utils::telegram_auth::{
    verify_init_data, InitDataVerifier, TelegramAuthError,
};

const BOT_TOKEN: &str = "7000000001:AAE-test-token";

fn signed(pairs: &[(&str, &str)], token: &str) -> String {
    let fields: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let hash = InitDataVerifier::new(token).unwrap().sign(&fields);
    encode(pairs, &hash)
}

fn encode(pairs: &[(&str, &str)], hash: &str) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        serializer.append_pair(k, v);
    }
    serializer.append_pair("hash", hash);
    serializer.finish()
}

fn launch_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
        (
            "user",
            r#"{"id":279058397,"first_name":"Vladislav","last_name":"Kibenko","username":"vdkfrost","language_code":"ru","is_premium":true}"#,
        ),
        ("auth_date", "1662771648"),
    ]
}

#[test]
fn reference_payload_is_trusted() {
    let raw = "auth_date=1700000000&first_name=Ann&hash=db22c791660ff8c01bc0e7cd4b8e833f87e2d0623e306ee365408ed1fad9a99b";
    assert!(verify_init_data(raw, "test-secret"));
    assert!(!verify_init_data(raw, "other-secret"));
}

#[test]
fn verification_is_deterministic() {
    let raw = signed(&launch_fields(), BOT_TOKEN);
    let verifier = InitDataVerifier::new(BOT_TOKEN).unwrap();
    for _ in 0..10 {
        assert!(verifier.verify(&raw));
    }
}

#[test]
fn any_changed_character_breaks_the_signature() {
    let fields = launch_fields();
    let good = signed(&fields, BOT_TOKEN);
    assert!(verify_init_data(&good, BOT_TOKEN));
    let hash = good.rsplit("hash=").next().unwrap().to_string();

    for (idx, (_, value)) in fields.iter().enumerate() {
        for pos in 0..value.chars().count() {
            let tampered_value: String = value
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    if i == pos {
                        if c == 'x' {
                            'y'
                        } else {
                            'x'
                        }
                    } else {
                        c
                    }
                })
                .collect();
            let mut tampered: Vec<(&str, &str)> = fields.clone();
            tampered[idx].1 = &tampered_value;
            let raw = encode(&tampered, &hash);
            assert!(
                !verify_init_data(&raw, BOT_TOKEN),
                "tampering {} at {} was accepted",
                tampered[idx].0,
                pos
            );
        }
    }
}

#[test]
fn missing_hash_is_never_trusted() {
    let raw = "auth_date=1700000000&first_name=Ann";
    assert!(!verify_init_data(raw, "test-secret"));
    let verifier = InitDataVerifier::new("test-secret").unwrap();
    assert_eq!(
        verifier.authenticate(raw).unwrap_err(),
        TelegramAuthError::MissingHash
    );
    assert!(!verifier.verify(""));
}

#[test]
fn field_order_does_not_matter() {
    let fields = launch_fields();
    let raw = signed(&fields, BOT_TOKEN);
    let hash = raw.rsplit("hash=").next().unwrap().to_string();

    let mut reversed = fields.clone();
    reversed.reverse();
    let mut reordered = url::form_urlencoded::Serializer::new(String::new());
    reordered.append_pair("hash", &hash);
    for (k, v) in &reversed {
        reordered.append_pair(k, v);
    }

    assert!(verify_init_data(&encode(&reversed, &hash), BOT_TOKEN));
    assert!(verify_init_data(&reordered.finish(), BOT_TOKEN));
}

#[test]
fn hash_comparison_is_exact() {
    let raw = "auth_date=1700000000&first_name=Ann&hash=DB22C791660FF8C01BC0E7CD4B8E833F87E2D0623E306EE365408ED1FAD9A99B";
    assert!(!verify_init_data(raw, "test-secret"));
    let truncated = "auth_date=1700000000&first_name=Ann&hash=db22c791660ff8c01bc0e7cd4b8e833f";
    assert!(!verify_init_data(truncated, "test-secret"));
}

#[test]
fn malformed_escapes_are_rejected() {
    let raw = "auth_date=1700000000&first_name=%E0%A4&hash=db22c791660ff8c01bc0e7cd4b8e833f87e2d0623e306ee365408ed1fad9a99b";
    assert!(!verify_init_data(raw, "test-secret"));
    let verifier = InitDataVerifier::new("test-secret").unwrap();
    assert!(matches!(
        verifier.authenticate("first_name=%G1&hash=00"),
        Err(TelegramAuthError::Malformed(_))
    ));
}

#[test]
fn duplicate_keys_keep_the_last_value() {
    let verifier = InitDataVerifier::new("test-secret").unwrap();
    let reference = "db22c791660ff8c01bc0e7cd4b8e833f87e2d0623e306ee365408ed1fad9a99b";
    let raw = format!(
        "auth_date=1700000000&first_name=Bob&first_name=Ann&hash={}",
        reference
    );
    assert!(verifier.verify(&raw));

    let raw = format!(
        "auth_date=1700000000&first_name=Ann&first_name=Bob&hash={}",
        reference
    );
    assert!(!verifier.verify(&raw));
}

#[test]
fn blank_secrets_fail_closed() {
    let raw = "auth_date=1700000000&first_name=Ann&hash=db22c791660ff8c01bc0e7cd4b8e833f87e2d0623e306ee365408ed1fad9a99b";
    for secret in ["", " ", "\t\n"] {
        assert!(!verify_init_data(raw, secret));
        assert_eq!(
            InitDataVerifier::new(secret).unwrap_err(),
            TelegramAuthError::EmptySecret
        );
    }
}

#[test]
fn concurrent_callers_do_not_interfere() {
    let verifier = Arc::new(InitDataVerifier::new(BOT_TOKEN).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let verifier = Arc::clone(&verifier);
            thread::spawn(move || {
                let name = format!("dealer-{}", n);
                let pairs = [("auth_date", "1700000000"), ("first_name", name.as_str())];
                let good = signed(&pairs, BOT_TOKEN);
                let forged = signed(&pairs, "another-bot-token");
                for _ in 0..200 {
                    assert!(verifier.verify(&good));
                    assert!(!verifier.verify(&forged));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

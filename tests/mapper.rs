use udyoga_id::{
    derive_identifier, derive_identifier_checked, derive_legacy, is_legacy_shaped, CharEncoding,
    IdentityError,
};

const SAMPLES: &[&str] = &[
    "",
    "a",
    "user_2example1",
    "user_2NQqSj8bKcXzVz3mX9q8Qp1kLmN",
    "kiosk",
    "😀",
    "आवेदक",
    "aAТB",
];

fn assert_layout(id: &str) {
    let groups: Vec<&str> = id.split('-').collect();
    assert_eq!(
        groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
        vec![8, 4, 4, 4, 12],
        "{id}"
    );
    assert!(id
        .chars()
        .all(|c| c == '-' || c.is_ascii_digit() || ('a'..='f').contains(&c)));
    assert!(groups[2].starts_with('4'), "{id}");
    assert!(groups[3].starts_with('8'), "{id}");
    assert!(is_legacy_shaped(id), "{id}");
}

#[test]
fn repeated_calls_agree() {
    for input in SAMPLES {
        let first = derive_identifier(input);
        for _ in 0..16 {
            assert_eq!(derive_identifier(input), first);
        }
    }
}

#[test]
fn every_output_is_uuid_shaped() {
    for input in SAMPLES {
        assert_layout(derive_identifier(input).as_str());
        assert_layout(derive_legacy(input, CharEncoding::Scalar).as_str());
    }
    for n in 0..500 {
        assert_layout(derive_identifier(&format!("user_{n:x}")).as_str());
    }
}

#[test]
fn single_character_edits_change_the_output() {
    let base = "user_2example1";
    let baseline = derive_identifier(base);
    for (i, _) in base.char_indices() {
        for replacement in ['0', 'z', '_', 'Q'] {
            let mut edited: String = base[..i].to_string();
            edited.push(replacement);
            edited.push_str(&base[i + 1..]);
            if edited == base {
                continue;
            }
            assert_ne!(derive_identifier(&edited), baseline, "{edited}");
        }
    }
    assert_ne!(derive_identifier("user_2example1"), derive_identifier("user_2example2"));
}

#[test]
fn empty_input_has_a_fixed_identifier() {
    assert_eq!(
        derive_identifier("").as_str(),
        "00000000-0000-4000-8000-000000000000"
    );
}

#[test]
fn absent_input_is_rejected() {
    assert_eq!(
        derive_identifier_checked(None),
        Err(IdentityError::MissingInput)
    );
    assert_ne!(derive_identifier_checked(Some("")), Err(IdentityError::MissingInput));
}

// Each checksum is 31-polynomial mod 2^32, so the 4-unit string
// c0 c1 c2 c3 with c0 - c3 = 31 and c2 - c1 = 993 hashes the same forwards
// and backwards; it and its reversal then share both halves.
#[test]
fn constructed_full_collision() {
    let a = "aAТB";
    let b: String = a.chars().rev().collect();
    assert_eq!(b, "BТAa");
    assert_ne!(a, b);
    assert_eq!(derive_identifier(a), derive_identifier(&b));
    assert_eq!(
        derive_identifier(a).as_str(),
        "002d8c60-002d-4c60-8c60-8c608c600000"
    );
}

#[test]
fn forward_half_collides_on_ascii() {
    // 'A'*31 + 'a' == 'B'*31 + 'B'
    let aa = derive_identifier("Aa");
    let bb = derive_identifier("BB");
    assert_ne!(aa, bb);
    assert_eq!(&aa.as_str()[..8], &bb.as_str()[..8]);
}

#[test]
fn concurrent_calls_match_sequential() {
    let expected: Vec<_> = SAMPLES.iter().map(|s| derive_identifier(s)).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| SAMPLES.iter().map(|s| derive_identifier(s)).collect::<Vec<_>>()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

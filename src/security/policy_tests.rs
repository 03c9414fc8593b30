use super::*;

#[test]
fn reference_password_vectors() {
    assert!(validate_password("TTT323dsa432!!"));
    // no digits or punctuation
    assert!(!validate_password("Tddfdafadfasdf"));
    // 11 characters
    assert!(!validate_password("31341421241"));
    // no digits at all
    assert!(!validate_password("TTTddafadfadfa!"));
}

#[test]
fn length_bounds_are_inclusive() {
    let twelve = "aaaBBB111!xx";
    assert_eq!(twelve.len(), 12);
    assert!(validate_password(twelve));
    assert!(!validate_password(&twelve[..11]));

    let fifty = format!("aaaBBB111!{}", "x".repeat(40));
    assert_eq!(fifty.len(), 50);
    assert!(validate_password(&fifty));
    let fifty_one = format!("{}x", fifty);
    assert!(!validate_password(&fifty_one));
}

#[test]
fn class_minimums_are_exact() {
    // exactly three of each counted class passes
    assert!(validate_password("abcABC123!!!"));
    // one short in each class fails
    assert!(!validate_password("abxABC12!!!!"));
    assert!(!validate_password("abABCD123!!!"));
    assert!(!validate_password("abcdABc123!!"));
    assert!(!validate_password("abcABC12x!!!"));
    assert!(!validate_password("abcdABCD1234"));
}

#[test]
fn counts_are_reported_per_class() {
    let c = count_classes("TTT323dsa432!!").unwrap();
    assert_eq!(c, CharCounts { lower: 3, upper: 3, digits: 6, special: 2 });
}

#[test]
fn illegal_characters_reject_the_password() {
    // whitespace
    assert!(!validate_password("TTT323 dsa432!!"));
    assert!(count_classes("a b").is_none());
    // caseless letters from other scripts
    assert!(!validate_password("TTT323dsa432!!中"));
    // control characters
    assert!(!validate_password("TTT323dsa432!!\t"));
}

#[test]
fn non_ascii_symbols_count_as_special() {
    assert!(validate_password("TTT323dsa432€"));
    assert!(validate_password("ÀÉÎ323dsa432!"));
}

#[test]
fn reference_email_vectors() {
    assert!(!validate_email("test"));
    assert!(validate_email("test@test.com"));
}

#[test]
fn email_syntax_rules() {
    assert!(validate_email("first.last+tag@sub.example.org"));
    assert!(validate_email("o'hara@x-y.io"));
    assert!(!validate_email("a b@c.com"));
    assert!(!validate_email("user@-example.com"));
    assert!(!validate_email("user@example-.com"));
    assert!(!validate_email("user@exa_mple.com"));
    assert!(!validate_email("@example.com"));
    assert!(!validate_email("user@"));
}

#[test]
fn email_length_cap() {
    let label = "a".repeat(60);
    let local = "b".repeat(64);
    let long = format!("{}@{}.{}.{}.{}.com", local, label, label, label, label);
    assert!(long.len() > EMAIL_MAX_LEN);
    assert!(!validate_email(&long));
    let ok = format!("{}@{}.{}.com", local, label, label);
    assert!(ok.len() <= EMAIL_MAX_LEN);
    assert!(validate_email(&ok));
}

#[test]
fn checked_variants_map_to_errors() {
    assert_eq!(check_password("short"), Err(AccessError::InvalidPassword));
    assert_eq!(check_email("nope"), Err(AccessError::InvalidEmail));
    assert!(check_password("TTT323dsa432!!").is_ok());
    assert!(check_email("test@test.com").is_ok());
}

#[test]
fn format_characters_reject_the_password() {
    // zero-width joiner and soft hyphen are Cf, not symbols
    assert!(!validate_password("TTT323dsa432\u{200D}"));
    assert!(!validate_password("TTT323dsa432\u{00AD}"));
    assert!(count_classes("\u{200D}").is_none());
}

#[test]
fn combining_marks_reject_the_password() {
    // U+0301 combining acute accent is Mn
    assert!(!validate_password("TTT323dsa432!\u{0301}"));
}

#[test]
fn letter_numbers_count_as_digits() {
    // Roman numeral one (Nl) is a number, not an uppercase letter
    let c = count_classes("\u{2160}").unwrap();
    assert_eq!(c, CharCounts { lower: 0, upper: 0, digits: 1, special: 0 });
    assert!(validate_password("TTTdsa\u{2160}\u{2161}\u{2162}!"));
    assert!(!validate_password("TT\u{2160}dsa432!!xx"));
    // circled letters are So symbols
    assert_eq!(count_classes("\u{24D0}").unwrap().special, 1);
}

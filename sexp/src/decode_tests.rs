use super::decode::*;
use alloc::vec::Vec;
use hex_literal::hex;

/* Drives a cursor over every expression in the buffer */
fn walk(cursor: &mut Cursor) -> Result<(), Error> {
    loop {
        match cursor.kind() {
            Kind::Atom => cursor.next()?,
            Kind::List => cursor.enter_list()?,
            Kind::End => {
                if cursor.level() == 0 {
                    return Ok(());
                }
                cursor.exit_list()?;
            }
        }
    }
}

#[test]
fn single_atom() {
    let mut cursor = Cursor::first(b"3:foo").unwrap();
    assert_eq!(cursor.kind(), Kind::Atom);
    assert_eq!(cursor.atom().unwrap(), b"foo");
    assert!(cursor.display().is_none());
    cursor.next().unwrap();
    assert_eq!(cursor.kind(), Kind::End);
    cursor.next().unwrap();
    assert_eq!(cursor.kind(), Kind::End);
}

#[test]
fn empty_atom() {
    let mut cursor = Cursor::first(b"0:").unwrap();
    assert_eq!(cursor.atom().unwrap(), b"");
    cursor.next().unwrap();
    assert_eq!(cursor.kind(), Kind::End);
}

#[test]
fn display_hint() {
    let mut cursor = Cursor::first(b"[1:p]3:key").unwrap();
    assert_eq!(cursor.kind(), Kind::Atom);
    assert_eq!(cursor.display().unwrap(), b"p");
    assert_eq!(cursor.atom().unwrap(), b"key");
    cursor.next().unwrap();
    assert_eq!(cursor.kind(), Kind::End);
}

#[test]
fn list_of_atoms() {
    let mut cursor = Cursor::first(b"(3:sig1:x)").unwrap();
    assert_eq!(cursor.kind(), Kind::List);
    assert!(cursor.atom().is_err());
    cursor.enter_list().unwrap();
    assert_eq!(cursor.level(), 1);
    assert_eq!(cursor.atom().unwrap(), b"sig");
    cursor.next().unwrap();
    assert_eq!(cursor.atom().unwrap(), b"x");
    cursor.next().unwrap();
    assert_eq!(cursor.kind(), Kind::End);
    cursor.exit_list().unwrap();
    assert_eq!(cursor.level(), 0);
    assert_eq!(cursor.kind(), Kind::End);
}

#[test]
fn empty_list() {
    let mut cursor = Cursor::first(b"()").unwrap();
    assert_eq!(cursor.kind(), Kind::List);
    cursor.enter_list().unwrap();
    assert_eq!(cursor.kind(), Kind::End);
    cursor.exit_list().unwrap();
    assert_eq!(cursor.kind(), Kind::End);
    assert_eq!(cursor.level(), 0);
}

#[test]
fn enter_exit_matches_next() {
    // Skipping a whole list must land where enter + exit lands
    let buffer = b"(1:a(1:b2:cc)0:)2:zz";

    let mut skipped = Cursor::first(buffer).unwrap();
    skipped.next().unwrap();
    assert_eq!(skipped.atom().unwrap(), b"zz");

    let mut walked = Cursor::first(buffer).unwrap();
    walked.enter_list().unwrap();
    walked.exit_list().unwrap();
    assert_eq!(walked.atom().unwrap(), b"zz");
}

#[test]
fn exit_list_at_top_level() {
    let mut cursor = Cursor::first(b"3:foo").unwrap();
    assert_eq!(cursor.exit_list(), Err(Error::NotInList));
}

#[test]
fn enter_list_on_atom() {
    let mut cursor = Cursor::first(b"3:foo").unwrap();
    assert_eq!(cursor.enter_list(), Err(Error::IncorrectType));
}

#[test]
fn malformed_headers() {
    assert!(Cursor::first(b"").is_err());
    assert_eq!(Cursor::first(b")").unwrap_err(), Error::UnbalancedParens);
    assert_eq!(Cursor::first(b"x").unwrap_err(), Error::InvalidLength);
    assert_eq!(Cursor::first(b"3").unwrap_err(), Error::NotEnoughData);
    assert_eq!(Cursor::first(b"3x").unwrap_err(), Error::InvalidLength);
    assert_eq!(Cursor::first(b"3:ab").unwrap_err(), Error::NotEnoughData);
    assert_eq!(Cursor::first(b"01:a").unwrap_err(), Error::InvalidLength);
    assert_eq!(Cursor::first(b"00:").unwrap_err(), Error::InvalidLength);
    assert_eq!(
        Cursor::first(b"99999999999999999999999:a").unwrap_err(),
        Error::InvalidLength
    );
    assert_eq!(Cursor::first(b"[3:foo").unwrap_err(), Error::NotEnoughData);
    assert_eq!(
        Cursor::first(b"[3:foo3:bar").unwrap_err(),
        Error::UnterminatedDisplay
    );
    assert_eq!(Cursor::first(b"[3:foo]").unwrap_err(), Error::NotEnoughData);
}

#[test]
fn unterminated_list() {
    let mut cursor = Cursor::first(b"(3:foo").unwrap();
    cursor.enter_list().unwrap();
    assert_eq!(cursor.next(), Err(Error::UnterminatedList));
}

#[test]
fn stray_close_after_atom() {
    let mut cursor = Cursor::first(b"1:a)").unwrap();
    assert_eq!(cursor.next(), Err(Error::UnbalancedParens));
}

#[test]
fn truncation_fails_cleanly() {
    let buffer = b"(3:sig(4:hash6:sha256)[4:data]5:bytes)";

    let mut cursor = Cursor::first(buffer).unwrap();
    walk(&mut cursor).unwrap();

    for len in 0..buffer.len() {
        assert!(
            Cursor::first(&buffer[..len]).and_then(|mut c| walk(&mut c)).is_err(),
            "truncation at {len} did not fail"
        );
    }
}

#[test]
fn deep_nesting() {
    // Nesting depth must not translate into stack depth
    const DEPTH: usize = 100_000;
    let mut buffer = Vec::new();
    buffer.resize(DEPTH, b'(');
    buffer.resize(2 * DEPTH, b')');

    let mut cursor = Cursor::first(&buffer).unwrap();
    cursor.next().unwrap();
    assert_eq!(cursor.kind(), Kind::End);

    let mut cursor = Cursor::first(&buffer).unwrap();
    walk(&mut cursor).unwrap();
}

#[test]
fn subexpr_list() {
    let mut cursor = Cursor::first(b"(3:foo(1:x))2:hi").unwrap();
    assert_eq!(cursor.subexpr().unwrap(), b"(3:foo(1:x))");
    assert_eq!(cursor.atom().unwrap(), b"hi");
}

#[test]
fn subexpr_atom_keeps_headers() {
    let mut cursor = Cursor::first(b"[1:p]3:foo1:z").unwrap();
    assert_eq!(cursor.subexpr().unwrap(), b"[1:p]3:foo");
    assert_eq!(cursor.atom().unwrap(), b"z");
}

#[test]
fn subexpr_inside_list() {
    let mut cursor = Cursor::first(b"(3:foo1:z)").unwrap();
    cursor.enter_list().unwrap();
    assert_eq!(cursor.subexpr().unwrap(), b"3:foo");
    assert_eq!(cursor.atom().unwrap(), b"z");
    cursor.next().unwrap();
    assert_eq!(cursor.subexpr(), Err(Error::IncorrectType));
}

#[test]
fn get_u32() {
    let mut cursor = Cursor::first(b"0:").unwrap();
    assert_eq!(cursor.get_u32().unwrap(), 0);

    let mut cursor = Cursor::first(b"1:\x2a").unwrap();
    assert_eq!(cursor.get_u32().unwrap(), 42);

    let mut cursor = Cursor::first(b"2:\x01\x00").unwrap();
    assert_eq!(cursor.get_u32().unwrap(), 256);

    // Unsigned convention: a set high bit is a value, not a sign
    let mut cursor = Cursor::first(b"4:\xff\xff\xff\xff").unwrap();
    assert_eq!(cursor.get_u32().unwrap(), u32::MAX);

    let mut cursor = Cursor::first(b"5:\x01\x00\x00\x00\x00").unwrap();
    assert_eq!(cursor.get_u32(), Err(Error::IntegerTooLong));

    let mut cursor = Cursor::first(b"2:\x00\x01").unwrap();
    assert_eq!(cursor.get_u32(), Err(Error::NonCanonicalInteger));

    let mut cursor = Cursor::first(b"[1:d]1:\x05").unwrap();
    assert_eq!(cursor.get_u32(), Err(Error::IncorrectType));

    let mut cursor = Cursor::first(b"(1:\x05)").unwrap();
    assert_eq!(cursor.get_u32(), Err(Error::IncorrectType));
}

#[test]
fn get_u32_advances() {
    let mut cursor = Cursor::first(b"(1:\x051:\x06)").unwrap();
    cursor.enter_list().unwrap();
    assert_eq!(cursor.get_u32().unwrap(), 5);
    assert_eq!(cursor.get_u32().unwrap(), 6);
    assert_eq!(cursor.kind(), Kind::End);
}

#[test]
fn check_type() {
    let mut cursor = Cursor::first(b"(3:rsa1:n)").unwrap();
    cursor.check_type(b"rsa").unwrap();
    assert_eq!(cursor.atom().unwrap(), b"n");

    let mut cursor = Cursor::first(b"(3:rsa1:n)").unwrap();
    assert_eq!(cursor.check_type(b"dsa"), Err(Error::NoMatch));

    let mut cursor = Cursor::first(b"3:rsa").unwrap();
    assert_eq!(cursor.check_type(b"rsa"), Err(Error::IncorrectType));

    // A displayed head atom is not a type name
    let mut cursor = Cursor::first(b"([1:t]3:rsa)").unwrap();
    assert_eq!(cursor.check_type(b"rsa"), Err(Error::IncorrectType));
}

#[test]
fn check_types_dispatch() {
    let names: &[&[u8]] = &[b"dsa", b"rsa", b"ecdsa"];

    let mut cursor = Cursor::first(b"(3:rsa1:n)").unwrap();
    assert_eq!(cursor.check_types(names).unwrap(), 1);
    assert_eq!(cursor.atom().unwrap(), b"n");

    let mut cursor = Cursor::first(b"(3:foo1:n)").unwrap();
    assert_eq!(cursor.check_types(names), Err(Error::NoMatch));
}

#[test]
fn assoc() {
    let buffer = b"((1:a1:1)(1:b1:2)(1:c1:3))";
    let keys: &[&[u8]] = &[b"a", b"b", b"d"];
    let mut cursor = Cursor::first(buffer).unwrap();
    let values = cursor.assoc(keys).unwrap();

    assert_eq!(values[0].as_ref().unwrap().atom().unwrap(), b"1");
    assert_eq!(values[1].as_ref().unwrap().atom().unwrap(), b"2");
    assert!(values[2].is_none());

    // The outer cursor has moved past the whole list
    assert_eq!(cursor.kind(), Kind::End);
    assert_eq!(cursor.level(), 0);
}

#[test]
fn assoc_first_match_wins() {
    let buffer = b"((1:k1:1)(1:k1:2))";
    let keys: &[&[u8]] = &[b"k"];
    let mut cursor = Cursor::first(buffer).unwrap();
    let values = cursor.assoc(keys).unwrap();
    assert_eq!(values[0].as_ref().unwrap().atom().unwrap(), b"1");
}

#[test]
fn assoc_multi_value_rest() {
    let buffer = b"((1:p2:aa2:bb)(1:q))1:z";
    let keys: &[&[u8]] = &[b"p", b"q"];
    let mut cursor = Cursor::first(buffer).unwrap();
    let values = cursor.assoc(keys).unwrap();

    let mut rest = values[0].clone().unwrap();
    assert_eq!(rest.atom().unwrap(), b"aa");
    rest.next().unwrap();
    assert_eq!(rest.atom().unwrap(), b"bb");
    rest.next().unwrap();
    assert_eq!(rest.kind(), Kind::End);

    // An empty rest is a match positioned at its end
    assert_eq!(values[1].as_ref().unwrap().kind(), Kind::End);

    assert_eq!(cursor.atom().unwrap(), b"z");
}

#[test]
fn assoc_rejects_non_pair_children() {
    let keys: &[&[u8]] = &[b"a"];

    let mut cursor = Cursor::first(b"(1:a)").unwrap();
    assert_eq!(cursor.assoc(keys).unwrap_err(), Error::IncorrectType);

    let mut cursor = Cursor::first(b"3:foo").unwrap();
    assert_eq!(cursor.assoc(keys).unwrap_err(), Error::IncorrectType);
}

#[test]
fn binary_atom_contents() {
    let buffer = b"3:\x00\xff\x80";
    let mut cursor = Cursor::first(buffer).unwrap();
    assert_eq!(cursor.atom().unwrap(), hex!("00ff80"));
}

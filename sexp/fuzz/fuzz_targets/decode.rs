#![no_main]

use csexp::decode::{Cursor, Kind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut cursor) = Cursor::first(data) else {
        return;
    };
    loop {
        match cursor.kind() {
            Kind::Atom => {
                let _ = cursor.atom();
                let _ = cursor.display();
                if cursor.next().is_err() {
                    return;
                }
            }
            Kind::List => {
                if cursor.enter_list().is_err() {
                    return;
                }
            }
            Kind::End => {
                if cursor.level() == 0 || cursor.exit_list().is_err() {
                    return;
                }
            }
        }
    }
});

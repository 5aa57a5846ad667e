#![no_main]

use csexp::decode::Kind;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut data = data.to_vec();
    let Ok(mut cursor) = csexp::transport::first(&mut data) else {
        return;
    };
    loop {
        match cursor.kind() {
            Kind::Atom => {
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
